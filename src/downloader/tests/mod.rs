use super::test_helpers::*;
use super::*;
use crate::error::Error;
use crate::types::FranchiseeRow;
use std::sync::Arc;
use tempfile::TempDir;

fn runner_for(dir: &TempDir, batch_size: u64, fetcher: Arc<dyn ImageFetcher>) -> BatchRunner {
    BatchRunner::new(&test_config(dir.path(), batch_size), fetcher)
}

fn saved_files(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n != "download.log")
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn blank_path_row_fails_without_network_call() {
    let dir = TempDir::new().unwrap();
    let rows = vec![
        FranchiseeRow::new("101", "Alpha", Some("/logos/alpha.png")),
        FranchiseeRow::new("102", "Beta", Some("logos/beta.jpg")),
        FranchiseeRow::new("103", "Blank", Some("   ")),
    ];
    let fetcher = Arc::new(FakeFetcher::serving(&rows));
    let source = FakeSource::new(rows);
    let mut runner = runner_for(&dir, 100, fetcher.clone());

    let outcome = runner.run(&source, &CancellationToken::new()).await.unwrap();

    let stats = match outcome {
        RunOutcome::Completed(stats) => stats,
        other => panic!("expected Completed, got {other:?}"),
    };
    assert_eq!(stats.total, 3);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.failed_ids, vec!["103".to_string()]);

    assert_eq!(fetcher.requested().len(), 2, "blank path must not hit the network");
    let files = saved_files(&dir);
    assert_eq!(files.len(), 2);
    assert!(files[0].starts_with("101_Alpha_") && files[0].ends_with(".png"));
    assert!(files[1].starts_with("102_Beta_") && files[1].ends_with(".jpg"));
    assert_eq!(runner.state(), RunState::Completed);
}

#[tokio::test]
async fn saved_file_holds_fetched_bytes() {
    let dir = TempDir::new().unwrap();
    let rows = vec![FranchiseeRow::new("7", "Seven", Some("/logos/seven.webp"))];
    let fetcher = Arc::new(FakeFetcher::serving(&rows));
    let source = FakeSource::new(rows);
    let mut runner = runner_for(&dir, 10, fetcher);

    runner.run(&source, &CancellationToken::new()).await.unwrap();

    let files = saved_files(&dir);
    assert_eq!(files.len(), 1);
    let body = std::fs::read(dir.path().join(&files[0])).unwrap();
    assert_eq!(body, b"7");
}

#[tokio::test]
async fn pages_follow_offset_plan() {
    let dir = TempDir::new().unwrap();
    let rows = numbered_rows(125);
    let fetcher = Arc::new(FakeFetcher::serving(&rows));
    let source = FakeSource::new(rows);
    let mut runner = runner_for(&dir, 50, fetcher);

    let outcome = runner.run(&source, &CancellationToken::new()).await.unwrap();

    assert_eq!(
        source.pages_requested(),
        vec![(0, 50), (50, 50), (100, 50)]
    );
    let stats = outcome.stats();
    assert_eq!(stats.success, 125);
    assert_eq!(stats.failed, 0);
    assert_eq!(saved_files(&dir).len(), 125);
}

#[tokio::test]
async fn fetch_failure_is_isolated_to_its_row() {
    let dir = TempDir::new().unwrap();
    let rows = numbered_rows(4);
    let fetcher = Arc::new(FakeFetcher::serving(&rows).with_status("logos/2.png", 500));
    let source = FakeSource::new(rows);
    let mut runner = runner_for(&dir, 2, fetcher.clone());

    let stats = runner
        .run(&source, &CancellationToken::new())
        .await
        .unwrap()
        .stats()
        .clone();

    assert_eq!(stats.success, 3);
    assert_eq!(stats.failed_ids, vec!["2".to_string()]);
    assert_eq!(fetcher.requested().len(), 4);
}

#[tokio::test]
async fn write_failure_counts_as_failed_row() {
    let dir = TempDir::new().unwrap();
    let rows = numbered_rows(2);
    let fetcher = Arc::new(FakeFetcher::serving(&rows));
    let source = FakeSource::new(rows);
    let mut config = test_config(dir.path(), 10);
    config.output_directory = dir.path().join("does-not-exist");
    let mut runner = BatchRunner::new(&config, fetcher);

    let stats = runner
        .run(&source, &CancellationToken::new())
        .await
        .unwrap()
        .stats()
        .clone();

    assert_eq!(stats.success, 0);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.failed_ids, vec!["1".to_string(), "2".to_string()]);
}

#[tokio::test]
async fn count_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::failing_count();
    let mut runner = runner_for(&dir, 10, Arc::new(FakeFetcher::default()));

    let err = runner.run(&source, &CancellationToken::new()).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Database(crate::error::DatabaseError::QueryFailed(_))
    ));
    assert_eq!(runner.state(), RunState::Failed);
    assert!(source.pages_requested().is_empty());
}

#[tokio::test]
async fn zero_rows_completes_without_pages() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::new(Vec::new());
    let mut runner = runner_for(&dir, 10, Arc::new(FakeFetcher::default()));

    let outcome = runner.run(&source, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, RunOutcome::Completed(RunStats::new(0)));
    assert!(source.pages_requested().is_empty());
    assert_eq!(runner.state(), RunState::Completed);
}

#[tokio::test]
async fn failing_page_is_skipped() {
    let dir = TempDir::new().unwrap();
    let rows = numbered_rows(125);
    let fetcher = Arc::new(FakeFetcher::serving(&rows));
    let source = FakeSource::new(rows).fail_page_at(50);
    let mut runner = runner_for(&dir, 50, fetcher);

    let outcome = runner.run(&source, &CancellationToken::new()).await.unwrap();

    let stats = match outcome {
        RunOutcome::Completed(stats) => stats,
        other => panic!("expected Completed, got {other:?}"),
    };
    assert_eq!(stats.total, 125);
    assert_eq!(stats.success, 75);
    assert_eq!(stats.failed, 0);
    assert!(stats.processed() < stats.total);
    assert_eq!(source.pages_requested().len(), 3);
}

#[tokio::test]
async fn cancelled_before_start_is_interrupted() {
    let dir = TempDir::new().unwrap();
    let source = FakeSource::new(numbered_rows(3));
    let mut runner = runner_for(&dir, 10, Arc::new(FakeFetcher::default()));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = runner.run(&source, &cancel).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Interrupted(_)));
    assert_eq!(runner.state(), RunState::Interrupted);
    assert!(source.pages_requested().is_empty());
}

#[tokio::test]
async fn cancellation_mid_batch_stops_before_next_row() {
    let dir = TempDir::new().unwrap();
    let rows = numbered_rows(10);
    let cancel = CancellationToken::new();
    let fetcher = Arc::new(FakeFetcher::serving(&rows).cancel_after(3, cancel.clone()));
    let source = FakeSource::new(rows);
    let mut runner = runner_for(&dir, 5, fetcher.clone());

    let outcome = runner.run(&source, &cancel).await.unwrap();

    let stats = match outcome {
        RunOutcome::Interrupted(stats) => stats,
        other => panic!("expected Interrupted, got {other:?}"),
    };
    assert_eq!(fetcher.requested().len(), 3);
    assert!(stats.success >= 2 && stats.success <= 3, "{stats:?}");
    assert_eq!(stats.failed, 0);
    assert_eq!(source.pages_requested(), vec![(0, 5)]);
    assert_eq!(runner.state(), RunState::Interrupted);
}

#[tokio::test]
async fn stats_never_exceed_total() {
    let dir = TempDir::new().unwrap();
    let mut rows = numbered_rows(6);
    rows.push(FranchiseeRow::new("x", "Nameless", None));
    let fetcher = Arc::new(FakeFetcher::serving(&rows).with_status("logos/4.png", 403));
    let source = FakeSource::new(rows);
    let mut runner = runner_for(&dir, 3, fetcher);

    let stats = runner
        .run(&source, &CancellationToken::new())
        .await
        .unwrap()
        .stats()
        .clone();

    assert_eq!(stats.total, 7);
    assert_eq!(stats.success + stats.failed, 7);
    assert_eq!(stats.failed_ids, vec!["4".to_string(), "x".to_string()]);
}

#[test]
fn new_runner_starts_not_started() {
    let dir = TempDir::new().unwrap();
    let runner = runner_for(&dir, 10, Arc::new(FakeFetcher::default()));
    assert_eq!(runner.state(), RunState::NotStarted);
    assert_eq!(runner.stats(), &RunStats::default());
}
