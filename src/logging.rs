//! Log sink setup shared by both binaries
//!
//! Every event goes to stdout and is appended to a log file, one line per
//! event in the form `[YYYY-MM-DD HH:MM:SS] [LEVEL] message key=value`.
//! The level filter comes from `RUST_LOG` and defaults to [`DEFAULT_FILTER`].

use crate::error::{Error, Result};
use chrono::Local;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Event formatter producing `[timestamp] [LEVEL] message`
#[derive(Clone, Copy, Debug, Default)]
pub struct RunLogFormat;

impl<S, N> FormatEvent<S, N> for RunLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "[{}] [{}] ",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber: stdout plus `log_file` in append mode
///
/// Parent directories of `log_file` are created. Fails instead of panicking
/// when the file cannot be opened or a subscriber is already installed.
pub fn init(log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(RunLogFormat)
        .with_writer(std::io::stdout);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(RunLogFormat)
        .with_writer(Arc::new(file));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Other(format!("failed to install log subscriber: {e}")))
}

/// `dir/<YYYYMMDD>_<suffix>.log` for today's date
pub fn dated_log_path(dir: &Path, suffix: &str) -> PathBuf {
    dir.join(format!("{}_{}.log", Local::now().format("%Y%m%d"), suffix))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
