use super::*;
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use tempfile::TempDir;

/// Source tree with two images, one of them nested
fn source_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("1_Alpha_1234.png"), vec![7u8; 4096]).unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/2_Beta_5678.jpg"), b"jpeg bytes").unwrap();
    dir
}

fn zip_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut body = Vec::new();
        file.read_to_end(&mut body).unwrap();
        entries.push((file.name().to_string(), body));
    }
    entries.sort();
    entries
}

fn tar_gz_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = tar::Archive::new(GzDecoder::new(fs::File::open(path).unwrap()));
    let mut entries = Vec::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = entry.path().unwrap().to_string_lossy().into_owned();
        let mut body = Vec::new();
        entry.read_to_end(&mut body).unwrap();
        entries.push((name, body));
    }
    entries.sort();
    entries
}

#[test]
fn format_parsing_accepts_aliases() {
    assert_eq!("zip".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::Zip);
    assert_eq!(" ZIP ".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::Zip);
    assert_eq!("tar.gz".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
    assert_eq!("TarGz".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
    assert_eq!("tgz".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
}

#[test]
fn unknown_format_lists_supported_ones() {
    let err = "rar".parse::<ArchiveFormat>().unwrap_err();
    assert!(matches!(err, ArchiveError::UnsupportedFormat(ref f) if f == "rar"));
    assert!(err.to_string().contains("zip, tar.gz"));
}

#[test]
fn format_size_units() {
    assert_eq!(format_size(0), "0.00 B");
    assert_eq!(format_size(1023), "1023.00 B");
    assert_eq!(format_size(1024), "1.00 KB");
    assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    assert_eq!(format_size(1024u64.pow(4)), "1.00 TB");
    assert_eq!(format_size(1024u64.pow(5)), "1024.00 TB");
}

#[test]
fn ratio_is_zero_for_empty_source() {
    assert_eq!(compression_ratio(0, 120), 0.0);
    assert_eq!(compression_ratio(400, 100), 75.0);
}

#[test]
fn default_name_has_timestamp_and_extension() {
    let name = default_archive_name(ArchiveFormat::TarGz);
    assert!(name.starts_with("images_"), "{name}");
    assert!(name.ends_with(".tar.gz"), "{name}");
    // images_ + YYYYMMDD_HHMMSS + .tar.gz
    assert_eq!(name.len(), 7 + 15 + 7);
}

#[test]
fn new_creates_output_dir() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("compressed/nested");
    let archiver = Archiver::new(root.path(), &out).unwrap();
    assert!(out.is_dir());
    assert_eq!(archiver.output_dir(), out.as_path());
}

#[test]
fn zip_contains_relative_entries() {
    let source = source_tree();
    let out = TempDir::new().unwrap();
    let archiver = Archiver::new(source.path(), out.path()).unwrap();

    let report = archiver
        .compress(ArchiveFormat::Zip, Some("logos.zip"), DEFAULT_LEVEL)
        .unwrap();

    assert_eq!(report.archive, out.path().join("logos.zip"));
    assert_eq!(report.file_count, 2);
    assert_eq!(report.original_size, 4096 + 10);
    assert_eq!(
        report.compressed_size,
        fs::metadata(&report.archive).unwrap().len()
    );

    let entries = zip_entries(&report.archive);
    assert_eq!(
        entries,
        vec![
            ("1_Alpha_1234.png".to_string(), vec![7u8; 4096]),
            ("sub/2_Beta_5678.jpg".to_string(), b"jpeg bytes".to_vec()),
        ]
    );
    // Highly repetitive input compresses well
    assert!(report.ratio() > 50.0, "ratio {}", report.ratio());
}

#[test]
fn zip_level_zero_stores_entries() {
    let source = source_tree();
    let out = TempDir::new().unwrap();
    let archiver = Archiver::new(source.path(), out.path()).unwrap();

    let report = archiver
        .compress(ArchiveFormat::Zip, Some("stored.zip"), 0)
        .unwrap();

    assert!(report.compressed_size > report.original_size);
    assert_eq!(zip_entries(&report.archive).len(), 2);
}

#[test]
fn tar_gz_contains_relative_entries() {
    let source = source_tree();
    let out = TempDir::new().unwrap();
    let archiver = Archiver::new(source.path(), out.path()).unwrap();

    let report = archiver
        .compress(ArchiveFormat::TarGz, None, DEFAULT_LEVEL)
        .unwrap();

    let name = report.archive.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("images_") && name.ends_with(".tar.gz"), "{name}");

    let entries = tar_gz_entries(&report.archive);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "1_Alpha_1234.png");
    assert_eq!(entries[1].0, "sub/2_Beta_5678.jpg");
    assert_eq!(entries[1].1, b"jpeg bytes");
}

#[test]
fn empty_source_produces_empty_archive() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let archiver = Archiver::new(source.path(), out.path()).unwrap();

    let report = archiver
        .compress(ArchiveFormat::Zip, Some("empty.zip"), DEFAULT_LEVEL)
        .unwrap();

    assert_eq!(report.file_count, 0);
    assert_eq!(report.original_size, 0);
    assert_eq!(report.ratio(), 0.0);
    assert!(zip_entries(&report.archive).is_empty());
}

#[test]
fn archive_inside_source_is_not_added_to_itself() {
    let source = source_tree();
    let archiver = Archiver::new(source.path(), source.path()).unwrap();

    let report = archiver
        .compress(ArchiveFormat::Zip, Some("self.zip"), DEFAULT_LEVEL)
        .unwrap();

    assert_eq!(report.file_count, 2);
    let names: Vec<String> = zip_entries(&report.archive)
        .into_iter()
        .map(|(n, _)| n)
        .collect();
    assert!(!names.contains(&"self.zip".to_string()));
}

#[test]
fn missing_source_is_an_error() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("out");
    let archiver = Archiver::new(root.path().join("missing"), &out).unwrap();

    let err = archiver
        .compress(ArchiveFormat::Zip, Some("x.zip"), DEFAULT_LEVEL)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Archive(ArchiveError::SourceMissing(_))
    ));
    assert!(!out.join("x.zip").exists());
}

#[test]
fn level_above_nine_is_rejected() {
    let source = source_tree();
    let out = TempDir::new().unwrap();
    let archiver = Archiver::new(source.path(), out.path()).unwrap();

    let err = archiver
        .compress(ArchiveFormat::Zip, Some("x.zip"), 10)
        .unwrap_err();

    assert!(matches!(err, Error::Archive(ArchiveError::InvalidLevel(10))));
    assert!(!out.path().join("x.zip").exists());
}

#[test]
fn unwritable_output_is_an_error_without_leftovers() {
    let source = source_tree();
    let out = TempDir::new().unwrap();
    // A directory already occupies the archive path
    fs::create_dir(out.path().join("taken.zip")).unwrap();
    let archiver = Archiver::new(source.path(), out.path()).unwrap();

    let result = archiver.compress(ArchiveFormat::Zip, Some("taken.zip"), DEFAULT_LEVEL);

    assert!(result.is_err());
    assert!(out.path().join("taken.zip").is_dir());
}

#[test]
fn remove_partial_deletes_file() {
    let dir = TempDir::new().unwrap();
    let partial = dir.path().join("partial.tar.gz");
    fs::write(&partial, b"half").unwrap();

    remove_partial(&partial);
    assert!(!partial.exists());

    // Already gone is fine
    remove_partial(&partial);
}
