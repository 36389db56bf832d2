use super::support::write_file;
use crossdupe::scanner::{ScanError, ScanOptions, Scanner};
use filetime::{set_file_mtime, FileTime};
use std::path::PathBuf;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::tempdir;

fn names(scanner: &Scanner, root: &std::path::Path) -> Vec<String> {
    scanner
        .scan(root)
        .unwrap()
        .files
        .iter()
        .map(|f| f.relative_path().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[test]
fn test_records_carry_absolute_paths_and_mtime() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "sub/file.dat", b"12345");
    set_file_mtime(&path, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();

    let listing = Scanner::new(ScanOptions::default()).scan(dir.path()).unwrap();
    let record = &listing.files[0];

    assert!(record.path.is_absolute());
    assert_eq!(record.root, dir.path().canonicalize().unwrap());
    assert_eq!(record.size, 5);
    assert_eq!(record.modified, UNIX_EPOCH + Duration::from_secs(1_600_000_000));
    assert!(record.fingerprint.is_none());
}

#[test]
fn test_hidden_files_and_empty_files_are_included() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), ".hidden", b"h");
    write_file(dir.path(), "empty", b"");

    let found = names(&Scanner::new(ScanOptions::default()), dir.path());
    assert_eq!(found, vec![".hidden", "empty"]);
}

#[test]
fn test_depth_zero_matches_non_recursive() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "top.txt", b"1");
    write_file(dir.path(), "a/mid.txt", b"1");
    write_file(dir.path(), "a/b/low.txt", b"1");

    let depth_zero = Scanner::new(ScanOptions {
        max_depth: Some(0),
        ..ScanOptions::default()
    });
    let flat = Scanner::new(ScanOptions {
        recursive: false,
        ..ScanOptions::default()
    });

    assert_eq!(names(&depth_zero, dir.path()), vec!["top.txt"]);
    assert_eq!(names(&flat, dir.path()), vec!["top.txt"]);
}

#[test]
fn test_size_and_extension_filters_combine() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "big.MKV", &[0u8; 100]);
    write_file(dir.path(), "small.mkv", &[0u8; 10]);
    write_file(dir.path(), "big.txt", &[0u8; 100]);

    let scanner = Scanner::new(
        ScanOptions {
            min_size: 50,
            ..ScanOptions::default()
        }
        .with_extensions([".mkv"]),
    );
    assert_eq!(names(&scanner, dir.path()), vec!["big.MKV"]);
}

#[test]
fn test_scan_all_fails_on_missing_root() {
    let dir = tempdir().unwrap();
    let roots = vec![dir.path().to_path_buf(), PathBuf::from("/definitely/not/here")];

    let result = Scanner::new(ScanOptions::default()).scan_all(&roots);
    assert!(matches!(result, Err(ScanError::NotFound(_))));
}
