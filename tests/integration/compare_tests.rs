use super::support::{compare, scan, write_file};
use crossdupe::duplicates::{compare_all, HashStatus, MatchKey, PairMatcher};
use crossdupe::error::ExitCode;
use crossdupe::output::{JsonOutput, RunStats, TextOutput};
use crossdupe::scanner::HashEngine;
use tempfile::tempdir;

#[test]
fn test_shared_name_reported_once_per_pair() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(a.path(), "a.txt", b"x");
    write_file(b.path(), "a.txt", b"x");
    write_file(b.path(), "b.txt", b"y");

    let comparisons = compare(&[a.path(), b.path()], true);

    assert_eq!(comparisons.len(), 1);
    let matches = &comparisons[0].matches;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "a.txt");
    assert_eq!(matches[0].status, HashStatus::Identical);
}

#[test]
fn test_same_name_different_content() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(a.path(), "same.txt", b"one");
    write_file(b.path(), "same.txt", b"two");

    let comparisons = compare(&[a.path(), b.path()], true);
    assert_eq!(comparisons[0].matches[0].status, HashStatus::Different);
    assert_eq!(comparisons[0].identical_count(), 0);
}

#[test]
fn test_names_only_leaves_status_unchecked() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(a.path(), "same.txt", b"one");
    write_file(b.path(), "same.txt", b"two");

    let comparisons = compare(&[a.path(), b.path()], false);
    let file_match = &comparisons[0].matches[0];
    assert_eq!(file_match.status, HashStatus::NotChecked);
    assert!(file_match.left.fingerprint.is_none());
    assert!(file_match.right.fingerprint.is_none());
}

#[test]
fn test_three_directories_compare_every_pair_in_order() {
    let dirs = [tempdir().unwrap(), tempdir().unwrap(), tempdir().unwrap()];
    for dir in &dirs {
        write_file(dir.path(), "common.bin", b"shared");
    }
    write_file(dirs[0].path(), "only_first.bin", b"1");

    let roots: Vec<_> = dirs.iter().map(|d| d.path()).collect();
    let comparisons = compare(&roots, true);

    let canonical: Vec<_> = dirs
        .iter()
        .map(|d| d.path().canonicalize().unwrap())
        .collect();
    let labels: Vec<_> = comparisons
        .iter()
        .map(|c| (c.left_dir.clone(), c.right_dir.clone()))
        .collect();
    assert_eq!(
        labels,
        vec![
            (canonical[0].clone(), canonical[1].clone()),
            (canonical[0].clone(), canonical[2].clone()),
            (canonical[1].clone(), canonical[2].clone()),
        ]
    );
    assert!(comparisons
        .iter()
        .all(|c| c.matches.len() == 1 && c.identical_count() == 1));
}

#[test]
fn test_nested_files_match_by_name_across_depths() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(a.path(), "deep/er/report.pdf", b"pdf");
    write_file(b.path(), "report.pdf", b"pdf");

    let comparisons = compare(&[a.path(), b.path()], false);
    assert_eq!(comparisons[0].matches.len(), 1);
}

#[test]
fn test_relative_path_key_requires_same_location() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(a.path(), "x/report.pdf", b"pdf");
    write_file(b.path(), "y/report.pdf", b"pdf");
    write_file(a.path(), "x/notes.txt", b"n");
    write_file(b.path(), "x/notes.txt", b"n");

    let mut listings = scan(&[a.path(), b.path()]);
    let matcher = PairMatcher::new(HashEngine::default()).with_match_key(MatchKey::RelativePath);
    let (comparisons, _) = compare_all(&mut listings, &matcher);

    let names: Vec<_> = comparisons[0].matches.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with("notes.txt"));
}

#[test]
fn test_empty_directory_reports_no_duplicates() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(a.path(), "lonely.txt", b"1");

    let comparisons = compare(&[a.path(), b.path()], false);
    let text = TextOutput::new(false).format_all(&comparisons);
    assert!(text.ends_with("(No duplicates)\n"));
}

#[test]
fn test_json_report_of_real_run() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(a.path(), "a.txt", b"same");
    write_file(b.path(), "a.txt", b"same");

    let comparisons = compare(&[a.path(), b.path()], true);
    let stats = RunStats {
        directories: 2,
        total_files: 2,
        ..RunStats::default()
    };
    let json = JsonOutput::new(&comparisons, &stats, ExitCode::Success)
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["summary"]["identical"], 1);
    assert_eq!(value["summary"]["exit_code_name"], "CD000");
    let left = &value["comparisons"][0]["matches"][0]["left"];
    let right = &value["comparisons"][0]["matches"][0]["right"];
    assert_eq!(left["size"], 4);
    assert_eq!(left["fingerprint"], right["fingerprint"]);
}
