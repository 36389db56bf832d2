use super::support::{compare, write_file};
use crossdupe::actions::PermanentDeleter;
use crossdupe::duplicates::{build_duplicate_sets, BuildMode};
use crossdupe::interactive::{
    run_interactive_session, ConsolePresenter, SessionError, SessionOptions, SessionOutcome,
};
use crossdupe::scanner::HashEngine;
use chrono::{DateTime, Local};
use filetime::{set_file_mtime, FileTime};
use std::io::Cursor;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::tempdir;

fn console(input: &str) -> ConsolePresenter<Cursor<Vec<u8>>, Vec<u8>> {
    yansi::disable();
    ConsolePresenter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

#[test]
fn test_keep_second_deletes_first_through_console() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let first = write_file(a.path(), "photo.jpg", b"pixels");
    let second = write_file(b.path(), "photo.jpg", b"pixels");

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], true), BuildMode::Eager);
    let mut presenter = console("x\n2\ny\n");
    let summary = run_interactive_session(
        sets,
        SessionOptions::for_roots(2, HashEngine::default()),
        &mut presenter,
        &PermanentDeleter,
    )
    .unwrap();

    assert_eq!(summary.outcome, SessionOutcome::Executed);
    assert!(!first.exists());
    assert!(second.exists());

    let (_, output) = presenter.into_inner();
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("=== Duplicate Set #1 ==="));
    assert!(output.contains("(verified)"));
    assert!(output.contains("Invalid choice"));
    assert!(output.contains("=== Final Confirmation ==="));
    assert!(output.contains("Files Deleted: 1"));
}

#[test]
fn test_modified_time_is_displayed() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let first = write_file(a.path(), "old.txt", b"x");
    write_file(b.path(), "old.txt", b"x");
    set_file_mtime(&first, FileTime::from_unix_time(946_684_800, 0)).unwrap();
    let expected = DateTime::<Local>::from(UNIX_EPOCH + Duration::from_secs(946_684_800))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], false), BuildMode::Lazy);
    let mut presenter = console("q\n");
    let summary = run_interactive_session(
        sets,
        SessionOptions::for_roots(2, HashEngine::default()),
        &mut presenter,
        &PermanentDeleter,
    )
    .unwrap();
    assert_eq!(summary.outcome, SessionOutcome::Quit);

    let (_, output) = presenter.into_inner();
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains(&format!("Modified: {expected}")));
    assert!(output.contains("[h] Compute hash"));
    assert!(output.contains("[a] Keep all from"));
}

#[test]
fn test_closed_input_fails_without_deleting() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let first = write_file(a.path(), "a.txt", b"x");
    let second = write_file(b.path(), "a.txt", b"x");

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], false), BuildMode::Lazy);
    let mut presenter = console("1\n");
    let result = run_interactive_session(
        sets,
        SessionOptions::for_roots(2, HashEngine::default()),
        &mut presenter,
        &PermanentDeleter,
    );

    assert!(matches!(result, Err(SessionError::Io(_))));
    assert!(first.exists() && second.exists());
}
