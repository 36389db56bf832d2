use super::support::{compare, write_file, Choice, Recorder, Script};
use crossdupe::actions::PermanentDeleter;
use crossdupe::duplicates::{build_duplicate_sets, BuildMode};
use crossdupe::interactive::{
    run_interactive_session, SessionEvent, SessionOptions, SessionOutcome,
};
use crossdupe::scanner::HashEngine;
use std::path::Path;
use tempfile::tempdir;

fn options(roots: usize) -> SessionOptions {
    SessionOptions::for_roots(roots, HashEngine::default())
}

#[test]
fn test_eager_mode_drops_different_content() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(a.path(), "same.txt", b"one");
    write_file(b.path(), "same.txt", b"two");

    let comparisons = compare(&[a.path(), b.path()], true);
    assert!(build_duplicate_sets(&comparisons, BuildMode::Eager).is_empty());
    assert_eq!(build_duplicate_sets(&comparisons, BuildMode::Lazy).len(), 1);
}

#[test]
fn test_delete_second_member_after_confirmation() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let kept = write_file(a.path(), "a.txt", b"content");
    let removed = write_file(b.path(), "a.txt", b"content");

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], true), BuildMode::Eager);
    let mut script = Script::new([Choice::Delete(1)], true);
    let summary =
        run_interactive_session(sets, options(2), &mut script, &PermanentDeleter).unwrap();

    assert_eq!(summary.outcome, SessionOutcome::Executed);
    assert_eq!(summary.files_deleted, 1);
    assert_eq!(summary.bytes_freed, 7);
    assert!(kept.exists());
    assert!(!removed.exists());
    assert_eq!(script.confirmations.len(), 1);
    assert_eq!(script.confirmations[0].1, 7);
    assert_eq!(script.summaries.len(), 1);
}

#[test]
fn test_quit_on_first_set_leaves_files_intact() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let first = write_file(a.path(), "a.txt", b"x");
    let second = write_file(b.path(), "a.txt", b"x");
    write_file(a.path(), "b.txt", b"y");
    write_file(b.path(), "b.txt", b"y");

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], false), BuildMode::Lazy);
    let mut script = Script::new([Choice::Quit], true);
    let summary =
        run_interactive_session(sets, options(2), &mut script, &PermanentDeleter).unwrap();

    assert_eq!(summary.outcome, SessionOutcome::Quit);
    assert_eq!(summary.files_deleted, 0);
    assert_eq!(script.shown, vec![1]);
    assert!(script.confirmations.is_empty());
    assert!(script.summaries.is_empty());
    assert!(first.exists() && second.exists());
}

#[test]
fn test_declined_confirmation_deletes_nothing() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let first = write_file(a.path(), "a.txt", b"x");
    let second = write_file(b.path(), "a.txt", b"x");

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], false), BuildMode::Lazy);
    let mut script = Script::new([Choice::Delete(0)], false);
    let summary =
        run_interactive_session(sets, options(2), &mut script, &PermanentDeleter).unwrap();

    assert_eq!(summary.outcome, SessionOutcome::Cancelled);
    assert!(summary.results.is_empty());
    assert!(script.events.contains(&SessionEvent::Cancelled));
    assert!(first.exists() && second.exists());
}

#[test]
fn test_batch_deletes_every_remaining_member_in_directory() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    for name in ["1.txt", "2.txt", "3.txt"] {
        write_file(a.path(), name, b"keep");
        write_file(b.path(), name, b"drop");
    }

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], false), BuildMode::Lazy);
    let mut script = Script::new([Choice::BatchDelete(1)], true);
    let deleter = Recorder::default();
    let summary = run_interactive_session(sets, options(2), &mut script, &deleter).unwrap();

    let b_root = b.path().canonicalize().unwrap();
    let requests = deleter.requests.borrow();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|p| p.starts_with(&b_root)));
    assert_eq!(summary.files_deleted, 3);
    assert_eq!(summary.bytes_freed, 12);
    // Only the first set was shown; the rest were resolved automatically.
    assert_eq!(script.shown, vec![1]);
}

#[test]
fn test_batch_not_offered_with_three_directories() {
    let dirs = [tempdir().unwrap(), tempdir().unwrap(), tempdir().unwrap()];
    for dir in &dirs {
        write_file(dir.path(), "a.txt", b"x");
    }
    let roots: Vec<&Path> = dirs.iter().map(|d| d.path()).collect();

    let sets = build_duplicate_sets(&compare(&roots, false), BuildMode::Lazy);
    assert_eq!(sets.len(), 3);

    let mut script = Script::new([Choice::Skip, Choice::Skip, Choice::Skip], true);
    let deleter = Recorder::default();
    let summary = run_interactive_session(sets, options(3), &mut script, &deleter).unwrap();

    assert!(script.offered.iter().all(|o| !o.allow_batch));
    assert_eq!(summary.outcome, SessionOutcome::NothingSelected);
    assert!(deleter.requests.borrow().is_empty());
}

#[test]
fn test_finish_early_skips_remaining_sets() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    for name in ["1.txt", "2.txt", "3.txt"] {
        write_file(a.path(), name, b"x");
        write_file(b.path(), name, b"x");
    }

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], false), BuildMode::Lazy);
    let mut script = Script::new([Choice::Delete(0), Choice::Finish], true);
    let deleter = Recorder::default();
    let summary = run_interactive_session(sets, options(2), &mut script, &deleter).unwrap();

    assert_eq!(script.shown, vec![1, 2]);
    assert_eq!(summary.sets_processed, 1);
    assert_eq!(deleter.requests.borrow().len(), 1);
}

#[test]
fn test_on_demand_hash_rejects_mismatch_and_verifies_match() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(a.path(), "1_differs.txt", b"left");
    write_file(b.path(), "1_differs.txt", b"rite");
    write_file(a.path(), "2_same.txt", b"same");
    write_file(b.path(), "2_same.txt", b"same");

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], false), BuildMode::Lazy);
    let mut script = Script::new([Choice::Hash, Choice::Hash, Choice::Delete(1)], true);
    let deleter = Recorder::default();
    let summary = run_interactive_session(sets, options(2), &mut script, &deleter).unwrap();

    assert_eq!(
        script.events[..2],
        [
            SessionEvent::ContentMismatch { set_id: 1 },
            SessionEvent::Verified { set_id: 2 },
        ]
    );
    // The verified set is shown again, without the hash option.
    assert_eq!(script.shown, vec![1, 2, 2]);
    assert!(!script.offered[2].allow_hash);
    assert_eq!(summary.sets_rejected, 1);
    assert_eq!(summary.files_deleted, 1);
}

#[test]
fn test_hash_failure_on_demand_skips_set() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    write_file(a.path(), "gone.txt", b"x");
    let vanishing = write_file(b.path(), "gone.txt", b"x");

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], false), BuildMode::Lazy);
    std::fs::remove_file(&vanishing).unwrap();

    let mut script = Script::new([Choice::Hash], true);
    let summary =
        run_interactive_session(sets, options(2), &mut script, &Recorder::default()).unwrap();

    assert!(matches!(
        script.events[0],
        SessionEvent::HashFailed { set_id: 1, .. }
    ));
    assert_eq!(summary.sets_rejected, 1);
    assert_eq!(summary.outcome, SessionOutcome::NothingSelected);
}

#[test]
fn test_batch_never_deletes_files_of_different_size() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let small = write_file(a.path(), "1_clip.bin", &[0; 4]);
    let large = write_file(b.path(), "1_clip.bin", &[0; 5000]);
    write_file(a.path(), "2_movie.bin", &[1; 5]);
    let other = write_file(b.path(), "2_movie.bin", &[1; 9000]);
    write_file(a.path(), "3_song.bin", b"tune");
    let copy = write_file(b.path(), "3_song.bin", b"tune");

    let sets = build_duplicate_sets(&compare(&[a.path(), b.path()], false), BuildMode::Lazy);
    assert_eq!(sets.len(), 1);

    let mut script = Script::new([Choice::BatchDelete(1)], true);
    let summary =
        run_interactive_session(sets, options(2), &mut script, &PermanentDeleter).unwrap();

    assert_eq!(summary.files_deleted, 1);
    assert_eq!(summary.bytes_freed, 4);
    assert!(!copy.exists());
    assert!(small.exists() && large.exists() && other.exists());
}
