//! Fixtures and test doubles shared by the integration tests.

use crossdupe::actions::{Deleter, DeletionResult};
use crossdupe::duplicates::{compare_all, DuplicateSet, PairComparison, PairMatcher};
use crossdupe::interactive::{
    PendingDeletion, Presenter, PromptOptions, SessionEvent, SessionSummary, UserAction,
};
use crossdupe::scanner::{HashEngine, RootListing, ScanOptions, Scanner};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Scan `roots` with default options.
pub fn scan(roots: &[&Path]) -> Vec<RootListing> {
    let roots: Vec<PathBuf> = roots.iter().map(|r| r.to_path_buf()).collect();
    Scanner::new(ScanOptions::default()).scan_all(&roots).unwrap()
}

/// Scan and compare `roots`, optionally verifying content.
pub fn compare(roots: &[&Path], verify: bool) -> Vec<PairComparison> {
    let mut listings = scan(roots);
    let matcher = PairMatcher::new(HashEngine::default()).with_verify_content(verify);
    compare_all(&mut listings, &matcher).0
}

/// A scripted decision, resolved against the set on screen.
#[derive(Debug, Clone, Copy)]
pub enum Choice {
    Skip,
    /// Delete the member at this index.
    Delete(usize),
    /// Batch mode deleting from the directory of the member at this index.
    BatchDelete(usize),
    Hash,
    Finish,
    Quit,
}

/// Presenter that plays back a fixed list of choices.
#[derive(Default)]
pub struct Script {
    pub choices: VecDeque<Choice>,
    pub confirm: bool,
    pub shown: Vec<usize>,
    pub offered: Vec<PromptOptions>,
    pub events: Vec<SessionEvent>,
    pub confirmations: Vec<(Vec<PendingDeletion>, u64)>,
    pub summaries: Vec<SessionSummary>,
}

impl Script {
    pub fn new(choices: impl IntoIterator<Item = Choice>, confirm: bool) -> Self {
        Self {
            choices: choices.into_iter().collect(),
            confirm,
            ..Self::default()
        }
    }
}

impl Presenter for Script {
    fn show_set(&mut self, set: &DuplicateSet) -> io::Result<()> {
        self.shown.push(set.id);
        Ok(())
    }

    fn choose_action(
        &mut self,
        set: &DuplicateSet,
        options: &PromptOptions,
    ) -> io::Result<UserAction> {
        self.offered.push(*options);
        let choice = self
            .choices
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))?;

        Ok(match choice {
            Choice::Skip => UserAction::Skip,
            Choice::Delete(i) => UserAction::Delete(set.files[i].path.clone()),
            Choice::BatchDelete(i) => UserAction::BatchByDirectory {
                keep_dir: set.files[1 - i].root.clone(),
                delete_dir: set.files[i].root.clone(),
            },
            Choice::Hash => UserAction::ComputeHash,
            Choice::Finish => UserAction::FinishEarly,
            Choice::Quit => UserAction::Quit,
        })
    }

    fn notify(&mut self, event: &SessionEvent) -> io::Result<()> {
        self.events.push(event.clone());
        Ok(())
    }

    fn confirm_deletion(&mut self, plan: &[PendingDeletion], total_bytes: u64) -> io::Result<bool> {
        self.confirmations.push((plan.to_vec(), total_bytes));
        Ok(self.confirm)
    }

    fn show_summary(&mut self, summary: &SessionSummary) -> io::Result<()> {
        self.summaries.push(summary.clone());
        Ok(())
    }
}

/// Deleter that records requests without touching the filesystem.
#[derive(Default)]
pub struct Recorder {
    pub requests: RefCell<Vec<PathBuf>>,
}

impl Deleter for Recorder {
    fn delete_file(&self, path: &Path) -> DeletionResult {
        self.requests.borrow_mut().push(path.to_path_buf());
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        DeletionResult::deleted(path.to_path_buf(), size)
    }
}
