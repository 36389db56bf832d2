//! Interactive review state machine.
//!
//! # Overview
//!
//! An [`InteractiveSession`] walks an ordered list of [`DuplicateSet`]s and
//! turns the user's decisions into a deletion plan. Nothing is deleted until
//! the whole plan has been confirmed.
//!
//! ```text
//! Browsing(i) ──batch──▶ BatchApplying(i, keep, delete)
//!     │  ▲                      │
//!     │  └─hash verified        │ sets exhausted
//!     ▼                         ▼
//!  finish / exhausted ──▶ Confirming ──yes──▶ Executing ──▶ Done
//!     │                       │ no / empty plan
//!     └──quit──▶ Aborted ◀────┘ (empty plan goes to Done)
//! ```
//!
//! Each call to [`InteractiveSession::step`] performs one transition, so the
//! machine can be driven and inspected without a terminal. Presentation and
//! deletion are delegated to a [`Presenter`] and a [`Deleter`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::prompt::{PromptOptions, Presenter};
use crate::actions::{Deleter, DeletionResult};
use crate::duplicates::{DuplicateSet, VerificationState};
use crate::scanner::HashEngine;

/// A decision for the set currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Leave the set alone.
    Skip,
    /// Delete this member, keeping the others.
    Delete(PathBuf),
    /// Delete this set's member in `delete_dir`, then do the same for every
    /// remaining set without asking.
    BatchByDirectory { keep_dir: PathBuf, delete_dir: PathBuf },
    /// Fingerprint the members now and show the set again.
    ComputeHash,
    /// Stop reviewing and go to confirmation.
    FinishEarly,
    /// Leave without deleting anything.
    Quit,
}

/// Position of the session in its state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Asking the user about set `index`.
    Browsing { index: usize },
    /// Resolving set `index` onwards automatically.
    BatchApplying {
        index: usize,
        keep_dir: PathBuf,
        delete_dir: PathBuf,
    },
    /// Waiting for the final go-ahead.
    Confirming,
    /// Deleting the planned files.
    Executing,
    /// Finished normally.
    Done,
    /// Left without deleting anything.
    Aborted,
}

impl SessionState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// There was nothing to review.
    #[default]
    NoDuplicates,
    /// Review finished without selecting any file.
    NothingSelected,
    /// The plan was confirmed and executed.
    Executed,
    /// The plan was rejected at confirmation.
    Cancelled,
    /// The user quit during review.
    Quit,
}

impl SessionOutcome {
    /// Whether the session ended without touching the filesystem at the
    /// user's request.
    #[must_use]
    pub fn is_aborted(self) -> bool {
        matches!(self, Self::Cancelled | Self::Quit)
    }
}

/// A file selected for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingDeletion {
    /// Display id of the set it came from
    pub set_id: usize,
    /// File to delete
    pub path: PathBuf,
    /// Size recorded at scan time
    pub size: u64,
}

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Batch mode was switched on.
    BatchEnabled { delete_dir: PathBuf },
    /// On-demand hashing confirmed the set.
    Verified { set_id: usize },
    /// On-demand hashing found different content; the set is dropped.
    ContentMismatch { set_id: usize },
    /// On-demand hashing could not read every member; the set is dropped.
    HashFailed { set_id: usize, reasons: Vec<String> },
    /// Review ended with an empty plan.
    NothingSelected,
    /// The plan was rejected at confirmation.
    Cancelled,
}

/// Result of a session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSummary {
    /// Duplicate sets available for review
    pub total_sets: usize,
    /// Deletions that were planned and executed
    pub sets_processed: usize,
    /// Sets dropped after on-demand hashing
    pub sets_rejected: usize,
    /// Successful deletions
    pub files_deleted: usize,
    /// Failed deletions
    pub files_failed: usize,
    /// Bytes freed by successful deletions
    pub bytes_freed: u64,
    /// One entry per attempted deletion, in plan order
    pub results: Vec<DeletionResult>,
    /// How the session ended
    pub outcome: SessionOutcome,
}

/// Errors that end a session early.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Displaying a set or reading the user's answer failed.
    #[error("interactive I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The presenter returned an action that does not apply to the set.
    #[error("invalid action for set #{set_id}: {reason}")]
    InvalidAction { set_id: usize, reason: String },
}

/// Settings shared by every step of a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Offer batch-by-directory (only meaningful with exactly two roots).
    pub allow_batch: bool,
    /// Engine used for on-demand hashing.
    pub engine: HashEngine,
}

impl SessionOptions {
    /// Options for a run over `root_count` directories.
    #[must_use]
    pub fn for_roots(root_count: usize, engine: HashEngine) -> Self {
        Self {
            allow_batch: root_count == 2,
            engine,
        }
    }
}

/// The review state machine. See the module documentation.
#[derive(Debug)]
pub struct InteractiveSession {
    sets: Vec<DuplicateSet>,
    options: SessionOptions,
    state: SessionState,
    outcome: SessionOutcome,
    pending: Vec<PendingDeletion>,
    results: Vec<DeletionResult>,
    rejected: usize,
    known_fingerprints: HashMap<PathBuf, String>,
}

impl InteractiveSession {
    /// Start a session over `sets`. An empty list starts in [`SessionState::Done`].
    #[must_use]
    pub fn new(sets: Vec<DuplicateSet>, options: SessionOptions) -> Self {
        let known_fingerprints = sets
            .iter()
            .flat_map(|s| &s.files)
            .filter_map(|f| {
                f.fingerprint
                    .as_ref()
                    .filter(|fp| !fp.is_empty())
                    .map(|fp| (f.path.clone(), fp.clone()))
            })
            .collect();

        let state = if sets.is_empty() {
            SessionState::Done
        } else {
            SessionState::Browsing { index: 0 }
        };

        Self {
            sets,
            options,
            state,
            outcome: SessionOutcome::NoDuplicates,
            pending: Vec::new(),
            results: Vec::new(),
            rejected: 0,
            known_fingerprints,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Deletions planned so far.
    #[must_use]
    pub fn pending(&self) -> &[PendingDeletion] {
        &self.pending
    }

    #[must_use]
    pub fn sets(&self) -> &[DuplicateSet] {
        &self.sets
    }

    /// Perform one transition.
    ///
    /// Terminal states are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the presenter fails or returns an action
    /// that does not fit the current set. The plan is not executed.
    pub fn step<P, D>(&mut self, presenter: &mut P, deleter: &D) -> Result<(), SessionError>
    where
        P: Presenter + ?Sized,
        D: Deleter + ?Sized,
    {
        let next = match self.state.clone() {
            SessionState::Browsing { index } => self.browse(index, presenter)?,
            SessionState::BatchApplying {
                index,
                keep_dir,
                delete_dir,
            } => self.apply_batch(index, keep_dir, delete_dir),
            SessionState::Confirming => self.confirm(presenter)?,
            SessionState::Executing => self.execute(deleter),
            terminal @ (SessionState::Done | SessionState::Aborted) => terminal,
        };
        self.state = next;
        Ok(())
    }

    /// Drive the session to completion and return its summary.
    ///
    /// The presenter's summary hook is called unless the user quit or there
    /// was nothing to review.
    ///
    /// # Errors
    ///
    /// See [`InteractiveSession::step`].
    pub fn run<P, D>(mut self, presenter: &mut P, deleter: &D) -> Result<SessionSummary, SessionError>
    where
        P: Presenter + ?Sized,
        D: Deleter + ?Sized,
    {
        while !self.state.is_terminal() {
            self.step(presenter, deleter)?;
        }

        let summary = self.summary();
        if !matches!(
            summary.outcome,
            SessionOutcome::Quit | SessionOutcome::NoDuplicates
        ) {
            presenter.show_summary(&summary)?;
        }
        Ok(summary)
    }

    /// Summary of the session so far.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        let mut summary = SessionSummary {
            total_sets: self.sets.len(),
            sets_rejected: self.rejected,
            outcome: self.outcome,
            ..Default::default()
        };

        if self.outcome == SessionOutcome::Executed {
            summary.sets_processed = self.pending.len();
            for result in &self.results {
                if result.success {
                    summary.files_deleted += 1;
                    summary.bytes_freed += result.bytes_freed;
                } else {
                    summary.files_failed += 1;
                }
            }
            summary.results = self.results.clone();
        }
        summary
    }

    fn browse<P>(&mut self, index: usize, presenter: &mut P) -> Result<SessionState, SessionError>
    where
        P: Presenter + ?Sized,
    {
        let Some(set) = self.sets.get(index) else {
            return Ok(SessionState::Confirming);
        };

        presenter.show_set(set)?;
        let options = PromptOptions {
            allow_batch: self.options.allow_batch && set.files.len() == 2,
            allow_hash: !set.is_verified(),
        };
        let action = presenter.choose_action(set, &options)?;
        log::debug!("Set #{}: {:?}", set.id, action);

        match action {
            UserAction::Skip => Ok(SessionState::Browsing { index: index + 1 }),
            UserAction::Delete(path) => {
                self.require_equal_sizes(index)?;
                let member = self.member_by_path(index, &path)?;
                self.plan(index, member);
                Ok(SessionState::Browsing { index: index + 1 })
            }
            UserAction::BatchByDirectory {
                keep_dir,
                delete_dir,
            } => {
                if !options.allow_batch {
                    return Err(self.invalid(index, "batch mode is not available"));
                }
                self.require_equal_sizes(index)?;
                let Some(member) = set.member_in(&delete_dir) else {
                    return Err(self.invalid(
                        index,
                        format!("no member under {}", delete_dir.display()),
                    ));
                };
                self.plan(index, member);
                log::info!(
                    "Batch mode: keeping files in {}, deleting from {}",
                    keep_dir.display(),
                    delete_dir.display()
                );
                presenter.notify(&SessionEvent::BatchEnabled {
                    delete_dir: delete_dir.clone(),
                })?;
                Ok(SessionState::BatchApplying {
                    index: index + 1,
                    keep_dir,
                    delete_dir,
                })
            }
            UserAction::ComputeHash => {
                if !options.allow_hash {
                    return Ok(SessionState::Browsing { index });
                }
                self.verify_on_demand(index, presenter)
            }
            UserAction::FinishEarly => Ok(SessionState::Confirming),
            UserAction::Quit => {
                log::info!("Interactive session aborted by user");
                self.outcome = SessionOutcome::Quit;
                Ok(SessionState::Aborted)
            }
        }
    }

    fn verify_on_demand<P>(
        &mut self,
        index: usize,
        presenter: &mut P,
    ) -> Result<SessionState, SessionError>
    where
        P: Presenter + ?Sized,
    {
        let known = &self.known_fingerprints;
        let set = &mut self.sets[index];
        for file in &mut set.files {
            if !file.is_fingerprinted() {
                if let Some(fp) = known.get(&file.path) {
                    file.fingerprint = Some(fp.clone());
                }
            }
        }

        let report = self.options.engine.fingerprint_all(set.unhashed_mut());
        for file in &set.files {
            if let Some(fp) = file.fingerprint.as_ref().filter(|fp| !fp.is_empty()) {
                self.known_fingerprints
                    .entry(file.path.clone())
                    .or_insert_with(|| fp.clone());
            }
        }

        let set_id = set.id;
        match set.refresh_verification() {
            VerificationState::Verified => {
                presenter.notify(&SessionEvent::Verified { set_id })?;
                Ok(SessionState::Browsing { index })
            }
            VerificationState::Mismatch => {
                self.rejected += 1;
                presenter.notify(&SessionEvent::ContentMismatch { set_id })?;
                Ok(SessionState::Browsing { index: index + 1 })
            }
            VerificationState::Unverified => {
                self.rejected += 1;
                let reasons = report.errors.iter().map(ToString::to_string).collect();
                presenter.notify(&SessionEvent::HashFailed { set_id, reasons })?;
                Ok(SessionState::Browsing { index: index + 1 })
            }
        }
    }

    fn apply_batch(&mut self, index: usize, keep_dir: PathBuf, delete_dir: PathBuf) -> SessionState {
        let Some(set) = self.sets.get(index) else {
            return SessionState::Confirming;
        };

        if !set.sizes_match() {
            log::warn!("Set #{} members differ in size, leaving it", set.id);
            return SessionState::BatchApplying {
                index: index + 1,
                keep_dir,
                delete_dir,
            };
        }

        match set.member_in(&delete_dir) {
            Some(member) => self.plan(index, member),
            None => log::debug!(
                "Set #{} has no member under {}, leaving it",
                set.id,
                delete_dir.display()
            ),
        }

        SessionState::BatchApplying {
            index: index + 1,
            keep_dir,
            delete_dir,
        }
    }

    fn confirm<P>(&mut self, presenter: &mut P) -> Result<SessionState, SessionError>
    where
        P: Presenter + ?Sized,
    {
        if self.pending.is_empty() {
            self.outcome = SessionOutcome::NothingSelected;
            presenter.notify(&SessionEvent::NothingSelected)?;
            return Ok(SessionState::Done);
        }

        let total_bytes = self.pending.iter().map(|p| p.size).sum();
        if presenter.confirm_deletion(&self.pending, total_bytes)? {
            Ok(SessionState::Executing)
        } else {
            self.outcome = SessionOutcome::Cancelled;
            presenter.notify(&SessionEvent::Cancelled)?;
            Ok(SessionState::Aborted)
        }
    }

    fn execute<D>(&mut self, deleter: &D) -> SessionState
    where
        D: Deleter + ?Sized,
    {
        log::info!("Deleting {} files", self.pending.len());
        self.results = self
            .pending
            .iter()
            .map(|p| deleter.delete_file(&p.path))
            .collect();
        self.outcome = SessionOutcome::Executed;
        SessionState::Done
    }

    fn plan(&mut self, index: usize, member: usize) {
        let set = &self.sets[index];
        let file = &set.files[member];
        self.pending.push(PendingDeletion {
            set_id: set.id,
            path: file.path.clone(),
            size: file.size,
        });
    }

    fn require_equal_sizes(&self, index: usize) -> Result<(), SessionError> {
        if self.sets[index].sizes_match() {
            Ok(())
        } else {
            Err(self.invalid(index, "members differ in size"))
        }
    }

    fn member_by_path(&self, index: usize, path: &Path) -> Result<usize, SessionError> {
        self.sets[index]
            .files
            .iter()
            .position(|f| f.path == path)
            .ok_or_else(|| self.invalid(index, format!("{} is not a member", path.display())))
    }

    fn invalid(&self, index: usize, reason: impl Into<String>) -> SessionError {
        SessionError::InvalidAction {
            set_id: self.sets[index].id,
            reason: reason.into(),
        }
    }
}

/// Run a full review over `sets`.
///
/// # Errors
///
/// Returns [`SessionError`] if user interaction fails. No deletion is
/// performed in that case.
pub fn run_interactive_session<P, D>(
    sets: Vec<DuplicateSet>,
    options: SessionOptions,
    presenter: &mut P,
    deleter: &D,
) -> Result<SessionSummary, SessionError>
where
    P: Presenter + ?Sized,
    D: Deleter + ?Sized,
{
    InteractiveSession::new(sets, options).run(presenter, deleter)
}
