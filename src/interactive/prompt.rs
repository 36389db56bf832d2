//! Presentation hooks for the interactive session.
//!
//! The session talks to the user only through the [`Presenter`] trait.
//! [`ConsolePresenter`] implements it over any line-based reader and writer;
//! the binary binds it to stdin and stdout, tests bind it to in-memory
//! buffers.

use std::io::{self, BufRead, Write};

use bytesize::ByteSize;
use chrono::{DateTime, Local};
use yansi::Paint;

use super::session::{PendingDeletion, SessionEvent, SessionSummary, UserAction};
use crate::duplicates::DuplicateSet;

/// Which optional choices are offered for the current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PromptOptions {
    /// Batch-by-directory may be chosen.
    pub allow_batch: bool,
    /// The set is unverified and may be hashed on demand.
    pub allow_hash: bool,
}

/// User-facing side of an interactive session.
///
/// All methods block. Any error returned ends the session without deleting
/// anything.
pub trait Presenter {
    /// Display a duplicate set.
    fn show_set(&mut self, set: &DuplicateSet) -> io::Result<()>;

    /// Ask for a decision on `set`.
    fn choose_action(&mut self, set: &DuplicateSet, options: &PromptOptions)
        -> io::Result<UserAction>;

    /// Report a session event.
    fn notify(&mut self, _event: &SessionEvent) -> io::Result<()> {
        Ok(())
    }

    /// Show the deletion plan and ask whether to execute it.
    fn confirm_deletion(&mut self, plan: &[PendingDeletion], total_bytes: u64) -> io::Result<bool>;

    /// Display the final summary.
    fn show_summary(&mut self, summary: &SessionSummary) -> io::Result<()>;
}

/// Line-based console presenter.
#[derive(Debug)]
pub struct ConsolePresenter<R, W> {
    input: R,
    output: W,
}

impl ConsolePresenter<io::StdinLock<'static>, io::Stdout> {
    /// Presenter reading stdin and writing stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePresenter<R, W> {
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Read one trimmed line. End of input is an error.
    fn read_answer(&mut self) -> io::Result<String> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for a choice",
            ));
        }
        Ok(line.trim().to_string())
    }

    fn print_menu(&mut self, set: &DuplicateSet, options: &PromptOptions) -> io::Result<()> {
        let out = &mut self.output;
        writeln!(out, "Choose an action:")?;
        writeln!(out, "  [s] Skip (do nothing)")?;
        if set.files.len() == 2 {
            writeln!(out, "  [1] Keep file 1, delete file 2")?;
            writeln!(out, "  [2] Keep file 2, delete file 1")?;
        }
        if options.allow_hash {
            writeln!(out, "  [h] Compute hash to verify files are identical")?;
        }
        if options.allow_batch {
            let first = set.files[0].root.display();
            let second = set.files[1].root.display();
            writeln!(out, "  [a] Keep all from {first}, delete all from {second}")?;
            writeln!(out, "  [b] Keep all from {second}, delete all from {first}")?;
        }
        writeln!(out, "  [f] Finish selection and proceed to confirmation")?;
        writeln!(out, "  [q] Quit interactive mode")?;
        write!(out, "\nYour choice: ")
    }

    fn invalid(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}\n", message.yellow())
    }
}

fn format_mtime(time: std::time::SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

impl<R: BufRead, W: Write> Presenter for ConsolePresenter<R, W> {
    fn show_set(&mut self, set: &DuplicateSet) -> io::Result<()> {
        let out = &mut self.output;
        writeln!(out)?;
        writeln!(out, "{}", format!("=== Duplicate Set #{} ===", set.id).bold())?;
        writeln!(out, "Found {} files with the same name", set.files.len())?;
        if let Some(fingerprint) = set.fingerprint.as_deref().filter(|_| set.is_verified()) {
            let short: String = fingerprint.chars().take(16).collect();
            writeln!(out, "Hash: {}... {}", short, "(verified)".green())?;
        }
        writeln!(out)?;

        for (i, file) in set.files.iter().enumerate() {
            writeln!(out, "[{}] {}", i + 1, file.path.display().cyan())?;
            writeln!(out, "    Size: {}", ByteSize::b(file.size))?;
            writeln!(out, "    Modified: {}", format_mtime(file.modified))?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn choose_action(
        &mut self,
        set: &DuplicateSet,
        options: &PromptOptions,
    ) -> io::Result<UserAction> {
        let pair = set.files.len() == 2;
        loop {
            self.print_menu(set, options)?;
            let answer = self.read_answer()?.to_lowercase();

            match answer.as_str() {
                "s" => return Ok(UserAction::Skip),
                "q" => return Ok(UserAction::Quit),
                "f" => return Ok(UserAction::FinishEarly),
                "1" if pair => return Ok(UserAction::Delete(set.files[1].path.clone())),
                "2" if pair => return Ok(UserAction::Delete(set.files[0].path.clone())),
                "h" if options.allow_hash => return Ok(UserAction::ComputeHash),
                "h" => self.invalid("Hash already computed. Please choose a different option.")?,
                "a" if options.allow_batch => {
                    return Ok(UserAction::BatchByDirectory {
                        keep_dir: set.files[0].root.clone(),
                        delete_dir: set.files[1].root.clone(),
                    })
                }
                "b" if options.allow_batch => {
                    return Ok(UserAction::BatchByDirectory {
                        keep_dir: set.files[1].root.clone(),
                        delete_dir: set.files[0].root.clone(),
                    })
                }
                _ => self.invalid("Invalid choice. Please try again.")?,
            }
        }
    }

    fn notify(&mut self, event: &SessionEvent) -> io::Result<()> {
        let out = &mut self.output;
        match event {
            SessionEvent::BatchEnabled { delete_dir } => writeln!(
                out,
                "\n{} All remaining duplicates from {} will be deleted.\n",
                "Batch mode enabled:".bold(),
                delete_dir.display()
            ),
            SessionEvent::Verified { set_id } => {
                writeln!(out, "{}", format!("✓ Set #{set_id}: files are identical").green())
            }
            SessionEvent::ContentMismatch { set_id } => writeln!(
                out,
                "{}",
                format!("✗ Set #{set_id}: files differ in content, skipping").red()
            ),
            SessionEvent::HashFailed { set_id, reasons } => {
                writeln!(
                    out,
                    "{}",
                    format!("✗ Set #{set_id}: could not hash every file, skipping").red()
                )?;
                for reason in reasons {
                    writeln!(out, "    {reason}")?;
                }
                Ok(())
            }
            SessionEvent::NothingSelected => writeln!(out, "\nNo files selected for deletion."),
            SessionEvent::Cancelled => writeln!(out, "\nDeletion cancelled."),
        }
    }

    fn confirm_deletion(&mut self, plan: &[PendingDeletion], total_bytes: u64) -> io::Result<bool> {
        let out = &mut self.output;
        writeln!(out, "\n{}", "=== Final Confirmation ===".bold())?;
        writeln!(out, "The following {} file(s) will be deleted:\n", plan.len())?;
        for (i, pending) in plan.iter().enumerate() {
            writeln!(
                out,
                "{}. {} ({})",
                i + 1,
                pending.path.display(),
                ByteSize::b(pending.size)
            )?;
        }
        writeln!(out, "\nTotal space to be freed: {}", ByteSize::b(total_bytes))?;
        writeln!(out, "\nOptions:")?;
        writeln!(out, "  [y] Execute deletions (proceed)")?;
        writeln!(out, "  [n] Cancel all deletions (abort)")?;
        write!(out, "\nYour choice [y/N]: ")?;

        let answer = self.read_answer()?.to_lowercase();
        Ok(matches!(answer.as_str(), "y" | "yes"))
    }

    fn show_summary(&mut self, summary: &SessionSummary) -> io::Result<()> {
        let out = &mut self.output;
        writeln!(out, "\n{}", "=== Interactive Session Summary ===".bold())?;
        writeln!(out, "Duplicate Sets Found: {}", summary.total_sets)?;
        writeln!(out, "Files Deleted: {}", summary.files_deleted)?;
        if summary.files_failed > 0 {
            writeln!(out, "Failed Deletions: {}", summary.files_failed)?;
        }
        writeln!(out, "Space Freed: {}", ByteSize::b(summary.bytes_freed))?;

        if summary.files_deleted > 0 {
            writeln!(out, "\nSuccessfully Deleted:")?;
            for result in summary.results.iter().filter(|r| r.success) {
                writeln!(
                    out,
                    "  {} {} ({} freed)",
                    "✓".green(),
                    result.path.display(),
                    ByteSize::b(result.bytes_freed)
                )?;
            }
        }

        if summary.files_failed > 0 {
            writeln!(out, "\nFailed Deletions:")?;
            for result in summary.results.iter().filter(|r| !r.success) {
                writeln!(out, "  {} {}", "✗".red(), result.path.display())?;
                if let Some(ref error) = result.error {
                    writeln!(out, "     Error: {error}")?;
                }
            }
        }
        Ok(())
    }
}
