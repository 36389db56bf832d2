//! Interactive review of duplicate sets.
//!
//! - [`session`]: the review state machine and its summary types
//! - [`prompt`]: presentation hooks and the console implementation

pub mod prompt;
pub mod session;

pub use prompt::{ConsolePresenter, Presenter, PromptOptions};
pub use session::{
    run_interactive_session, InteractiveSession, PendingDeletion, SessionError, SessionEvent,
    SessionOptions, SessionOutcome, SessionState, SessionSummary, UserAction,
};
