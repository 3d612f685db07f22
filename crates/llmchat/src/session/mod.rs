//! Session state: transcripts, the session store, and prompt handling.

mod store;
mod transcript;
mod turn;

pub use store::{Session, SessionHandle, SessionStore};
pub use transcript::Transcript;
pub use turn::{ChatSelection, TurnOutcome, is_missing};
