//! # ars-session
//!
//! Client-side lifecycle of research sessions.
//!
//! A submitted topic becomes a user message plus an assistant placeholder in
//! the [`ChatStore`]; the [`SessionController`] starts the backend session,
//! polls it on a fixed interval and merges each snapshot into the
//! placeholder until a terminal snapshot arrives. [`progress`] derives the
//! "thinking" indicator from the latest snapshot and [`export`] writes the
//! finished HTML report.

pub mod controller;
pub mod error;
pub mod export;
pub mod progress;
pub mod store;

pub use controller::{ActiveSession, SessionController};
pub use error::SessionError;
pub use progress::{ResearchPhase, ThinkingView};
pub use store::{Applied, ChatStore, SessionPhase, StoreAction};
