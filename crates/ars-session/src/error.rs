//! Session error types.

use ars_client::ClientError;
use ars_core::errors::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The submitted topic was empty or whitespace.
    #[error("research topic must not be empty")]
    EmptyTopic,

    /// A request is already outstanding and the caller asked not to queue another.
    #[error("a research request is already in progress")]
    Busy,

    /// The initial `POST /research` failed. The placeholder message already
    /// carries the failure text; no polling was started.
    #[error("error starting research: {source}")]
    Submission {
        message_id: String,
        #[source]
        source: ClientError,
    },

    /// No message with this id exists in the thread.
    #[error("unknown message: {0}")]
    UnknownMessage(String),

    /// Report export was requested for a message without an HTML report.
    #[error("no HTML report is available")]
    NoReport,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
