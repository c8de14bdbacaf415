//! Cross-cutting error types.
//!
//! Domain-specific errors (`ClientError`, `SessionError`) are defined in
//! their respective crates. The binary converges them through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any `ars` crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The OS random source could not produce an identifier.
    #[error("ID generation failed: {0}")]
    IdGeneration(String),
}
