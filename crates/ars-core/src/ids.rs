//! ID prefixes and generation.
//!
//! IDs are a short prefix plus 8 lowercase hex characters, e.g. `msg-a3f8b2c1`.

use std::fmt::Write;

use crate::errors::CoreError;

/// Prefix for chat message IDs.
pub const PREFIX_MESSAGE: &str = "msg";

/// Generate a prefixed random ID from the OS random source.
///
/// # Errors
///
/// Returns [`CoreError::IdGeneration`] if the random source is unavailable.
pub fn generate_id(prefix: &str) -> Result<String, CoreError> {
    let mut bytes = [0u8; 4];
    getrandom::fill(&mut bytes).map_err(|e| CoreError::IdGeneration(e.to_string()))?;
    let hex = bytes
        .iter()
        .fold(String::with_capacity(8), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        });
    Ok(format!("{prefix}-{hex}"))
}

/// Check that `id` has the form `{prefix}-{8 hex chars}`.
#[must_use]
pub fn has_prefix_format(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
