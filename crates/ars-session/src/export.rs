//! Writing a finished HTML report to disk.

use std::fs;
use std::path::{Path, PathBuf};

use ars_core::entities::{ChatMessage, ResearchState};
use chrono::{NaiveDate, Utc};

use crate::error::SessionError;

/// `agentic-report-YYYY-MM-DD.html`
#[must_use]
pub fn report_file_name(date: NaiveDate) -> String {
    format!("agentic-report-{}.html", date.format("%Y-%m-%d"))
}

/// Export the HTML report attached to `message` into `dir`.
///
/// # Errors
///
/// Returns [`SessionError::NoReport`] when the message has no non-empty
/// HTML report, or [`SessionError::Io`] if the file cannot be written.
pub fn export_message_report(message: &ChatMessage, dir: &Path) -> Result<PathBuf, SessionError> {
    let html = message.html_report().ok_or(SessionError::NoReport)?;
    write_report(html, dir, Utc::now().date_naive())
}

/// Export the HTML report of a fetched snapshot into `dir`.
///
/// # Errors
///
/// Same as [`export_message_report`].
pub fn export_state_report(state: &ResearchState, dir: &Path) -> Result<PathBuf, SessionError> {
    let html = state
        .html_output
        .as_deref()
        .filter(|_| state.has_html_report())
        .ok_or(SessionError::NoReport)?;
    write_report(html, dir, Utc::now().date_naive())
}

/// Write `html` as the report for `date`, creating `dir` if needed.
/// An existing report for the same day is overwritten.
///
/// # Errors
///
/// Returns [`SessionError::NoReport`] for empty HTML, or
/// [`SessionError::Io`] on filesystem failure.
pub fn write_report(html: &str, dir: &Path, date: NaiveDate) -> Result<PathBuf, SessionError> {
    if html.is_empty() {
        return Err(SessionError::NoReport);
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(date));
    fs::write(&path, html)?;
    tracing::info!(path = %path.display(), bytes = html.len(), "report exported");
    Ok(path)
}
