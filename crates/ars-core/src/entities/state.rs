use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Customization, Finding, QualityReport, ResearchPlan};
use crate::enums::ResearchStatus;

/// Latest known snapshot of a backend research session.
///
/// Replaced wholesale on every successful poll; the newest snapshot is
/// authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ResearchState {
    pub topic: String,
    pub customization: Customization,
    pub research_plan: Option<ResearchPlan>,
    pub web_findings: Vec<Finding>,
    pub technical_findings: Vec<Finding>,
    pub business_findings: Vec<Finding>,
    /// Markdown body of the synthesized report.
    pub synthesized_content: Option<String>,
    /// Standalone HTML rendition of the report.
    pub html_output: Option<String>,
    pub quality_report: Option<QualityReport>,
    pub status: ResearchStatus,
    /// Human-readable progress lines, append-only across polls.
    pub progress_updates: Vec<String>,
    pub errors: Vec<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ResearchState {
    /// All findings in citation order: web, then technical, then business.
    #[must_use]
    pub fn citations(&self) -> Vec<Finding> {
        self.web_findings
            .iter()
            .chain(&self.technical_findings)
            .chain(&self.business_findings)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn citation_count(&self) -> usize {
        self.web_findings.len() + self.technical_findings.len() + self.business_findings.len()
    }

    #[must_use]
    pub fn has_html_report(&self) -> bool {
        self.html_output.as_deref().is_some_and(|html| !html.is_empty())
    }

    /// Whether this snapshot ends polling.
    ///
    /// A populated HTML report counts as completion regardless of `status`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal() || self.has_html_report()
    }

    /// The synthesized Markdown body, if non-empty.
    #[must_use]
    pub fn synthesized_text(&self) -> Option<&str> {
        self.synthesized_content
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    #[must_use]
    pub fn latest_progress(&self) -> Option<&str> {
        self.progress_updates.last().map(String::as_str)
    }
}
