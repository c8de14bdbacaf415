use std::path::Path;

use ars_client::ResearchTransport;
use ars_core::entities::{ChatMessage, Finding, ResearchState};
use ars_core::enums::ResearchStatus;
use ars_session::progress::progress_percentage;
use ars_session::{ActiveSession, SessionController, SessionPhase};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::output::{output, table, table_options};
use crate::progress::Progress;

/// Starter topics offered by `/prompts` in chat.
pub const QUICK_PROMPTS: [&str; 3] = [
    "Latest AI Developments this week",
    "Market Analysis of EVs 2025",
    "Impact of Quantum Computing on Finance",
];

/// Characters of raw content shown when a finding has no curated excerpt.
const EXCERPT_CHARS: usize = 150;

#[derive(Debug, Clone, Serialize)]
pub struct SourceRow {
    pub index: usize,
    pub domain: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SourceRow {
    pub fn from_findings(findings: &[Finding]) -> Vec<Self> {
        findings
            .iter()
            .enumerate()
            .map(|(i, finding)| Self {
                index: i + 1,
                domain: finding.domain(),
                excerpt: finding.excerpt(EXCERPT_CHARS),
                url: finding.url.clone(),
            })
            .collect()
    }
}

/// What `research`, `status` and chat print for a session.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchSummary {
    pub research_id: Option<String>,
    pub phase: Option<String>,
    pub status: Option<ResearchStatus>,
    pub topic: Option<String>,
    pub progress: u8,
    pub content: String,
    pub quality_score: Option<f64>,
    pub critique: Option<String>,
    pub sources: Vec<SourceRow>,
    pub errors: Vec<String>,
    pub has_report: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
}

impl ResearchSummary {
    /// Summary of an assistant message tracked by the controller.
    pub fn from_message(message: &ChatMessage, phase: SessionPhase) -> Self {
        let state = message.research_state.as_ref();
        let mut summary = Self::base(state, phase.is_resolved());
        summary.research_id.clone_from(&message.research_id);
        summary.phase = Some(phase.to_string());
        summary.content.clone_from(&message.content);
        summary.sources = SourceRow::from_findings(&message.sources);
        summary
    }

    /// Summary of a snapshot fetched directly from the backend.
    pub fn from_state(research_id: &str, state: &ResearchState) -> Self {
        let mut summary = Self::base(Some(state), state.is_finished());
        summary.research_id = Some(research_id.to_string());
        summary.content = state.synthesized_text().unwrap_or_default().to_string();
        summary.sources = SourceRow::from_findings(&state.citations());
        summary
    }

    fn base(state: Option<&ResearchState>, terminal: bool) -> Self {
        let log_count = state.map_or(0, |s| s.progress_updates.len());
        Self {
            research_id: None,
            phase: None,
            status: state.map(|s| s.status),
            topic: state.map(|s| s.topic.clone()).filter(|t| !t.is_empty()),
            progress: progress_percentage(log_count, terminal),
            content: String::new(),
            quality_score: state.and_then(|s| s.quality_report.as_ref()).map(|q| q.score),
            critique: state
                .and_then(|s| s.quality_report.as_ref())
                .map(|q| q.critique.clone())
                .filter(|c| !c.is_empty()),
            sources: Vec::new(),
            errors: state.map(|s| s.errors.clone()).unwrap_or_default(),
            has_report: state.is_some_and(ResearchState::has_html_report),
            report_path: None,
        }
    }

    pub fn with_report_path(mut self, path: &Path) -> Self {
        self.report_path = Some(path.display().to_string());
        self
    }
}

/// Print a summary: structured output for json/raw, readable text for table.
pub fn print_summary(summary: &ResearchSummary, format: OutputFormat) -> anyhow::Result<()> {
    if format != OutputFormat::Table {
        return output(summary, format);
    }

    let mut status_parts = Vec::new();
    if let Some(id) = &summary.research_id {
        status_parts.push(format!("research {id}"));
    }
    if let Some(phase) = &summary.phase {
        status_parts.push(phase.clone());
    } else if let Some(status) = summary.status {
        status_parts.push(status.to_string());
    }
    status_parts.push(format!("{}%", summary.progress));
    println!("[{}]", status_parts.join(" · "));

    if !summary.content.is_empty() {
        println!("\n{}", summary.content.trim_end());
    }

    if !summary.sources.is_empty() {
        println!("\nSources ({})", summary.sources.len());
        println!("{}", render_sources(&summary.sources));
    }

    if let Some(score) = summary.quality_score {
        match &summary.critique {
            Some(critique) => println!("\nQuality: {score:.1}/10 - {critique}"),
            None => println!("\nQuality: {score:.1}/10"),
        }
    }

    for error in &summary.errors {
        println!("error: {error}");
    }

    if let Some(path) = &summary.report_path {
        println!("\nReport saved to {path}");
    } else if summary.has_report {
        println!("\nHTML report available (use `ars export` or /download).");
    }
    Ok(())
}

pub fn render_sources(sources: &[SourceRow]) -> String {
    let rows = sources
        .iter()
        .map(|s| vec![s.index.to_string(), s.domain.clone(), s.excerpt.clone()])
        .collect::<Vec<_>>();
    table::render_table(&["#", "domain", "excerpt"], &rows, table_options())
}

/// Redraw `progress` on every store change until `session` leaves polling.
pub async fn follow<T: ResearchTransport + 'static>(
    controller: &SessionController<T>,
    session: &ActiveSession<T>,
    progress: &Progress,
) -> SessionPhase {
    let mut revisions = controller.subscribe();
    loop {
        if let Some(view) = controller.thinking_view(&session.message_id).await {
            progress.show(&view);
        }
        if session.is_finished() || revisions.changed().await.is_err() {
            return session.wait().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use ars_core::entities::QualityReport;
    use pretty_assertions::assert_eq;

    use super::*;

    fn finding(url: &str, content: &str, raw: &str) -> Finding {
        Finding {
            source: "web".into(),
            url: Some(url.into()),
            content: content.into(),
            raw_content: raw.into(),
            question: String::new(),
        }
    }

    #[test]
    fn source_rows_are_numbered_from_one() {
        let rows = SourceRow::from_findings(&[
            finding("https://www.iea.org/ev", "EV sales grew", ""),
            finding("https://arxiv.org/abs/1", "", &"x".repeat(400)),
        ]);

        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].domain, "iea.org");
        assert_eq!(rows[0].excerpt, "EV sales grew");
        assert_eq!(rows[1].index, 2);
        assert_eq!(rows[1].excerpt.chars().count(), 150);
    }

    #[test]
    fn summary_from_finished_state() {
        let state = ResearchState {
            topic: "Market Analysis of EVs 2025".into(),
            status: ResearchStatus::Complete,
            synthesized_content: Some("# Report".into()),
            html_output: Some("<html></html>".into()),
            quality_report: Some(QualityReport {
                score: 8.0,
                critique: "Thorough.".into(),
            }),
            web_findings: vec![finding("https://iea.org", "c", "")],
            progress_updates: vec!["Research started".into()],
            ..Default::default()
        };

        let summary = ResearchSummary::from_state("abc123", &state);
        assert_eq!(summary.research_id.as_deref(), Some("abc123"));
        assert_eq!(summary.progress, 100);
        assert_eq!(summary.content, "# Report");
        assert_eq!(summary.quality_score, Some(8.0));
        assert_eq!(summary.critique.as_deref(), Some("Thorough."));
        assert_eq!(summary.sources.len(), 1);
        assert!(summary.has_report);
    }

    #[test]
    fn summary_from_running_state_caps_progress() {
        let state = ResearchState {
            status: ResearchStatus::InProgress,
            progress_updates: vec![String::new(); 40],
            ..Default::default()
        };
        let summary = ResearchSummary::from_state("abc123", &state);
        assert_eq!(summary.progress, 99);
        assert!(summary.content.is_empty());
        assert!(summary.topic.is_none());
    }

    #[test]
    fn summary_from_placeholder_message() {
        let message = ChatMessage::assistant_placeholder("msg-00000001".into());
        let summary = ResearchSummary::from_message(&message, SessionPhase::Submitting);
        assert_eq!(summary.phase.as_deref(), Some("submitting"));
        assert_eq!(summary.progress, 0);
        assert!(summary.status.is_none());
        assert!(!summary.has_report);
    }

    #[test]
    fn abandoned_summary_keeps_partial_progress() {
        let mut message = ChatMessage::assistant_placeholder("msg-00000001".into());
        message.research_state = Some(ResearchState {
            status: ResearchStatus::InProgress,
            progress_updates: vec![String::new(); 3],
            ..Default::default()
        });

        let summary = ResearchSummary::from_message(&message, SessionPhase::Abandoned);
        assert_eq!(summary.phase.as_deref(), Some("abandoned"));
        assert_eq!(summary.progress, 15);
    }
}
