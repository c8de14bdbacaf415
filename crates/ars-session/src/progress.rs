//! Progress indicators derived from a session's snapshot.
//!
//! Nothing here is authoritative: the percentage is a function of how many
//! progress lines the backend has emitted, and the phase is a keyword
//! heuristic over the newest line.

use ars_core::entities::ResearchState;

/// Progress line shown before the backend has reported anything.
pub const DEFAULT_STATUS_LINE: &str = "Initializing agent swarm...";

const PERCENT_PER_LINE: usize = 5;
const PRE_TERMINAL_CAP: usize = 99;

/// Displayed percentage: `min(5 × lines, 99)` while polling, `100` once terminal.
#[must_use]
pub fn progress_percentage(log_count: usize, terminal: bool) -> u8 {
    if terminal {
        return 100;
    }
    let pct = log_count
        .saturating_mul(PERCENT_PER_LINE)
        .min(PRE_TERMINAL_CAP);
    u8::try_from(pct).unwrap_or(99)
}

/// Fill of the visual bar: `min(5 × lines, 100)`.
#[must_use]
pub fn bar_fill(log_count: usize) -> u8 {
    let fill = log_count.saturating_mul(PERCENT_PER_LINE).min(100);
    u8::try_from(fill).unwrap_or(100)
}

/// Qualitative phase guessed from the latest progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResearchPhase {
    Researching,
    Analyzing,
    Synthesizing,
}

impl ResearchPhase {
    /// Classify a progress line. Checked in order: synthesizing, then
    /// analyzing, then the researching fallback.
    #[must_use]
    pub fn classify(line: &str) -> Self {
        let line = line.to_lowercase();
        if line.contains("synthesizing") || line.contains("report") {
            Self::Synthesizing
        } else if line.contains("analyzing") || line.contains("technical") {
            Self::Analyzing
        } else {
            Self::Researching
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Researching => "Deep Research Active",
            Self::Analyzing => "Analyzing Data Patterns",
            Self::Synthesizing => "Synthesizing Intelligence",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Researching => "researching",
            Self::Analyzing => "analyzing",
            Self::Synthesizing => "synthesizing",
        }
    }
}

/// Everything a "thinking" indicator needs to render one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkingView {
    pub phase: ResearchPhase,
    pub percentage: u8,
    pub bar_fill: u8,
    pub status_line: String,
    pub log: Vec<String>,
}

impl ThinkingView {
    /// Derive the view for a session's latest snapshot (if any has arrived).
    #[must_use]
    pub fn derive(state: Option<&ResearchState>, terminal: bool) -> Self {
        let log = state
            .map(|s| s.progress_updates.clone())
            .unwrap_or_default();
        let status_line = state
            .and_then(ResearchState::latest_progress)
            .unwrap_or(DEFAULT_STATUS_LINE)
            .to_owned();

        Self {
            phase: ResearchPhase::classify(&status_line),
            percentage: progress_percentage(log.len(), terminal),
            bar_fill: bar_fill(log.len()),
            status_line,
            log,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.phase.label()
    }
}
