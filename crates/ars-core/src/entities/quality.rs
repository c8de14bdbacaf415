use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Reviewer assessment of the synthesized report.
///
/// The backend may send either `{ "score": 8, "critique": "..." }` or the
/// reviewer's free-text answer. Free text is scanned for `Score:` and
/// `Critique:` lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct QualityReport {
    pub score: f64,
    pub critique: String,
}

impl<'de> Deserialize<'de> for QualityReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        QualityReportWire::deserialize(deserializer).map(Self::from)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QualityReportWire {
    Structured {
        #[serde(default)]
        score: f64,
        #[serde(default)]
        critique: String,
    },
    Text(String),
}

impl From<QualityReportWire> for QualityReport {
    fn from(wire: QualityReportWire) -> Self {
        match wire {
            QualityReportWire::Structured { score, critique } => Self { score, critique },
            QualityReportWire::Text(text) => Self::parse_text(&text),
        }
    }
}

impl QualityReport {
    /// Extract a score and critique from a free-text review.
    #[must_use]
    pub fn parse_text(text: &str) -> Self {
        let mut score = None;
        let mut critique = None;

        for line in text.lines() {
            let lower = line.to_ascii_lowercase();
            if score.is_none() && lower.contains("score") {
                score = leading_number(after_label(line, "score"));
            } else if critique.is_none() && lower.contains("critique") {
                let rest = after_label(line, "critique").trim();
                if !rest.is_empty() {
                    critique = Some(rest.to_string());
                }
            }
        }

        Self {
            score: score.unwrap_or(0.0),
            critique: critique.unwrap_or_else(|| text.trim().to_string()),
        }
    }
}

/// Text following `label` and its `:` separator, with markdown emphasis removed.
fn after_label<'a>(line: &'a str, label: &str) -> &'a str {
    let lower = line.to_ascii_lowercase();
    let Some(start) = lower.find(label) else {
        return "";
    };
    let rest = &line[start + label.len()..];
    let rest = rest.find(':').map_or(rest, |idx| &rest[idx + 1..]);
    rest.trim_start_matches(['*', '_', ' '])
}

/// Parse the first number in `text`, ignoring a trailing `/10`.
fn leading_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.trim_end_matches('.').parse().ok()
}
