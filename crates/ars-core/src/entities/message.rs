use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Finding, ResearchState};
use crate::enums::MessageRole;

/// One entry in the visible chat thread.
///
/// Assistant messages additionally carry the research session they track,
/// the latest snapshot for it, and the citations derived from that snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_thinking: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_state: Option<ResearchState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Finding>,
}

impl ChatMessage {
    /// A message typed by the user.
    #[must_use]
    pub fn user(id: String, content: impl Into<String>) -> Self {
        Self {
            id,
            role: MessageRole::User,
            content: content.into(),
            created_at: Utc::now(),
            is_thinking: false,
            research_id: None,
            research_state: None,
            sources: Vec::new(),
        }
    }

    /// An empty assistant message shown while research is outstanding.
    #[must_use]
    pub fn assistant_placeholder(id: String) -> Self {
        Self {
            id,
            role: MessageRole::Assistant,
            content: String::new(),
            created_at: Utc::now(),
            is_thinking: true,
            research_id: None,
            research_state: None,
            sources: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_assistant(&self) -> bool {
        matches!(self.role, MessageRole::Assistant)
    }

    /// HTML report of the attached snapshot, if one is present.
    #[must_use]
    pub fn html_report(&self) -> Option<&str> {
        self.research_state
            .as_ref()
            .filter(|state| state.has_html_report())
            .and_then(|state| state.html_output.as_deref())
    }
}
