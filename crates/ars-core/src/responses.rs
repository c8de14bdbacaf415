//! Wire types exchanged with the research backend.
//!
//! `POST /research` takes a [`ResearchRequest`] and answers with a
//! [`ResearchStarted`]; `GET /research/{id}` answers with a full
//! [`ResearchState`](crate::entities::ResearchState).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Customization;

/// Body of `POST /research`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResearchRequest {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization: Option<Customization>,
}

impl ResearchRequest {
    #[must_use]
    pub fn new(topic: impl Into<String>, customization: Customization) -> Self {
        Self {
            topic: topic.into(),
            customization: Some(customization),
        }
    }
}

/// Response from `POST /research`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResearchStarted {
    pub research_id: String,
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{Depth, Tone};

    #[test]
    fn request_serializes_customization() {
        let req = ResearchRequest::new(
            "Market Analysis of EVs 2025",
            Customization::new(Depth::Deep, Tone::Professional),
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["topic"], "Market Analysis of EVs 2025");
        assert_eq!(json["customization"]["depth"], "deep");
        assert_eq!(json["customization"]["tone"], "professional");
    }

    #[test]
    fn request_omits_missing_customization() {
        let req = ResearchRequest {
            topic: "x".into(),
            customization: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"topic":"x"}"#);
    }
}
