use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Research plan produced by the backend's planning stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ResearchPlan {
    pub topic: String,
    pub subtopics: Vec<String>,
    pub queries: Vec<String>,
}
