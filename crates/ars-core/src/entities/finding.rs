use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Label shown for a citation with neither a parseable URL nor a source name.
const UNKNOWN_SOURCE: &str = "Unknown Source";

/// A single piece of evidence gathered by one of the backend's researchers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Finding {
    /// Human-readable source label.
    pub source: String,
    pub url: Option<String>,
    /// Excerpt selected by the researcher.
    pub content: String,
    pub raw_content: String,
    /// The research question this finding answers.
    pub question: String,
}

impl Finding {
    /// Host to display for this citation.
    ///
    /// Uses the URL host without a leading `www.`; falls back to the source
    /// label, then to a generic placeholder.
    #[must_use]
    pub fn domain(&self) -> String {
        let host = self
            .url
            .as_deref()
            .and_then(|raw| url::Url::parse(raw).ok())
            .and_then(|parsed| parsed.host_str().map(str::to_string));

        match host {
            Some(host) => host.strip_prefix("www.").unwrap_or(&host).to_string(),
            None if !self.source.trim().is_empty() => self.source.clone(),
            None => UNKNOWN_SOURCE.to_string(),
        }
    }

    /// Short preview text: the curated excerpt, else the start of the raw content.
    #[must_use]
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.content.trim().is_empty() {
            self.raw_content.chars().take(max_chars).collect()
        } else {
            self.content.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn finding(source: &str, url: Option<&str>) -> Finding {
        Finding {
            source: source.into(),
            url: url.map(Into::into),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(finding("Tavily", Some("https://www.reuters.com/markets/ev")), "reuters.com")]
    #[case(finding("Tavily", Some("https://docs.rs/tokio")), "docs.rs")]
    #[case(finding("Company filing", Some("not a url")), "Company filing")]
    #[case(finding("Company filing", None), "Company filing")]
    #[case(finding("", None), "Unknown Source")]
    fn domain_resolution(#[case] input: Finding, #[case] expected: &str) {
        assert_eq!(input.domain(), expected);
    }

    #[test]
    fn excerpt_prefers_curated_content() {
        let f = Finding {
            content: "EV sales grew 35%".into(),
            raw_content: "x".repeat(500),
            ..Default::default()
        };
        assert_eq!(f.excerpt(150), "EV sales grew 35%");
    }

    #[test]
    fn excerpt_truncates_raw_content() {
        let f = Finding {
            raw_content: "é".repeat(300),
            ..Default::default()
        };
        assert_eq!(f.excerpt(150).chars().count(), 150);
    }

    #[test]
    fn missing_fields_default() {
        let f: Finding = serde_json::from_str(r#"{"source": "web"}"#).unwrap();
        assert_eq!(f.source, "web");
        assert!(f.url.is_none());
        assert!(f.raw_content.is_empty());
    }
}
