//! # ars-client
//!
//! HTTP transport for the research backend.
//!
//! Two operations, each exactly one round trip with no retries, caching, or
//! deduplication:
//! - `POST {root}/research` starts a session
//! - `GET {root}/research/{id}` fetches the full current snapshot
//!
//! `{root}` is the configured base URL joined with the API prefix (`/api`
//! when going through the reverse proxy).

mod error;
mod http;

pub use error::ClientError;

use ars_config::BackendConfig;
use ars_core::entities::ResearchState;
use ars_core::responses::{ResearchRequest, ResearchStarted};
use async_trait::async_trait;

use crate::http::{check_response, decode_json};

// ── Transport seam ─────────────────────────────────────────────────

/// The two backend operations the session controller depends on.
///
/// Implemented by [`ResearchClient`] over HTTP; tests substitute scripted
/// transports.
#[async_trait]
pub trait ResearchTransport: Send + Sync {
    /// Start a research session for `request.topic`.
    async fn submit_research(&self, request: &ResearchRequest)
    -> Result<ResearchStarted, ClientError>;

    /// Fetch the full current snapshot for `research_id`.
    async fn fetch_research_state(&self, research_id: &str) -> Result<ResearchState, ClientError>;
}

// ── Client ─────────────────────────────────────────────────────────

/// reqwest-backed [`ResearchTransport`].
#[derive(Debug, Clone)]
pub struct ResearchClient {
    http: reqwest::Client,
    root: String,
}

impl ResearchClient {
    /// Build a client from backend settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the base URL is not a valid
    /// absolute URL, or [`ClientError::Network`] if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        config
            .validate()
            .map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            root: config.endpoint_root(),
        })
    }

    /// Endpoint root every path is appended to.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    fn research_url(&self) -> String {
        format!("{}/research", self.root)
    }

    fn research_state_url(&self, research_id: &str) -> String {
        format!("{}/research/{}", self.root, urlencoding::encode(research_id))
    }
}

#[async_trait]
impl ResearchTransport for ResearchClient {
    async fn submit_research(
        &self,
        request: &ResearchRequest,
    ) -> Result<ResearchStarted, ClientError> {
        let url = self.research_url();
        tracing::debug!(%url, topic = %request.topic, "submitting research");

        let resp = check_response(self.http.post(&url).json(request).send().await?).await?;
        let started: ResearchStarted = decode_json(resp).await?;

        tracing::info!(research_id = %started.research_id, status = %started.status, "research submitted");
        Ok(started)
    }

    async fn fetch_research_state(&self, research_id: &str) -> Result<ResearchState, ClientError> {
        let url = self.research_state_url(research_id);
        tracing::debug!(%url, "fetching research state");

        let resp = check_response(self.http.get(&url).send().await?).await?;
        decode_json(resp).await
    }
}
