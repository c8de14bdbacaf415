//! Shared HTTP response helpers.
//!
//! Centralizes the non-success → [`ClientError::Server`] mapping and body
//! decoding so the endpoint methods stay focused on request construction.

use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Check an HTTP response for a non-success status.
///
/// Returns the response unchanged on success; otherwise the status code and
/// body become a [`ClientError::Server`].
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ClientError::Server {
            status: status.as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Decode a successful response body as JSON.
///
/// Reads the body as text first so a decoding failure reports the serde
/// error instead of an opaque transport error.
pub async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use ars_core::responses::ResearchStarted;

    use super::*;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn check_response_success() {
        let resp = mock_response(200, "{}");
        assert!(check_response(resp).await.is_ok());
    }

    #[tokio::test]
    async fn check_response_created_is_success() {
        let resp = mock_response(201, "{}");
        assert!(check_response(resp).await.is_ok());
    }

    #[tokio::test]
    async fn check_response_not_found() {
        let resp = mock_response(404, r#"{"detail":"Research not found"}"#);
        let err = check_response(resp).await.unwrap_err();
        assert!(err.is_not_found());
        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("Research not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_response_server_error() {
        let resp = mock_response(500, "Internal Server Error");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 500, .. }));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn decode_json_maps_bad_body_to_parse_error() {
        let resp = mock_response(200, "<html>gateway</html>");
        let err = decode_json::<ResearchStarted>(resp).await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[tokio::test]
    async fn decode_json_reads_started_response() {
        let resp = mock_response(
            200,
            r#"{"research_id":"abc123","status":"started","message":"ok"}"#,
        );
        let started: ResearchStarted = decode_json(resp).await.unwrap();
        assert_eq!(started.research_id, "abc123");
        assert_eq!(started.status, "started");
    }
}
