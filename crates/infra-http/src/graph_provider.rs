//! Reqwest-backed Graph API metrics provider.
//!
//! Owns transport details only: video id extraction, the insights request,
//! timeout and status mapping. Payload decoding lives in `payload`.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use contest_core::port::{MetricsError, MetricsProvider, VideoMetrics};
use regex::Regex;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::payload::{error_message, parse_metrics};

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v24.0";

/// First run of at least 8 digits in a content URL
pub fn extract_video_id(content_url: &str) -> Option<&str> {
    static VIDEO_ID: OnceLock<Option<Regex>> = OnceLock::new();
    VIDEO_ID
        .get_or_init(|| Regex::new(r"(\d{8,})").ok())
        .as_ref()?
        .find(content_url)
        .map(|m| m.as_str())
}

/// Metrics provider reading `video_insights` of a video
pub struct GraphMetricsProvider {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl GraphMetricsProvider {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn map_transport_error(&self, error: reqwest::Error) -> MetricsError {
        if error.is_timeout() {
            MetricsError::Timeout(self.timeout.as_millis() as u64)
        } else {
            MetricsError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl MetricsProvider for GraphMetricsProvider {
    async fn fetch(
        &self,
        content_url: &str,
        credential: Option<&str>,
    ) -> Result<VideoMetrics, MetricsError> {
        let video_id = extract_video_id(content_url)
            .ok_or_else(|| MetricsError::InvalidUrl(content_url.to_string()))?;
        let access_token = credential.ok_or(MetricsError::MissingCredential)?;

        debug!(video_id, "Fetching video insights");
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, video_id))
            .query(&[("fields", "video_insights"), ("access_token", access_token)])
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_metrics(body.as_ref()).map_err(MetricsError::Decode)
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MetricsError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    });
    MetricsError::Upstream {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.facebook.com/reel/1234567890123456"),
            Some("1234567890123456")
        );
        assert_eq!(
            extract_video_id("https://fb.watch/v/12345678/?ref=share"),
            Some("12345678")
        );
        assert_eq!(extract_video_id("https://fb.watch/v/1234567"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_status_mapping() {
        let body = br#"{"error": {"message": "Invalid OAuth access token."}}"#;
        let error = map_status_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            error,
            MetricsError::Upstream {
                status: 400,
                message: "Invalid OAuth access token.".to_string()
            }
        );
        assert!(!error.is_transient());

        let error = map_status_error(StatusCode::SERVICE_UNAVAILABLE, b"");
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_any_request() {
        let provider = GraphMetricsProvider::new(DEFAULT_BASE_URL, Duration::from_secs(1)).unwrap();
        let result = provider.fetch("https://example.com/video/abc", Some("token")).await;
        assert!(matches!(result, Err(MetricsError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_request() {
        let provider = GraphMetricsProvider::new(DEFAULT_BASE_URL, Duration::from_secs(1)).unwrap();
        let result = provider
            .fetch("https://www.facebook.com/reel/1234567890123456", None)
            .await;
        assert_eq!(result, Err(MetricsError::MissingCredential));
    }
}
