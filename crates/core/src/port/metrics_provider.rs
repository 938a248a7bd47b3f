// Metrics Provider Port
// Abstraction over the social-media API that reports likes/views per video

use async_trait::async_trait;
use thiserror::Error;

/// Like/view counts reported for one piece of content.
///
/// A `None` field means the provider answered but the value was not a
/// non-negative integer; the stored value must be left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoMetrics {
    pub likes: Option<i64>,
    pub views: Option<i64>,
}

impl VideoMetrics {
    pub fn new(likes: i64, views: i64) -> Self {
        Self {
            likes: Some(likes),
            views: Some(views),
        }
    }

    /// Both counts usable
    pub fn is_complete(&self) -> bool {
        self.likes.is_some() && self.views.is_some()
    }

    /// No usable count at all
    pub fn is_empty(&self) -> bool {
        self.likes.is_none() && self.views.is_none()
    }
}

/// Metrics provider errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("Invalid content URL (no video id): {0}")]
    InvalidUrl(String),

    #[error("No access credential configured")]
    MissingCredential,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Upstream returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid response payload: {0}")]
    Decode(String),
}

impl MetricsError {
    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            MetricsError::Transport(_) | MetricsError::Timeout(_) => true,
            MetricsError::Upstream { status, .. } => *status == 429 || *status >= 500,
            MetricsError::InvalidUrl(_)
            | MetricsError::MissingCredential
            | MetricsError::Decode(_) => false,
        }
    }
}

/// Metrics Provider trait
///
/// Implementations:
/// - GraphMetricsProvider (infra-http): Graph API video insights
/// - RetryingMetricsProvider: bounded retry decorator
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Fetch current counts for `content_url`
    ///
    /// # Errors
    /// - MetricsError::InvalidUrl if no video id can be extracted
    /// - MetricsError::MissingCredential if `credential` is `None`
    /// - MetricsError::Transport / Timeout / Upstream / Decode on call failure
    async fn fetch(
        &self,
        content_url: &str,
        credential: Option<&str>,
    ) -> Result<VideoMetrics, MetricsError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    type Scripted = Result<VideoMetrics, MetricsError>;

    /// Provider answering from per-URL scripts.
    ///
    /// Each URL replays its queued responses in order; the last one repeats.
    /// Unknown URLs get the fallback response.
    pub struct ScriptedMetricsProvider {
        scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
        fallback: Scripted,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl Default for ScriptedMetricsProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ScriptedMetricsProvider {
        pub fn new() -> Self {
            Self::with_fallback(Err(MetricsError::Transport(
                "no scripted response".to_string(),
            )))
        }

        pub fn with_fallback(fallback: Scripted) -> Self {
            Self {
                scripts: Mutex::new(HashMap::new()),
                fallback,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn respond(self, url: impl Into<String>, response: Scripted) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .entry(url.into())
                .or_default()
                .push_back(response);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls_for(&self, url: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(called, _)| called == url)
                .count()
        }

        pub fn credentials_seen(&self) -> Vec<Option<String>> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, credential)| credential.clone())
                .collect()
        }
    }

    #[async_trait]
    impl MetricsProvider for ScriptedMetricsProvider {
        async fn fetch(
            &self,
            content_url: &str,
            credential: Option<&str>,
        ) -> Result<VideoMetrics, MetricsError> {
            self.calls
                .lock()
                .unwrap()
                .push((content_url.to_string(), credential.map(str::to_string)));

            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(content_url) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(|| self.fallback.clone()),
                Some(queue) => queue.front().cloned().unwrap_or_else(|| self.fallback.clone()),
                None => self.fallback.clone(),
            }
        }
    }
}
