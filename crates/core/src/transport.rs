use crate::image_gen_core::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    /// Overall request timeout (optional; if None, rely on connect timeout only)
    pub request_timeout: Option<Duration>,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// JSON-over-HTTP boundary used by providers. Implementations own their connection pool.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform a JSON POST request and return the parsed JSON body.
    ///
    /// Non-2xx responses are returned as `TransportError::HttpStatus` with the raw body so that
    /// providers can extract their own error shapes.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        cfg: &TransportConfig,
    ) -> Result<Value, TransportError>;

    /// Release pooled connections. Must be idempotent; a later request may reopen them.
    async fn close(&self) {}
}
