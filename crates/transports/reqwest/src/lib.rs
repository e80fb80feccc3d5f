use crate::image_gen_core::error::{build_http_status_transport_error, TransportError};
use crate::image_gen_core::transport::{HttpTransport, TransportConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::error::Error as StdError;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// `HttpTransport` backed by a single pooled `reqwest::Client`.
///
/// The client is created on first use and reused by every later request. `close` drops it;
/// the next request builds a fresh one.
pub struct ReqwestTransport {
    cfg: TransportConfig,
    user_agent: String,
    client: Mutex<Option<Client>>,
}

impl ReqwestTransport {
    fn configure_builder(
        builder: reqwest::ClientBuilder,
        cfg: &TransportConfig,
        user_agent: &str,
    ) -> reqwest::ClientBuilder {
        builder
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(user_agent)
            .connect_timeout(cfg.connect_timeout)
    }

    fn build_client(&self) -> Result<Client, TransportError> {
        Self::configure_builder(Client::builder(), &self.cfg, &self.user_agent)
            .build()
            .map_err(|err| {
                TransportError::Other(format!(
                    "reqwest client build failed: {}",
                    format_reqwest_error_chain(&err)
                ))
            })
    }

    pub fn new(cfg: &TransportConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            user_agent: default_user_agent(),
            client: Mutex::new(None),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Whether a client is currently held.
    pub fn is_open(&self) -> bool {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn client(&self) -> Result<Client, TransportError> {
        let mut slot = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = self.build_client()?;
        debug!(target: "image_gen::transport::reqwest", "created http client");
        *slot = Some(client.clone());
        Ok(client)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        cfg: &TransportConfig,
    ) -> Result<Value, TransportError> {
        let client = self.client()?;
        let mut req = client.post(url).json(body);
        for (k, v) in headers {
            // .json() already sets it
            if !k.eq_ignore_ascii_case("content-type") {
                req = req.header(k, v);
            }
        }
        if let Some(timeout) = cfg.request_timeout {
            req = req.timeout(timeout);
        }
        let timeout_hint = cfg.request_timeout.unwrap_or(cfg.connect_timeout);

        let start_instant = Instant::now();
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                let detail = format_reqwest_error_chain(&e);
                debug!(
                    target: "image_gen::transport::reqwest",
                    %detail,
                    elapsed_ms = start_instant.elapsed().as_millis() as u64,
                    "reqwest send failed"
                );
                return Err(map_send_error(&e, detail, timeout_hint));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let retry_after_ms = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .and_then(parse_retry_after_ms);
            // The deadline also covers the error body.
            let body_text = match resp.text().await {
                Ok(text) => text,
                Err(e) if e.is_timeout() => return Err(TransportError::Timeout(timeout_hint)),
                Err(_) => String::new(),
            };
            let err =
                build_http_status_transport_error(status.as_u16(), body_text, retry_after_ms);
            debug!(
                target: "image_gen::transport::reqwest",
                status = status.as_u16(),
                elapsed_ms = start_instant.elapsed().as_millis() as u64,
                error = %err,
                "upstream returned error status"
            );
            return Err(err);
        }

        let text = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout_hint)
            } else {
                TransportError::BodyRead(e.to_string())
            }
        })?;
        let json: Value = serde_json::from_str(&text)
            .map_err(|_| TransportError::BodyRead("invalid json".into()))?;
        debug!(
            target: "image_gen::transport::reqwest",
            status = status.as_u16(),
            response_size = text.len(),
            elapsed_ms = start_instant.elapsed().as_millis() as u64,
            "request completed"
        );
        Ok(json)
    }

    async fn close(&self) {
        let released = self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            debug!(target: "image_gen::transport::reqwest", "released http client");
        }
    }
}

fn default_user_agent() -> String {
    format!("image-gen-mcp/{}", env!("CARGO_PKG_VERSION"))
}

fn map_send_error(err: &reqwest::Error, detail: String, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else if err.is_connect() {
        TransportError::Network(format!("connect: {detail}"))
    } else {
        TransportError::Network(detail)
    }
}

fn parse_retry_after_ms(s: &str) -> Option<u64> {
    // RFC 7231: either delta-seconds or HTTP date; support simple delta only
    s.trim()
        .parse::<u64>()
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
}

fn format_reqwest_error_chain(err: &reqwest::Error) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(src) = current {
        out.push_str(": ");
        out.push_str(&src.to_string());
        current = src.source();
    }
    out
}
