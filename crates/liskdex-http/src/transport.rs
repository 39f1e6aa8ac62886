//! The HTTP transport seam — one request against one fully resolved URL.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use liskdex_core::TransportError;

/// Issues a single GET/POST and decodes the JSON body.
///
/// The resilient client drives this once per host; implementations
/// perform no failover or retries of their own.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Value, TransportError>;

    async fn post(&self, url: &str, payload: &Value) -> Result<Value, TransportError>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestTransport {
    http: reqwest::Client,
    request_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("failed to build reqwest client");
        Self { http, request_timeout }
    }

    fn map_send_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            TransportError::Connection(err.to_string())
        }
    }

    async fn decode(&self, resp: reqwest::Response) -> Result<Value, TransportError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;
        if !status.is_success() {
            return Err(TransportError::Status {
                code: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Value, TransportError> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        self.decode(resp).await
    }

    async fn post(&self, url: &str, payload: &Value) -> Result<Value, TransportError> {
        let resp = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        self.decode(resp).await
    }
}
