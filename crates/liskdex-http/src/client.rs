//! Resilient HTTP client with ordered fallback failover.
//!
//! Requests go to the preferred host first — the configured base URL, or
//! whichever fallback was last promoted. A retryable failure walks the
//! fallback hosts in order; the first success wins and that host becomes
//! the new preferred host. A non-retryable failure (status below 500,
//! e.g. 404) is surfaced immediately without contacting any fallback.

use std::sync::Mutex;

use serde_json::Value;

use liskdex_core::{HostSet, TransportError};

use crate::transport::{HttpTransport, ReqwestTransport};

enum Body<'a> {
    Get(&'a [(String, String)]),
    Post(&'a Value),
}

/// HTTP client for the indexing service.
///
/// Host bookkeeping is mutated only after a request fully resolves; call
/// sites are expected to serialize requests per client instance.
pub struct HttpClient<T: HttpTransport = ReqwestTransport> {
    hosts: Mutex<HostSet>,
    transport: T,
}

impl HttpClient<ReqwestTransport> {
    /// Create a client for the given host set with the default transport.
    pub fn new(hosts: HostSet) -> Self {
        Self::with_transport(hosts, ReqwestTransport::default())
    }
}

impl<T: HttpTransport> HttpClient<T> {
    /// Create a client with an injected transport.
    pub fn with_transport(hosts: HostSet, transport: T) -> Self {
        Self {
            hosts: Mutex::new(hosts),
            transport,
        }
    }

    /// The host the next request will be sent to first.
    pub fn preferred_host(&self) -> String {
        self.hosts.lock().unwrap().preferred().to_string()
    }

    /// The injected transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `path` with flat key-value query parameters.
    pub async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, TransportError> {
        self.request(path, Body::Get(params)).await
    }

    /// POST a JSON payload to `path`.
    pub async fn post(&self, path: &str, payload: &Value) -> Result<Value, TransportError> {
        self.request(path, Body::Post(payload)).await
    }

    async fn send(&self, host: &str, path: &str, body: &Body<'_>) -> Result<Value, TransportError> {
        let url = format!("{host}{path}");
        match body {
            Body::Get(query) => self.transport.get(&url, query).await,
            Body::Post(payload) => self.transport.post(&url, payload).await,
        }
    }

    /// Attempt the preferred host, then each fallback in order.
    ///
    /// Fallbacks are strictly sequential; the first success short-circuits
    /// and promotes the serving host. When every fallback also fails the
    /// original preferred-host error is propagated, since callers reason
    /// about the primary failure.
    async fn request(&self, path: &str, body: Body<'_>) -> Result<Value, TransportError> {
        let preferred = self.preferred_host();
        let original_err = match self.send(&preferred, path, &body).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => err,
            Err(err) => return Err(err),
        };

        let fallbacks = self.hosts.lock().unwrap().fallbacks().to_vec();
        if fallbacks.is_empty() {
            tracing::warn!(host = %preferred, "request failed and no fallback hosts are configured");
            return Err(original_err);
        }

        tracing::warn!(
            host = %preferred,
            error = %original_err,
            "request failed, trying fallbacks in given order"
        );
        for fallback in &fallbacks {
            match self.send(fallback, path, &body).await {
                Ok(value) => {
                    self.hosts.lock().unwrap().promote(fallback);
                    return Ok(value);
                }
                Err(err) => {
                    tracing::warn!(host = %fallback, error = %err, "fallback failed, trying next");
                }
            }
        }
        Err(original_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use async_trait::async_trait;

    enum Mock {
        Ok(Value),
        Status(u16),
        Refused,
    }

    struct MockTransport {
        hosts: HashMap<&'static str, Mock>,
        calls: Mutex<Vec<String>>,
    }

    impl MockTransport {
        fn new(hosts: Vec<(&'static str, Mock)>) -> Self {
            Self {
                hosts: hosts.into_iter().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn respond(&self, url: &str) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push(url.to_string());
            let (_, mock) = self
                .hosts
                .iter()
                .find(|(host, _)| url.starts_with(*host))
                .expect("request to unscripted host");
            match mock {
                Mock::Ok(value) => Ok(value.clone()),
                Mock::Status(code) => Err(TransportError::Status {
                    code: *code,
                    body: String::new(),
                }),
                Mock::Refused => Err(TransportError::Connection("connection refused".into())),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, url: &str, _query: &[(String, String)]) -> Result<Value, TransportError> {
            self.respond(url)
        }

        async fn post(&self, url: &str, _payload: &Value) -> Result<Value, TransportError> {
            self.respond(url)
        }
    }

    fn client(
        fallbacks: &[&str],
        mocks: Vec<(&'static str, Mock)>,
    ) -> HttpClient<MockTransport> {
        let hosts = HostSet::new(
            "https://a.example",
            fallbacks.iter().map(|s| s.to_string()).collect(),
        );
        HttpClient::with_transport(hosts, MockTransport::new(mocks))
    }

    #[tokio::test]
    async fn fallback_response_wins_and_host_is_promoted() {
        let client = client(
            &["https://b.example"],
            vec![
                ("https://a.example", Mock::Status(503)),
                ("https://b.example", Mock::Ok(serde_json::json!({"height": 100}))),
            ],
        );

        let value = client.get("/api/v2/blocks", &[]).await.unwrap();
        assert_eq!(value["height"], 100);
        assert_eq!(client.preferred_host(), "https://b.example");

        // The promoted host is tried first on the next call; the original
        // primary is not contacted again.
        let value = client.get("/api/v2/blocks", &[]).await.unwrap();
        assert_eq!(value["height"], 100);
        let calls = client.transport.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[2].starts_with("https://b.example"));
    }

    #[tokio::test]
    async fn not_found_fails_without_contacting_fallbacks() {
        let client = client(
            &["https://b.example"],
            vec![
                ("https://a.example", Mock::Status(404)),
                ("https://b.example", Mock::Ok(Value::Null)),
            ],
        );

        let err = client.get("/api/v2/accounts", &[]).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(client.transport.calls().len(), 1);
        assert_eq!(client.preferred_host(), "https://a.example");
    }

    #[tokio::test]
    async fn original_error_propagated_after_exhausted_fallbacks() {
        let client = client(
            &["https://b.example", "https://c.example"],
            vec![
                ("https://a.example", Mock::Status(503)),
                ("https://b.example", Mock::Refused),
                ("https://c.example", Mock::Refused),
            ],
        );

        let err = client.get("/api/v2/peers", &[]).await.unwrap_err();
        // The preferred host's error, not the last fallback's.
        assert!(matches!(err, TransportError::Status { code: 503, .. }));
        assert_eq!(client.transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn failure_without_fallbacks_fails_immediately() {
        let client = client(&[], vec![("https://a.example", Mock::Refused)]);

        let err = client.get("/api/v2/fees", &[]).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
        assert_eq!(client.transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn post_follows_the_same_failover_path() {
        let client = client(
            &["https://b.example"],
            vec![
                ("https://a.example", Mock::Status(500)),
                ("https://b.example", Mock::Ok(serde_json::json!({"transactionId": "t1"}))),
            ],
        );

        let value = client
            .post("/api/v2/transactions", &serde_json::json!({"transaction": "0a1b"}))
            .await
            .unwrap();
        assert_eq!(value["transactionId"], "t1");
        assert_eq!(client.preferred_host(), "https://b.example");
    }

    #[tokio::test]
    async fn active_host_bookkeeping_after_promotion() {
        let client = client(
            &["https://b.example", "https://c.example"],
            vec![
                ("https://a.example", Mock::Refused),
                ("https://b.example", Mock::Ok(Value::Null)),
                ("https://c.example", Mock::Ok(Value::Null)),
            ],
        );

        client.get("/api/v2/network/status", &[]).await.unwrap();

        let hosts = client.hosts.lock().unwrap();
        assert_eq!(hosts.preferred(), "https://b.example");
        assert_eq!(hosts.fallbacks(), &["https://c.example", "https://a.example"]);
    }
}
