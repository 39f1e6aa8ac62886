//! Transport-level error types.

use thiserror::Error;

use crate::request::RpcError;

/// Errors that can occur while talking to the indexing service or the node.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Non-2xx HTTP response from the service.
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// Connection-level failure (refused, reset, DNS).
    #[error("connection error: {0}")]
    Connection(String),

    /// Request timed out after the configured duration.
    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// WebSocket handshake/send/receive error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(RpcError),

    /// The channel this request was issued on is no longer alive.
    #[error("channel closed")]
    ChannelClosed,

    /// Response could not be deserialized.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Returns `true` if failing over to another host can help.
    ///
    /// A response with a status below 500 (404 included) means the host
    /// understood the request and answered; trying a fallback would only
    /// repeat the same answer.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { code, .. } => *code >= 500,
            Self::Connection(_) | Self::Timeout { .. } | Self::WebSocket(_) => true,
            Self::Rpc(_) | Self::ChannelClosed | Self::Deserialization(_) => false,
        }
    }

    /// Returns `true` for a 404 response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { code: 404, .. })
    }
}
