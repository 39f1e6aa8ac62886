//! The WebSocket dial seam.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use liskdex_core::TransportError;

/// A live transport link: text frames in both directions.
///
/// The pump task behind the link owns the socket. It stops — closing the
/// socket — when the outbound sender is dropped, and `inbound` yielding
/// `None` means the transport is gone.
pub struct WsLink {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<String>,
}

/// Dials one host and hands back a live link.
///
/// The resilient client drives this once per host per round;
/// implementations perform no retries of their own.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, host: &str) -> Result<WsLink, TransportError>;
}

/// Production connector — dials `<host>/ws` via tokio-tungstenite.
#[derive(Debug, Default)]
pub struct NodeConnector;

#[async_trait]
impl Connector for NodeConnector {
    async fn connect(&self, host: &str) -> Result<WsLink, TransportError> {
        let url = format!("{host}/ws");
        tracing::info!(url = %url, "connecting via WebSocket");
        let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))?;
        let (mut sink, mut stream) = ws_stream.split();

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    msg = out_rx.recv() => match msg {
                        Some(text) => {
                            if sink.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        // Channel handle dropped — close the socket.
                        None => {
                            let _ = sink.close().await;
                            break;
                        }
                    },
                    msg = stream.next() => match msg {
                        Some(Ok(Message::Text(text))) => {
                            if in_tx.send(text).is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "WS receive error");
                            break;
                        }
                        // Ping/pong is answered by tungstenite itself.
                        Some(Ok(_)) => {}
                    },
                }
            }
        });

        Ok(WsLink {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}
