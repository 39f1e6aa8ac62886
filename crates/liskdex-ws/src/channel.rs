//! The live RPC channel: request/response correlation and notification
//! dispatch over one established WebSocket connection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};

use liskdex_core::{RpcId, RpcRequest, RpcResponse, TransportError};

use crate::connector::WsLink;
use crate::subscriptions::SubscriptionRouter;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<RpcResponse, TransportError>>>>>;

enum Command {
    Invoke {
        req: RpcRequest,
        tx: oneshot::Sender<Result<RpcResponse, TransportError>>,
    },
    Disconnect,
}

/// Handle to one established connection.
///
/// Exclusively owned by the WS client and replaced wholesale on
/// reconnect — subscriptions registered here do not carry over to the
/// replacement channel.
pub struct RpcChannel {
    host: String,
    cmd_tx: mpsc::UnboundedSender<Command>,
    router: SubscriptionRouter,
    alive: Arc<AtomicBool>,
    closed_rx: watch::Receiver<bool>,
    next_id: AtomicU64,
}

impl RpcChannel {
    /// Wrap a freshly dialed link and start the channel task.
    pub(crate) fn start(host: String, link: WsLink) -> Arc<Self> {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = watch::channel(false);
        let alive = Arc::new(AtomicBool::new(true));
        let router = SubscriptionRouter::new();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        tokio::spawn(channel_task(
            link,
            cmd_rx,
            pending,
            router.clone(),
            alive.clone(),
            closed_tx,
        ));

        Arc::new(Self {
            host,
            cmd_tx,
            router,
            alive,
            closed_rx,
            next_id: AtomicU64::new(1),
        })
    }

    /// The host this channel is connected to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// `false` once the transport is gone or `disconnect` was called.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Resolves when the channel dies for any reason.
    pub(crate) async fn wait_closed(&self) {
        let mut rx = self.closed_rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Invoke a node RPC method with named params and decode the result.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, TransportError> {
        if !self.is_alive() {
            return Err(TransportError::ChannelClosed);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let req = RpcRequest::new(id, method, params);
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Invoke { req, tx })
            .map_err(|_| TransportError::ChannelClosed)?;
        let resp = rx.await.map_err(|_| TransportError::ChannelClosed)??;
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }

    /// Subscribe to a notification topic on this channel.
    pub fn subscribe(&self, topic: &str) -> mpsc::UnboundedReceiver<Value> {
        self.router.register(topic)
    }

    /// Voluntarily shut this channel down.
    pub fn disconnect(&self) {
        let _ = self.cmd_tx.send(Command::Disconnect);
    }
}

/// Owns the link for the lifetime of the connection.
async fn channel_task(
    mut link: WsLink,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    pending: PendingMap,
    router: SubscriptionRouter,
    alive: Arc<AtomicBool>,
    closed_tx: watch::Sender<bool>,
) {
    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                None | Some(Command::Disconnect) => break,
                Some(Command::Invoke { req, tx }) => {
                    let id = match &req.id {
                        RpcId::Number(n) => *n,
                        _ => 0,
                    };
                    let text = match serde_json::to_string(&req) {
                        Ok(text) => text,
                        Err(e) => {
                            let _ = tx.send(Err(TransportError::Deserialization(e)));
                            continue;
                        }
                    };
                    pending.lock().unwrap().insert(id, tx);
                    if link.outbound.send(text).is_err() {
                        // Transport gone mid-send.
                        break;
                    }
                }
            },
            msg = link.inbound.recv() => match msg {
                None => break,
                Some(text) => handle_message(&text, &pending, &router),
            },
        }
    }

    alive.store(false, Ordering::SeqCst);
    // Fail callers still waiting on a response.
    for (_, tx) in pending.lock().unwrap().drain() {
        let _ = tx.send(Err(TransportError::ChannelClosed));
    }
    let _ = closed_tx.send(true);
}

fn handle_message(text: &str, pending: &PendingMap, router: &SubscriptionRouter) {
    let Ok(val) = serde_json::from_str::<Value>(text) else {
        tracing::debug!("failed to parse WS message as JSON");
        return;
    };

    // Notifications carry the topic in `method` and no response id.
    if val.get("id").is_none() {
        if let Some(topic) = val.get("method").and_then(|m| m.as_str()) {
            let payload = val.get("params").cloned().unwrap_or(Value::Null);
            router.dispatch(topic, payload);
        }
        return;
    }

    if let Ok(resp) = serde_json::from_str::<RpcResponse>(text) {
        let id = match &resp.id {
            RpcId::Number(n) => *n,
            _ => return,
        };
        if let Some(tx) = pending.lock().unwrap().remove(&id) {
            let _ = tx.send(Ok(resp));
        }
    }
}
