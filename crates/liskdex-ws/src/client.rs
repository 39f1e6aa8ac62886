//! WebSocket RPC client: one logical node connection maintained across
//! restarts, retries and host failover.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tokio::time;

use liskdex_core::{HostSet, RetryBudget, TransportError};

use crate::channel::RpcChannel;
use crate::connector::{Connector, NodeConnector};

/// Connection lifecycle, exposed for observability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected(String),
    Disconnected,
    Closed,
}

/// Lifecycle hooks invoked by the client.
///
/// Subscriptions are never carried over to a replacement channel:
/// `on_connected` fires on every successful (re)connection, and the owner
/// is expected to re-register its subscriptions there.
pub trait WsEvents: Send + Sync + 'static {
    fn on_connected(&self, _channel: &Arc<RpcChannel>) {}
    fn on_disconnected(&self) {}
    fn on_closed(&self, _err: Option<&TransportError>) {}
}

/// No-op hooks.
pub struct NoEvents;

impl WsEvents for NoEvents {}

/// Configuration for [`WsRpcClient`].
#[derive(Debug, Clone)]
pub struct WsClientConfig {
    pub hosts: HostSet,
    pub retry: RetryBudget,
}

struct ClientInner<C: Connector> {
    config: WsClientConfig,
    connector: C,
    events: Arc<dyn WsEvents>,
    /// Single-flight guard: serializes connection establishment and holds
    /// the current channel.
    channel: Mutex<Option<Arc<RpcChannel>>>,
    state: StdMutex<ConnectionState>,
    closed: AtomicBool,
    closed_hook_fired: AtomicBool,
}

/// Maintains one logical RPC connection to a chain node.
///
/// Cheap to clone; all clones share the same connection. The live channel
/// is exclusively owned by the client and replaced, never shared, on
/// reconnect.
pub struct WsRpcClient<C: Connector = NodeConnector> {
    inner: Arc<ClientInner<C>>,
}

impl<C: Connector> Clone for WsRpcClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl WsRpcClient<NodeConnector> {
    /// Create a client dialing real node endpoints.
    pub fn new(config: WsClientConfig, events: Arc<dyn WsEvents>) -> Self {
        Self::with_connector(config, NodeConnector, events)
    }
}

impl<C: Connector> WsRpcClient<C> {
    /// Create a client with an injected connector.
    pub fn with_connector(config: WsClientConfig, connector: C, events: Arc<dyn WsEvents>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                connector,
                events,
                channel: Mutex::new(None),
                state: StdMutex::new(ConnectionState::Idle),
                closed: AtomicBool::new(false),
                closed_hook_fired: AtomicBool::new(false),
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().unwrap().clone()
    }

    fn set_state(&self, state: ConnectionState) {
        *self.inner.state.lock().unwrap() = state;
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Get a live channel, establishing the connection if needed.
    ///
    /// Fails with the last connection error once the retry budget is
    /// exhausted.
    pub async fn connect(&self) -> Result<Arc<RpcChannel>, TransportError> {
        self.obtain_channel().await
    }

    /// Like [`connect`](Self::connect), but converts exhaustion into a
    /// terminal close: the client transitions to `Closed`, `on_closed`
    /// fires exactly once, and `None` is returned instead of an error.
    pub async fn try_connect(&self) -> Option<Arc<RpcChannel>> {
        match self.obtain_channel().await {
            Ok(channel) => Some(channel),
            Err(err) => {
                tracing::error!(error = %err, "giving up on WS connection");
                self.shutdown(Some(err));
                None
            }
        }
    }

    async fn obtain_channel(&self) -> Result<Arc<RpcChannel>, TransportError> {
        if self.is_closed() {
            return Err(TransportError::ChannelClosed);
        }

        // Single-flight: concurrent callers queue on the lock and reuse
        // the channel established by the first one through.
        let mut guard = self.inner.channel.lock().await;

        if let Some(channel) = guard.as_ref() {
            if channel.is_alive() {
                return Ok(channel.clone());
            }
            // Dead channel — discard before dialing a new one.
            channel.disconnect();
            *guard = None;
            self.set_state(ConnectionState::Disconnected);
        }

        let channel = match self.connect_with_retry().await {
            Ok(channel) => channel,
            Err(err) => {
                self.set_state(ConnectionState::Idle);
                return Err(err);
            }
        };

        if self.is_closed() {
            // close() happened while we were dialing; discard the result.
            channel.disconnect();
            return Err(TransportError::ChannelClosed);
        }

        *guard = Some(channel.clone());
        self.set_state(ConnectionState::Connected(channel.host().to_string()));
        self.spawn_monitor(channel.clone());
        self.inner.events.on_connected(&channel);
        Ok(channel)
    }

    /// One dial per host per round: the primary first, then every
    /// fallback once in order, with a fixed wait between full rounds.
    async fn connect_with_retry(&self) -> Result<Arc<RpcChannel>, TransportError> {
        self.set_state(ConnectionState::Connecting);
        let retry = self.inner.config.retry;
        let mut last_err = None;

        for attempt in 1..=retry.max_attempts {
            let hosts = &self.inner.config.hosts;
            let mut round = vec![hosts.preferred().to_string()];
            round.extend(hosts.fallbacks().iter().cloned());

            for host in &round {
                match self.dial(host).await {
                    Ok(channel) => return Ok(channel),
                    Err(err) => {
                        tracing::warn!(host = %host, attempt, error = %err, "WS connect failed");
                        last_err = Some(err);
                    }
                }
                if self.is_closed() {
                    return Err(TransportError::ChannelClosed);
                }
            }

            if retry.should_retry(attempt) {
                time::sleep(retry.interval).await;
            }
        }

        Err(last_err.unwrap_or_else(|| TransportError::WebSocket("no hosts configured".into())))
    }

    async fn dial(&self, host: &str) -> Result<Arc<RpcChannel>, TransportError> {
        let link = self.inner.connector.connect(host).await?;
        Ok(RpcChannel::start(host.to_string(), link))
    }

    /// Watches one established channel and re-enters the connect loop on
    /// involuntary disconnect.
    fn spawn_monitor(&self, channel: Arc<RpcChannel>) {
        let client = self.clone();
        tokio::spawn(async move {
            channel.wait_closed().await;
            if client.is_closed() {
                return;
            }
            tracing::warn!(host = %channel.host(), "WS connection lost, reconnecting");
            client.set_state(ConnectionState::Disconnected);
            client.inner.events.on_disconnected();
            // Reconnect and re-arm subscriptions through on_connected;
            // exhaustion turns into a terminal close.
            let _ = client.try_connect().await;
        });
    }

    /// Stop reconnecting, drop the current channel and fire `on_closed`
    /// exactly once.
    pub async fn close(&self, err: Option<TransportError>) {
        self.inner.closed.store(true, Ordering::SeqCst);
        if let Some(channel) = self.inner.channel.lock().await.take() {
            channel.disconnect();
        }
        self.shutdown(err);
    }

    fn shutdown(&self, err: Option<TransportError>) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.set_state(ConnectionState::Closed);
        if !self.inner.closed_hook_fired.swap(true, Ordering::SeqCst) {
            self.inner.events.on_closed(err.as_ref());
        }
    }
}
