//! liskdex-ws — resilient WebSocket RPC client for the Lisk node.
//!
//! # Features
//! - Bounded connect retry: primary host, then every fallback once per
//!   round, with a fixed wait between rounds
//! - Single-flight connection guard (concurrent callers share one socket)
//! - Disconnect detection with automatic reconnection
//! - Lifecycle hooks (`on_connected` / `on_disconnected` / `on_closed`) so
//!   owners can re-arm subscriptions on every new channel
//! - Request multiplexing and topic subscriptions over a single connection

pub mod channel;
pub mod client;
pub mod connector;
pub mod subscriptions;

pub use channel::RpcChannel;
pub use client::{ConnectionState, NoEvents, WsClientConfig, WsEvents, WsRpcClient};
pub use connector::{Connector, NodeConnector, WsLink};
pub use subscriptions::SubscriptionRouter;
