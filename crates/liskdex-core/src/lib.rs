//! liskdex-core — foundation types for the LiskDEX chain adapter.
//!
//! # Overview
//!
//! LiskDEX exposes a Lisk node's account, block, transaction and multisig
//! data to a DEX orchestrator. The core crate defines the pieces both
//! network clients are built on:
//!
//! - [`HostSet`] — ordered primary/fallback host bookkeeping with sticky
//!   active-host promotion
//! - [`RetryBudget`] — bounded fixed-interval connection retry budget
//! - [`RpcRequest`] / [`RpcResponse`] — JSON-RPC 2.0 wire types
//! - [`TransportError`] — structured error type with retryability
//!   classification
//! - [`AdapterConfig`] — adapter configuration with per-network defaults

pub mod config;
pub mod error;
pub mod hosts;
pub mod request;
pub mod retry;

pub use config::{AdapterConfig, NetworkEnv};
pub use error::TransportError;
pub use hosts::HostSet;
pub use request::{RpcError, RpcId, RpcRequest, RpcResponse};
pub use retry::RetryBudget;
