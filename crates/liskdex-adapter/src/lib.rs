//! liskdex-adapter — the Lisk v3 DEX adapter module.
//!
//! Exposes a Lisk node's account, block, transaction and multisig data to
//! a DEX orchestrator. Queries go through [`LiskServiceRepository`] over
//! the resilient HTTP client; live block changes arrive over the
//! resilient WebSocket client and are republished as `chainChanges`
//! events on the module's [`EventBus`].

pub mod adapter;
pub mod errors;
pub mod meta;
pub mod models;
pub mod repository;

pub use adapter::{EventBus, LiskDexAdapter, ModuleInfo, DEFAULT_MODULE_ALIAS};
pub use errors::{ActionErrorKind, InvalidActionError};
pub use models::{Account, Block, Transaction};
pub use repository::{LiskServiceRepository, SortOrder};
