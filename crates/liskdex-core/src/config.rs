//! Adapter configuration with per-network defaults.
//!
//! Configuration is an explicit struct passed at construction — there is
//! no shared default instance mutated across clients.

use serde::{Deserialize, Serialize};

pub const TESTNET_SERVICE_URL: &str = "https://testnet-service.lisk.com";
pub const MAINNET_SERVICE_URL: &str = "https://service.lisk.com";
pub const TESTNET_NODE_WS_HOST: &str = "wss://testnet-api.lisktools.eu";
pub const MAINNET_NODE_WS_HOST: &str = "wss://api.lisktools.eu";

/// Which Lisk network the adapter targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkEnv {
    Test,
    Main,
}

/// Adapter module configuration.
///
/// Field names on the wire match the module's JSON configuration schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Indexing service base URL.
    #[serde(rename = "serviceURL")]
    pub service_url: String,
    /// Ordered indexing-service fallback URLs.
    #[serde(rename = "serviceURLFallbacks", default)]
    pub service_url_fallbacks: Vec<String>,
    /// Node WebSocket host (the `/ws` path is appended when dialing).
    #[serde(rename = "liskWsHost")]
    pub lisk_ws_host: String,
    /// Ordered node WebSocket fallback hosts.
    #[serde(rename = "liskWsHostFallbacks", default)]
    pub lisk_ws_host_fallbacks: Vec<String>,
    pub env: NetworkEnv,
    #[serde(rename = "dexWalletAddress", default)]
    pub dex_wallet_address: String,
    #[serde(rename = "chainSymbol", default = "default_chain_symbol")]
    pub chain_symbol: String,
}

fn default_chain_symbol() -> String {
    "lsk".into()
}

impl AdapterConfig {
    /// Environment-dependent defaults (test vs main network URLs).
    pub fn defaults_for(env: NetworkEnv) -> Self {
        let (service_url, lisk_ws_host) = match env {
            NetworkEnv::Test => (TESTNET_SERVICE_URL, TESTNET_NODE_WS_HOST),
            NetworkEnv::Main => (MAINNET_SERVICE_URL, MAINNET_NODE_WS_HOST),
        };
        Self {
            service_url: service_url.into(),
            service_url_fallbacks: Vec::new(),
            lisk_ws_host: lisk_ws_host.into(),
            lisk_ws_host_fallbacks: Vec::new(),
            env,
            dex_wallet_address: String::new(),
            chain_symbol: default_chain_symbol(),
        }
    }
}
