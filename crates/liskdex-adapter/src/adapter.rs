//! The DEX adapter module: identity, action surface and lifecycle.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use liskdex_core::{AdapterConfig, HostSet, RetryBudget, TransportError};
use liskdex_http::{HttpClient, HttpTransport, ReqwestTransport};
use liskdex_ws::{Connector, NodeConnector, RpcChannel, WsClientConfig, WsEvents, WsRpcClient};

use crate::errors::{ActionErrorKind, InvalidActionError};
use crate::models::{Block, Transaction};
use crate::repository::{LiskServiceRepository, SortOrder};

pub const DEFAULT_MODULE_ALIAS: &str = "lisk_v3_dex_adapter";
pub const MODULE_BOOTSTRAP_EVENT: &str = "bootstrap";
pub const MODULE_CHAIN_STATE_CHANGES_EVENT: &str = "chainChanges";

/// Node notification topics republished as `chainChanges`.
pub const BLOCK_NEW_TOPIC: &str = "app:block:new";
pub const BLOCK_DELETE_TOPIC: &str = "app:block:delete";

/// Downstream event channel the module publishes on.
pub trait EventBus: Send + Sync + 'static {
    fn publish(&self, event: &str, payload: Value);
}

/// Module identity reported through `info`.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleInfo {
    pub author: String,
    pub version: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAddressParams {
    pub wallet_address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundTransactionsParams {
    pub wallet_address: String,
    pub from_timestamp: u64,
    #[serde(default = "default_tx_limit")]
    pub limit: u32,
    #[serde(default)]
    pub order: SortOrder,
}

fn default_tx_limit() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsFromBlockParams {
    pub wallet_address: String,
    pub block_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampParams {
    pub timestamp: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRangeParams {
    pub from_height: u64,
    pub to_height: u64,
    #[serde(default = "default_tx_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightParams {
    pub height: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTransactionParams {
    pub transaction: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub version: String,
    #[serde(rename = "chainSymbol")]
    pub chain_symbol: String,
}

/// Re-arms block subscriptions on every (re)connected channel and
/// forwards the payloads to the bus as `chainChanges` events.
struct ChainEventForwarder {
    alias: String,
    bus: Mutex<Option<Arc<dyn EventBus>>>,
}

impl ChainEventForwarder {
    fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            bus: Mutex::new(None),
        }
    }

    fn attach(&self, bus: Arc<dyn EventBus>) {
        *self.bus.lock().unwrap() = Some(bus);
    }
}

impl WsEvents for ChainEventForwarder {
    fn on_connected(&self, channel: &Arc<RpcChannel>) {
        let Some(bus) = self.bus.lock().unwrap().clone() else {
            return;
        };
        for (topic, change) in [(BLOCK_NEW_TOPIC, "newBlock"), (BLOCK_DELETE_TOPIC, "deleteBlock")] {
            let mut rx = channel.subscribe(topic);
            let bus = bus.clone();
            let event = format!("{}:{}", self.alias, MODULE_CHAIN_STATE_CHANGES_EVENT);
            tokio::spawn(async move {
                while let Some(payload) = rx.recv().await {
                    bus.publish(
                        &event,
                        serde_json::json!({ "type": change, "payload": payload }),
                    );
                }
            });
        }
        tracing::info!(host = %channel.host(), "armed block subscriptions");
    }

    fn on_disconnected(&self) {
        tracing::warn!("node channel lost, waiting for reconnect");
    }

    fn on_closed(&self, err: Option<&TransportError>) {
        match err {
            Some(err) => tracing::error!(error = %err, "node channel closed"),
            None => tracing::info!("node channel closed"),
        }
    }
}

/// The Lisk v3 DEX adapter module.
pub struct LiskDexAdapter<T: HttpTransport = ReqwestTransport, C: Connector = NodeConnector> {
    alias: String,
    config: AdapterConfig,
    repo: LiskServiceRepository<T>,
    ws: WsRpcClient<C>,
    forwarder: Arc<ChainEventForwarder>,
}

impl LiskDexAdapter<ReqwestTransport, NodeConnector> {
    /// Build the module against real service and node endpoints.
    pub fn new(config: AdapterConfig) -> Self {
        Self::with_transports(config, ReqwestTransport::default(), NodeConnector)
    }
}

impl<T: HttpTransport, C: Connector> LiskDexAdapter<T, C> {
    /// Build the module with injected transports.
    pub fn with_transports(config: AdapterConfig, transport: T, connector: C) -> Self {
        let alias = DEFAULT_MODULE_ALIAS.to_string();
        let service_hosts = HostSet::new(
            config.service_url.clone(),
            config.service_url_fallbacks.clone(),
        );
        let node_hosts = HostSet::new(
            config.lisk_ws_host.clone(),
            config.lisk_ws_host_fallbacks.clone(),
        );
        let forwarder = Arc::new(ChainEventForwarder::new(&alias));
        let ws = WsRpcClient::with_connector(
            WsClientConfig {
                hosts: node_hosts,
                retry: RetryBudget::default(),
            },
            connector,
            forwarder.clone(),
        );
        Self {
            alias,
            repo: LiskServiceRepository::with_client(HttpClient::with_transport(
                service_hosts,
                transport,
            )),
            ws,
            forwarder,
            config,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn repository(&self) -> &LiskServiceRepository<T> {
        &self.repo
    }

    pub fn dependencies(&self) -> Vec<&'static str> {
        vec!["app"]
    }

    pub fn events(&self) -> Vec<&'static str> {
        vec![MODULE_BOOTSTRAP_EVENT, MODULE_CHAIN_STATE_CHANGES_EVENT]
    }

    pub fn info(&self) -> ModuleInfo {
        ModuleInfo {
            author: env!("CARGO_PKG_AUTHORS").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: env!("CARGO_PKG_NAME").to_string(),
        }
    }

    pub fn get_status(&self) -> StatusInfo {
        StatusInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            chain_symbol: self.config.chain_symbol.clone(),
        }
    }

    async fn multisig_account(
        &self,
        wallet_address: &str,
    ) -> Result<crate::models::Account, InvalidActionError> {
        let missing = || {
            format!("Error getting multisig account with address {wallet_address}")
        };
        let account = self
            .repo
            .get_account_by_address(wallet_address)
            .await
            .map_err(|err| {
                InvalidActionError::with_source(
                    ActionErrorKind::MultisigAccountDidNotExist,
                    missing(),
                    err,
                )
            })?
            .ok_or_else(|| {
                InvalidActionError::new(ActionErrorKind::MultisigAccountDidNotExist, missing())
            })?;
        if !account.summary.is_multisignature {
            return Err(InvalidActionError::new(
                ActionErrorKind::AccountWasNotMultisig,
                format!("Account with address {wallet_address} is not a multisig account"),
            ));
        }
        Ok(account)
    }

    pub async fn get_multisig_wallet_members(
        &self,
        params: WalletAddressParams,
    ) -> Result<Vec<String>, InvalidActionError> {
        let account = self.multisig_account(&params.wallet_address).await?;
        Ok(account.keys.members.into_iter().map(|m| m.address).collect())
    }

    pub async fn get_min_multisig_required_signatures(
        &self,
        params: WalletAddressParams,
    ) -> Result<u32, InvalidActionError> {
        let account = self.multisig_account(&params.wallet_address).await?;
        Ok(account.keys.number_of_signatures)
    }

    pub async fn get_outbound_transactions(
        &self,
        params: OutboundTransactionsParams,
    ) -> Result<Vec<Transaction>, InvalidActionError> {
        self.repo
            .get_outbound_transactions(
                &params.wallet_address,
                params.from_timestamp,
                params.limit,
                params.order,
            )
            .await
            .map_err(|err| {
                InvalidActionError::with_source(
                    ActionErrorKind::AccountDidNotExist,
                    format!(
                        "Error getting outbound transactions with account address {}",
                        params.wallet_address
                    ),
                    err,
                )
            })
    }

    pub async fn get_inbound_transactions_from_block(
        &self,
        params: TransactionsFromBlockParams,
    ) -> Result<Vec<Transaction>, InvalidActionError> {
        self.repo
            .get_inbound_transactions_from_block(&params.wallet_address, &params.block_id)
            .await
            .map_err(|err| {
                InvalidActionError::with_source(
                    ActionErrorKind::AccountDidNotExist,
                    format!(
                        "Error getting inbound transactions with account address {}",
                        params.wallet_address
                    ),
                    err,
                )
            })
    }

    pub async fn get_outbound_transactions_from_block(
        &self,
        params: TransactionsFromBlockParams,
    ) -> Result<Vec<Transaction>, InvalidActionError> {
        self.repo
            .get_outbound_transactions_from_block(&params.wallet_address, &params.block_id)
            .await
            .map_err(|err| {
                InvalidActionError::with_source(
                    ActionErrorKind::AccountDidNotExist,
                    format!(
                        "Error getting outbound transactions with account address {}",
                        params.wallet_address
                    ),
                    err,
                )
            })
    }

    pub async fn get_last_block_at_timestamp(
        &self,
        params: TimestampParams,
    ) -> Result<Block, InvalidActionError> {
        let message = format!("Error getting block below timestamp {}", params.timestamp);
        self.repo
            .get_last_block_below_timestamp(params.timestamp)
            .await
            .map_err(|err| {
                InvalidActionError::with_source(ActionErrorKind::BlockDidNotExist, message.clone(), err)
            })?
            .ok_or_else(|| InvalidActionError::new(ActionErrorKind::BlockDidNotExist, message))
    }

    pub async fn get_max_block_height(&self) -> Result<u64, InvalidActionError> {
        let message = "Error getting block at max height";
        let block = self
            .repo
            .get_last_block()
            .await
            .map_err(|err| {
                InvalidActionError::with_source(ActionErrorKind::BlockDidNotExist, message, err)
            })?
            .ok_or_else(|| InvalidActionError::new(ActionErrorKind::BlockDidNotExist, message))?;
        Ok(block.height)
    }

    pub async fn get_blocks_between_heights(
        &self,
        params: BlockRangeParams,
    ) -> Result<Vec<Block>, InvalidActionError> {
        self.repo
            .get_blocks_between_heights(params.from_height, params.to_height, params.limit)
            .await
            .map_err(|err| {
                InvalidActionError::with_source(
                    ActionErrorKind::BlockDidNotExist,
                    format!(
                        "Error getting block between heights {} - {}",
                        params.from_height, params.to_height
                    ),
                    err,
                )
            })
    }

    pub async fn get_block_at_height(
        &self,
        params: HeightParams,
    ) -> Result<Block, InvalidActionError> {
        let message = format!("Error getting block at height {}", params.height);
        self.repo
            .get_block_at_height(params.height)
            .await
            .map_err(|err| {
                InvalidActionError::with_source(ActionErrorKind::BlockDidNotExist, message.clone(), err)
            })?
            .ok_or_else(|| InvalidActionError::new(ActionErrorKind::BlockDidNotExist, message))
    }

    pub async fn post_transaction(
        &self,
        params: PostTransactionParams,
    ) -> Result<Value, InvalidActionError> {
        self.repo
            .post_transaction(&params.transaction)
            .await
            .map_err(|err| {
                InvalidActionError::with_source(
                    ActionErrorKind::TransactionBroadcastFailed,
                    "Error broadcasting transaction to the lisk-service",
                    err,
                )
            })
    }

    /// Connect the node channel, arm block subscriptions (through the
    /// forwarder's `on_connected` hook, so a reconnect re-arms them) and
    /// announce readiness on the bus.
    pub async fn load(&self, bus: Arc<dyn EventBus>) -> Result<(), TransportError> {
        self.forwarder.attach(bus.clone());
        self.ws.connect().await?;
        bus.publish(
            &format!("{}:{}", self.alias, MODULE_BOOTSTRAP_EVENT),
            Value::Null,
        );
        Ok(())
    }

    /// Tear the node channel down; no reconnects after this.
    pub async fn unload(&self) {
        self.ws.close(None).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio::time;

    use liskdex_core::NetworkEnv;
    use liskdex_ws::WsLink;

    // -- service side ------------------------------------------------------

    struct ScriptedService {
        routes: HashMap<&'static str, Result<Value, u16>>,
    }

    impl ScriptedService {
        fn new(routes: Vec<(&'static str, Result<Value, u16>)>) -> Self {
            Self {
                routes: routes.into_iter().collect(),
            }
        }

        fn respond(&self, url: &str) -> Result<Value, TransportError> {
            let (_, result) = self
                .routes
                .iter()
                .find(|(path, _)| url.contains(*path))
                .expect("request to unscripted path");
            match result {
                Ok(value) => Ok(serde_json::json!({"data": value, "meta": {}})),
                Err(code) => Err(TransportError::Status {
                    code: *code,
                    body: String::new(),
                }),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedService {
        async fn get(&self, url: &str, _query: &[(String, String)]) -> Result<Value, TransportError> {
            self.respond(url)
        }

        async fn post(&self, url: &str, _payload: &Value) -> Result<Value, TransportError> {
            self.respond(url)
        }
    }

    // -- node side ---------------------------------------------------------

    struct NodePeer {
        to_channel: mpsc::UnboundedSender<String>,
        _from_channel: mpsc::UnboundedReceiver<String>,
    }

    #[derive(Default)]
    struct AcceptingNode {
        peers: StdMutex<Vec<NodePeer>>,
    }

    impl AcceptingNode {
        fn emit(&self, topic: &str, payload: Value) {
            let event = serde_json::json!({
                "jsonrpc": "2.0",
                "method": topic,
                "params": payload,
            });
            let peers = self.peers.lock().unwrap();
            let peer = peers.last().expect("no connected peer");
            peer.to_channel.send(event.to_string()).unwrap();
        }

        fn kill_latest_peer(&self) {
            self.peers.lock().unwrap().pop();
        }

        fn connection_count(&self) -> usize {
            self.peers.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Connector for Arc<AcceptingNode> {
        async fn connect(&self, _host: &str) -> Result<WsLink, TransportError> {
            let (out_tx, out_rx) = mpsc::unbounded_channel();
            let (in_tx, in_rx) = mpsc::unbounded_channel();
            self.peers.lock().unwrap().push(NodePeer {
                to_channel: in_tx,
                _from_channel: out_rx,
            });
            Ok(WsLink {
                outbound: out_tx,
                inbound: in_rx,
            })
        }
    }

    // -- bus ---------------------------------------------------------------

    #[derive(Default)]
    struct RecordingBus {
        events: StdMutex<Vec<(String, Value)>>,
    }

    impl RecordingBus {
        fn events(&self) -> Vec<(String, Value)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EventBus for RecordingBus {
        fn publish(&self, event: &str, payload: Value) {
            self.events.lock().unwrap().push((event.to_string(), payload));
        }
    }

    fn adapter(
        routes: Vec<(&'static str, Result<Value, u16>)>,
    ) -> (
        LiskDexAdapter<ScriptedService, Arc<AcceptingNode>>,
        Arc<AcceptingNode>,
    ) {
        let node = Arc::new(AcceptingNode::default());
        let adapter = LiskDexAdapter::with_transports(
            AdapterConfig::defaults_for(NetworkEnv::Test),
            ScriptedService::new(routes),
            node.clone(),
        );
        (adapter, node)
    }

    fn multisig_account() -> Value {
        serde_json::json!([{
            "summary": {"address": "lskmultisig", "isMultisignature": true},
            "keys": {
                "numberOfSignatures": 2,
                "members": [
                    {"address": "lskaaa", "isMandatory": true},
                    {"address": "lskbbb", "isMandatory": false},
                ],
            },
        }])
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not met in time");
    }

    #[tokio::test]
    async fn module_identity() {
        let (adapter, _) = adapter(vec![]);
        assert_eq!(adapter.alias(), DEFAULT_MODULE_ALIAS);
        assert_eq!(adapter.dependencies(), vec!["app"]);
        assert_eq!(adapter.events(), vec!["bootstrap", "chainChanges"]);
        let info = adapter.info();
        assert!(!info.version.is_empty());
        assert!(!info.name.is_empty());
        assert_eq!(adapter.get_status().chain_symbol, "lsk");
    }

    #[tokio::test]
    async fn multisig_wallet_members() {
        let (adapter, _) = adapter(vec![("/api/v2/accounts", Ok(multisig_account()))]);
        let members = adapter
            .get_multisig_wallet_members(WalletAddressParams {
                wallet_address: "lskmultisig".into(),
            })
            .await
            .unwrap();
        assert_eq!(members, vec!["lskaaa".to_string(), "lskbbb".to_string()]);
    }

    #[tokio::test]
    async fn min_required_signatures() {
        let (adapter, _) = adapter(vec![("/api/v2/accounts", Ok(multisig_account()))]);
        let min = adapter
            .get_min_multisig_required_signatures(WalletAddressParams {
                wallet_address: "lskmultisig".into(),
            })
            .await
            .unwrap();
        assert_eq!(min, 2);
    }

    #[tokio::test]
    async fn missing_account_is_a_named_error() {
        let (adapter, _) = adapter(vec![("/api/v2/accounts", Ok(serde_json::json!([])))]);
        let err = adapter
            .get_multisig_wallet_members(WalletAddressParams {
                wallet_address: "lskmissing".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::MultisigAccountDidNotExist);
    }

    #[tokio::test]
    async fn non_multisig_account_is_a_named_error() {
        let account = serde_json::json!([{
            "summary": {"address": "lskplain", "isMultisignature": false},
        }]);
        let (adapter, _) = adapter(vec![("/api/v2/accounts", Ok(account))]);
        let err = adapter
            .get_min_multisig_required_signatures(WalletAddressParams {
                wallet_address: "lskplain".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::AccountWasNotMultisig);
    }

    #[tokio::test]
    async fn max_block_height() {
        let blocks = serde_json::json!([{"id": "tip", "height": 4321, "timestamp": 99}]);
        let (adapter, _) = adapter(vec![("/api/v2/blocks", Ok(blocks))]);
        assert_eq!(adapter.get_max_block_height().await.unwrap(), 4321);
    }

    #[tokio::test]
    async fn missing_block_is_a_named_error() {
        let (adapter, _) = adapter(vec![("/api/v2/blocks", Ok(serde_json::json!([])))]);
        let err = adapter
            .get_block_at_height(HeightParams { height: 7 })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::BlockDidNotExist);
    }

    #[tokio::test]
    async fn broadcast_failure_is_a_named_error() {
        let (adapter, _) = adapter(vec![("/api/v2/transactions", Err(500))]);
        let err = adapter
            .post_transaction(PostTransactionParams {
                transaction: serde_json::json!("0a1b"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ActionErrorKind::TransactionBroadcastFailed);
        assert!(err.source.is_some());
    }

    #[tokio::test]
    async fn load_publishes_bootstrap_and_forwards_block_events() {
        let (adapter, node) = adapter(vec![]);
        let bus = Arc::new(RecordingBus::default());

        adapter.load(bus.clone()).await.unwrap();

        let events = bus.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "lisk_v3_dex_adapter:bootstrap");

        node.emit(BLOCK_NEW_TOPIC, serde_json::json!({"block": "0a1b"}));
        wait_until(|| bus.events().len() == 2).await;

        let (event, payload) = bus.events().pop().unwrap();
        assert_eq!(event, "lisk_v3_dex_adapter:chainChanges");
        assert_eq!(payload["type"], "newBlock");
        assert_eq!(payload["payload"]["block"], "0a1b");

        adapter.unload().await;
    }

    #[tokio::test]
    async fn reconnect_rearms_block_subscriptions() {
        let (adapter, node) = adapter(vec![]);
        let bus = Arc::new(RecordingBus::default());

        adapter.load(bus.clone()).await.unwrap();
        assert_eq!(node.connection_count(), 1);

        node.kill_latest_peer();
        wait_until(|| node.connection_count() == 1).await;

        node.emit(BLOCK_DELETE_TOPIC, serde_json::json!({"block": "ff"}));
        wait_until(|| {
            bus.events()
                .iter()
                .any(|(_, payload)| payload["type"] == "deleteBlock")
        })
        .await;

        adapter.unload().await;
    }
}
