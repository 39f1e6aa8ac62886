//! Thin facade translating domain queries into service path/parameter
//! pairs and decoding the `{ data, meta }` envelopes.
//!
//! Range filters use the service's `from:to` syntax with both boundaries
//! inclusive: "transactions from ts" is `{ts}:`, "blocks up to ts" is
//! `0:{ts}`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use liskdex_core::{HostSet, TransportError};
use liskdex_http::{HttpClient, HttpTransport, ReqwestTransport};

use crate::meta;
use crate::models::{Account, Block, Envelope, ServiceTransaction, Transaction};

/// Sort direction for timestamp-ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn timestamp_sort(self) -> &'static str {
        match self {
            Self::Asc => meta::transactions::sort_by::TIMESTAMP_ASC,
            Self::Desc => meta::transactions::sort_by::TIMESTAMP_DESC,
        }
    }
}

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Repository over the indexing service.
pub struct LiskServiceRepository<T: HttpTransport = ReqwestTransport> {
    client: HttpClient<T>,
}

impl LiskServiceRepository<ReqwestTransport> {
    pub fn new(hosts: HostSet) -> Self {
        Self {
            client: HttpClient::new(hosts),
        }
    }
}

impl<T: HttpTransport> LiskServiceRepository<T> {
    pub fn with_client(client: HttpClient<T>) -> Self {
        Self { client }
    }

    async fn get_data<D: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<D, TransportError> {
        let value = self.client.get(path, params).await?;
        let envelope: Envelope<D> = serde_json::from_value(value)?;
        Ok(envelope.data)
    }

    /// Record list, with a 404 answer mapped to an empty list.
    async fn get_list<D: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Vec<D>, TransportError> {
        match self.get_data(path, params).await {
            Ok(items) => Ok(items),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// First record, or `None` when the service has no match.
    async fn first<D: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Option<D>, TransportError> {
        let mut items = self.get_list(path, params).await?;
        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(items.remove(0)))
        }
    }

    pub async fn get_network_status(&self) -> Result<Value, TransportError> {
        self.get_data(meta::network::STATUS_PATH, &[]).await
    }

    pub async fn get_network_stats(&self) -> Result<Value, TransportError> {
        self.get_data(meta::network::STATISTICS_PATH, &[]).await
    }

    pub async fn get_fees(&self) -> Result<Value, TransportError> {
        self.get_data(meta::fees::PATH, &[]).await
    }

    pub async fn get_peers(&self) -> Result<Value, TransportError> {
        self.get_data(meta::peers::PATH, &[]).await
    }

    pub async fn get_account_by_address(
        &self,
        address: &str,
    ) -> Result<Option<Account>, TransportError> {
        self.first(
            meta::accounts::PATH,
            &[param(meta::accounts::filter::ADDRESS, address)],
        )
        .await
    }

    /// Transactions sent by `sender_address` at or after `from_timestamp`.
    pub async fn get_outbound_transactions(
        &self,
        sender_address: &str,
        from_timestamp: u64,
        limit: u32,
        order: SortOrder,
    ) -> Result<Vec<Transaction>, TransportError> {
        let params = [
            param(meta::transactions::filter::SENDER_ADDRESS, sender_address),
            param(
                meta::transactions::filter::TIMESTAMP,
                format!("{from_timestamp}:"),
            ),
            param(meta::transactions::filter::LIMIT, limit),
            param(meta::transactions::filter::SORT, order.timestamp_sort()),
        ];
        let txs: Vec<ServiceTransaction> =
            self.get_list(meta::transactions::PATH, &params).await?;
        Ok(txs.into_iter().map(Transaction::from).collect())
    }

    pub async fn get_inbound_transactions_from_block(
        &self,
        recipient_address: &str,
        block_id: &str,
    ) -> Result<Vec<Transaction>, TransportError> {
        let params = [
            param(
                meta::transactions::filter::RECIPIENT_ADDRESS,
                recipient_address,
            ),
            param(meta::transactions::filter::BLOCK_ID, block_id),
        ];
        let txs: Vec<ServiceTransaction> =
            self.get_list(meta::transactions::PATH, &params).await?;
        Ok(txs.into_iter().map(Transaction::from).collect())
    }

    pub async fn get_outbound_transactions_from_block(
        &self,
        sender_address: &str,
        block_id: &str,
    ) -> Result<Vec<Transaction>, TransportError> {
        let params = [
            param(meta::transactions::filter::SENDER_ADDRESS, sender_address),
            param(meta::transactions::filter::BLOCK_ID, block_id),
        ];
        let txs: Vec<ServiceTransaction> =
            self.get_list(meta::transactions::PATH, &params).await?;
        Ok(txs.into_iter().map(Transaction::from).collect())
    }

    /// Newest block with `timestamp <= ts` (boundary inclusive).
    pub async fn get_last_block_below_timestamp(
        &self,
        ts: u64,
    ) -> Result<Option<Block>, TransportError> {
        self.first(
            meta::blocks::PATH,
            &[
                param(meta::blocks::filter::TIMESTAMP, format!("0:{ts}")),
                param(
                    meta::blocks::filter::SORT,
                    meta::blocks::sort_by::TIMESTAMP_DESC,
                ),
                param(meta::blocks::filter::LIMIT, 1),
            ],
        )
        .await
    }

    /// Block at the current chain tip.
    pub async fn get_last_block(&self) -> Result<Option<Block>, TransportError> {
        self.first(
            meta::blocks::PATH,
            &[
                param(
                    meta::blocks::filter::SORT,
                    meta::blocks::sort_by::HEIGHT_DESC,
                ),
                param(meta::blocks::filter::LIMIT, 1),
            ],
        )
        .await
    }

    /// Blocks with `from_height <= height <= to_height`, ascending.
    pub async fn get_blocks_between_heights(
        &self,
        from_height: u64,
        to_height: u64,
        limit: u32,
    ) -> Result<Vec<Block>, TransportError> {
        self.get_list(
            meta::blocks::PATH,
            &[
                param(
                    meta::blocks::filter::HEIGHT,
                    format!("{from_height}:{to_height}"),
                ),
                param(
                    meta::blocks::filter::SORT,
                    meta::blocks::sort_by::HEIGHT_ASC,
                ),
                param(meta::blocks::filter::LIMIT, limit),
            ],
        )
        .await
    }

    pub async fn get_block_at_height(&self, height: u64) -> Result<Option<Block>, TransportError> {
        self.first(
            meta::blocks::PATH,
            &[param(meta::blocks::filter::HEIGHT, height)],
        )
        .await
    }

    /// Broadcast a signed transaction through the service.
    pub async fn post_transaction(&self, transaction: &Value) -> Result<Value, TransportError> {
        self.client
            .post(
                meta::transactions::PATH,
                &serde_json::json!({ "transaction": transaction }),
            )
            .await
    }
}
