//! Service response envelope and domain DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{ data, meta }` envelope every service response is wrapped in.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Value,
}

/// Account as returned by `/api/v2/accounts`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub summary: AccountSummary,
    #[serde(default)]
    pub keys: AccountKeys,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub address: String,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub balance: Option<String>,
    #[serde(default)]
    pub is_multisignature: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountKeys {
    #[serde(default)]
    pub number_of_signatures: u32,
    #[serde(default)]
    pub members: Vec<MultisigMember>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisigMember {
    pub address: String,
    #[serde(default)]
    pub is_mandatory: bool,
}

/// Block shape handed to the DEX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub height: u64,
    pub timestamp: u64,
}

/// Transaction as returned by `/api/v2/transactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceTransaction {
    pub id: String,
    pub sender: TransactionParty,
    #[serde(default)]
    pub asset: TransactionAsset,
    pub block: TransactionBlock,
    #[serde(default)]
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionParty {
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionAsset {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub recipient: Option<TransactionParty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionBlock {
    pub timestamp: u64,
}

/// Transaction shape handed to the DEX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub message: String,
    pub amount: String,
    pub timestamp: u64,
    pub sender_address: String,
    pub recipient_address: String,
    pub signatures: Vec<TransactionSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSignature {
    pub signer_address: String,
}

impl From<ServiceTransaction> for Transaction {
    fn from(tx: ServiceTransaction) -> Self {
        Self {
            id: tx.id,
            message: tx.asset.data.unwrap_or_default(),
            amount: tx.asset.amount,
            timestamp: tx.block.timestamp,
            sender_address: tx.sender.address,
            recipient_address: tx
                .asset
                .recipient
                .map(|r| r.address)
                .unwrap_or_default(),
            signatures: tx
                .signatures
                .into_iter()
                .map(|signer_address| TransactionSignature { signer_address })
                .collect(),
        }
    }
}
