//! Thin typed wrappers over [`RpcClient::send_request`] for common NEAR
//! RPC methods.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::client::RpcClient;
use crate::error::RpcError;

/// A block by height or by hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockId {
    Height(u64),
    Hash(String),
}

/// How final a queried block must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Finality {
    Optimistic,
    NearFinal,
    Final,
}

/// Which block a query runs against.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockReference {
    Finality(Finality),
    BlockId(BlockId),
}

impl BlockReference {
    /// The `{"finality": ..}` / `{"block_id": ..}` fragment NEAR expects.
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        match self {
            Self::Finality(f) => params.insert("finality".into(), json!(f)),
            Self::BlockId(id) => params.insert("block_id".into(), json!(id)),
        };
        params
    }
}

impl From<Finality> for BlockReference {
    fn from(f: Finality) -> Self {
        Self::Finality(f)
    }
}

impl From<BlockId> for BlockReference {
    fn from(id: BlockId) -> Self {
        Self::BlockId(id)
    }
}

/// A chunk by its hash or by block + shard.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkId {
    Hash(String),
    InBlock { block_id: BlockId, shard_id: u64 },
}

/// Result of `gas_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasPrice {
    pub gas_price: String,
}

/// One account/public-key pair for `single_access_key_changes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKeyWithPublicKey {
    pub account_id: String,
    pub public_key: String,
}

impl RpcClient {
    /// `status` — node and chain status.
    pub async fn status(&self) -> Result<Value, RpcError> {
        self.send_request("status", json!([])).await
    }

    /// `gas_price` at `block_id`, or at the latest block.
    pub async fn gas_price(&self, block_id: Option<BlockId>) -> Result<GasPrice, RpcError> {
        self.send_request("gas_price", json!([block_id])).await
    }

    /// `block` by reference.
    pub async fn block(&self, block: impl Into<BlockReference>) -> Result<Value, RpcError> {
        self.send_request("block", Value::Object(block.into().to_params()))
            .await
    }

    /// `chunk` by hash or by block and shard.
    pub async fn chunk(&self, chunk: ChunkId) -> Result<Value, RpcError> {
        let params = match chunk {
            ChunkId::Hash(hash) => json!({"chunk_id": hash}),
            ChunkId::InBlock { block_id, shard_id } => {
                json!({"block_id": block_id, "shard_id": shard_id})
            }
        };
        self.send_request("chunk", params).await
    }

    /// `validators` at `block_id`, or for the latest block.
    pub async fn validators(&self, block_id: Option<BlockId>) -> Result<Value, RpcError> {
        self.send_request("validators", json!([block_id])).await
    }

    /// `tx` — status of `tx_hash` sent by `sender_id`.
    pub async fn tx_status(&self, tx_hash: &str, sender_id: &str) -> Result<Value, RpcError> {
        self.send_request("tx", json!([tx_hash, sender_id])).await
    }

    /// `EXPERIMENTAL_changes` with the given `changes_type`.
    ///
    /// `extra` is merged into the params next to the block reference.
    pub async fn experimental_changes(
        &self,
        changes_type: &str,
        block: impl Into<BlockReference>,
        extra: Map<String, Value>,
    ) -> Result<Value, RpcError> {
        let mut params = block.into().to_params();
        params.insert("changes_type".into(), json!(changes_type));
        params.extend(extra);
        self.send_request("EXPERIMENTAL_changes", Value::Object(params))
            .await
    }

    /// Changes to every access key of `account_ids`.
    pub async fn access_key_changes(
        &self,
        account_ids: &[&str],
        block: impl Into<BlockReference>,
    ) -> Result<Value, RpcError> {
        self.experimental_changes("all_access_key_changes", block, account_ids_param(account_ids))
            .await
    }

    /// Changes to specific access keys.
    pub async fn single_access_key_changes(
        &self,
        keys: &[AccessKeyWithPublicKey],
        block: impl Into<BlockReference>,
    ) -> Result<Value, RpcError> {
        let mut extra = Map::new();
        extra.insert("keys".into(), json!(keys));
        self.experimental_changes("single_access_key_changes", block, extra)
            .await
    }

    /// Changes to the accounts themselves.
    pub async fn account_changes(
        &self,
        account_ids: &[&str],
        block: impl Into<BlockReference>,
    ) -> Result<Value, RpcError> {
        self.experimental_changes("account_changes", block, account_ids_param(account_ids))
            .await
    }

    /// Changes to contract state under `key_prefix_base64`.
    pub async fn contract_state_changes(
        &self,
        account_ids: &[&str],
        key_prefix_base64: &str,
        block: impl Into<BlockReference>,
    ) -> Result<Value, RpcError> {
        let mut extra = account_ids_param(account_ids);
        extra.insert("key_prefix_base64".into(), json!(key_prefix_base64));
        self.experimental_changes("data_changes", block, extra).await
    }

    /// Changes to deployed contract code.
    pub async fn contract_code_changes(
        &self,
        account_ids: &[&str],
        block: impl Into<BlockReference>,
    ) -> Result<Value, RpcError> {
        self.experimental_changes("contract_code_changes", block, account_ids_param(account_ids))
            .await
    }
}

fn account_ids_param(account_ids: &[&str]) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("account_ids".into(), json!(account_ids));
    m
}
