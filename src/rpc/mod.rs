//! CKB-style JSON-RPC client. Grounded on `arch_rpc::ArchRpcClient` (plain
//! `reqwest` POST of a JSON-RPC envelope, `response["result"]` extraction)
//! but expressed behind a trait so the Sync Controller and Block Syncer
//! can be driven by a mock in tests.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Script {
    pub code_hash: String,
    pub hash_type: String,
    pub args: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellOutput {
    pub lock: Script,
    #[serde(rename = "type")]
    pub type_: Option<Script>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub witnesses: Vec<String>,
    pub outputs: Vec<CellOutput>,
    pub outputs_data: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub hash: String,
    pub parent_hash: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn number(&self) -> Result<u64> {
        parse_hex_u64(&self.header.number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain: String,
    pub median_time: Option<String>,
    pub epoch: Option<String>,
}

/// Parses CKB's `"0x1a2b"`-style hex-encoded integers.
pub fn parse_hex_u64(s: &str) -> Result<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).with_context(|| format!("invalid hex integer: {s:?}"))
}

/// Strips a leading `0x` from a hash/script-field hex string.
pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

#[async_trait]
pub trait CkbRpcClient: Send + Sync {
    async fn get_tip_block_number(&self) -> Result<u64>;
    async fn get_block_by_number(&self, number: u64) -> Result<Option<Block>>;
    async fn get_blockchain_info(&self) -> Result<ChainInfo>;
    async fn close(&self);
}

#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    client: reqwest::Client,
    url: String,
}

impl JsonRpcClient {
    pub fn new(url: String) -> Self {
        Self { client: reqwest::Client::new(), url }
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let body = self
            .client
            .post(&self.url)
            .json(&json!({
                "id": 1,
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
            }))
            .send()
            .await
            .with_context(|| format!("rpc request {method} failed"))?
            .json::<serde_json::Value>()
            .await
            .with_context(|| format!("rpc response {method} was not valid json"))?;

        if let Some(err) = body.get("error") {
            return Err(anyhow!("rpc {method} returned error: {err}"));
        }
        Ok(body["result"].clone())
    }
}

#[async_trait]
impl CkbRpcClient for JsonRpcClient {
    async fn get_tip_block_number(&self) -> Result<u64> {
        let result = self.call("get_tip_block_number", json!([])).await?;
        let as_str = result
            .as_str()
            .ok_or_else(|| anyhow!("get_tip_block_number: expected hex string, got {result}"))?;
        parse_hex_u64(as_str)
    }

    async fn get_block_by_number(&self, number: u64) -> Result<Option<Block>> {
        let result = self
            .call("get_block_by_number", json!([format!("0x{:x}", number)]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let block: Block = serde_json::from_value(result)
            .with_context(|| format!("get_block_by_number({number}): malformed block"))?;
        Ok(Some(block))
    }

    async fn get_blockchain_info(&self) -> Result<ChainInfo> {
        let result = self.call("get_blockchain_info", json!([])).await?;
        let info: ChainInfo = serde_json::from_value(result)
            .context("get_blockchain_info: malformed response")?;
        Ok(info)
    }

    async fn close(&self) {
        tracing::info!("closing ckb rpc client");
    }
}
