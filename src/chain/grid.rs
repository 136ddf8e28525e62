use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::chain::{ChainClient, ChainTxStatus, TokenMetadata};
use crate::error::WalletError;
use crate::keys::TronAddress;
use crate::tron::SignedTransfer;

/// Chain client against a TronGrid-compatible REST gateway.
///
/// Balance reads use the public account endpoint; token reads go through
/// `triggerconstantcontract` with the standard TRC20 selectors. All
/// failures surface as `WalletError::Network` so callers can degrade
/// gracefully.
#[derive(Clone)]
pub struct GridClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct AccountResponse {
    #[serde(default)]
    data: Vec<AccountData>,
}

#[derive(Deserialize)]
struct AccountData {
    #[serde(default)]
    balance: u64,
}

#[derive(Deserialize)]
struct ConstantCallResponse {
    #[serde(default)]
    constant_result: Vec<String>,
}

#[derive(Deserialize)]
struct BroadcastResponse {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    message: Option<String>,
}

impl GridClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Read-only TRC20 contract call, returning the raw ABI result words.
    async fn constant_call(
        &self,
        owner: &TronAddress,
        contract: &TronAddress,
        selector: &str,
        parameter: &str,
    ) -> Result<Vec<u8>, WalletError> {
        let url = format!("{}/wallet/triggerconstantcontract", self.base_url);
        let body = json!({
            "owner_address": owner.to_hex(),
            "contract_address": contract.to_hex(),
            "function_selector": selector,
            "parameter": parameter,
        });

        let resp: ConstantCallResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?;

        let result = resp
            .constant_result
            .first()
            .ok_or_else(|| WalletError::Network(format!("{}: empty contract result", selector)))?;

        hex::decode(result).map_err(|e| WalletError::Network(format!("{}: {}", selector, e)))
    }
}

/// Decode a uint256 ABI word as u64.
///
/// Values above `u64::MAX` are rejected rather than truncated; a
/// balance that large is a hostile or broken contract reply, and the
/// stale-flag path handles the resulting `Network` error gracefully.
fn decode_abi_uint(words: &[u8]) -> Result<u64, WalletError> {
    if words.len() < 32 {
        return Err(WalletError::Network(format!(
            "short ABI word: {} bytes",
            words.len()
        )));
    }
    if words[..24].iter().any(|&b| b != 0) {
        return Err(WalletError::Network(
            "ABI uint exceeds u64 range".to_string(),
        ));
    }
    let mut value: u64 = 0;
    for &byte in &words[24..32] {
        value = (value << 8) | byte as u64;
    }
    Ok(value)
}

/// Decode a dynamic ABI string (offset word, length word, utf8 bytes).
///
/// Offsets and lengths come straight from the RPC response, so all
/// index arithmetic is checked; a malformed reply is a `Network` error,
/// never a panic.
fn decode_abi_string(words: &[u8]) -> Result<String, WalletError> {
    let truncated = || WalletError::Network("truncated ABI string".to_string());

    let offset = usize::try_from(decode_abi_uint(words)?).map_err(|_| truncated())?;
    let len_end = offset.checked_add(32).ok_or_else(truncated)?;
    if words.len() < len_end {
        return Err(truncated());
    }

    let len = usize::try_from(decode_abi_uint(&words[offset..])?).map_err(|_| truncated())?;
    let data_end = len_end.checked_add(len).ok_or_else(truncated)?;
    if words.len() < data_end {
        return Err(truncated());
    }

    String::from_utf8(words[len_end..data_end].to_vec())
        .map_err(|e| WalletError::Network(e.to_string()))
}

/// ABI-encode an address argument: 32-byte word, 20-byte hash right-aligned.
fn encode_abi_address(address: &TronAddress) -> String {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&address.as_bytes()[1..]);
    hex::encode(word)
}

#[async_trait]
impl ChainClient for GridClient {
    async fn get_native_balance(&self, address: &TronAddress) -> Result<u64, WalletError> {
        let url = format!("{}/v1/accounts/{}", self.base_url, address);

        let resp: AccountResponse = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?;

        // An account that has never been activated has no data entry;
        // its balance is zero.
        Ok(resp.data.first().map(|a| a.balance).unwrap_or(0))
    }

    async fn get_token_balance(
        &self,
        address: &TronAddress,
        contract: &TronAddress,
    ) -> Result<u64, WalletError> {
        let result = self
            .constant_call(
                address,
                contract,
                "balanceOf(address)",
                &encode_abi_address(address),
            )
            .await?;
        decode_abi_uint(&result)
    }

    async fn get_token_metadata(
        &self,
        contract: &TronAddress,
    ) -> Result<TokenMetadata, WalletError> {
        // Metadata calls need an owner address; the zero account works for
        // constant calls.
        let owner = contract;

        let name_raw = self.constant_call(owner, contract, "name()", "").await?;
        let symbol_raw = self.constant_call(owner, contract, "symbol()", "").await?;
        let decimals_raw = self.constant_call(owner, contract, "decimals()", "").await?;

        Ok(TokenMetadata {
            name: decode_abi_string(&name_raw)?,
            symbol: decode_abi_string(&symbol_raw)?,
            decimals: decode_abi_uint(&decimals_raw)? as u8,
        })
    }

    async fn broadcast_native_transfer(
        &self,
        signed: &SignedTransfer,
    ) -> Result<String, WalletError> {
        self.broadcast(signed).await
    }

    async fn broadcast_token_transfer(
        &self,
        signed: &SignedTransfer,
    ) -> Result<String, WalletError> {
        self.broadcast(signed).await
    }

    async fn get_transaction_status(&self, txid: &str) -> Result<ChainTxStatus, WalletError> {
        let url = format!("{}/wallet/gettransactionbyid", self.base_url);

        let resp: serde_json::Value = self
            .client
            .post(&url)
            .json(&json!({ "value": txid }))
            .send()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?;

        // Nodes answer an empty object for unknown transaction ids.
        if resp.get("txID").is_none() {
            return Ok(ChainTxStatus::Unknown);
        }

        match resp["ret"][0]["contractRet"].as_str() {
            Some("SUCCESS") => Ok(ChainTxStatus::Confirmed),
            Some(_) => Ok(ChainTxStatus::Failed),
            // Known but not yet executed.
            None => Ok(ChainTxStatus::Pending),
        }
    }
}

impl GridClient {
    async fn broadcast(&self, signed: &SignedTransfer) -> Result<String, WalletError> {
        let url = format!("{}/wallet/broadcasttransaction", self.base_url);
        let body = json!({
            "txID": signed.txid,
            "raw_data_hex": hex::encode(&signed.raw),
            "signature": [signed.signature],
        });

        let resp: BroadcastResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?;

        if !resp.result {
            return Err(WalletError::Network(format!(
                "broadcast rejected: {}",
                resp.message.unwrap_or_else(|| "no message".to_string())
            )));
        }

        Ok(signed.txid.clone())
    }
}
