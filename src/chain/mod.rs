/// Chain client abstraction
///
/// The wallet core talks to the TRON network through this minimal
/// surface and never assumes a specific RPC transport. `grid.rs`
/// provides the production implementation against a TronGrid-style
/// REST gateway; tests substitute their own mock.
pub mod grid;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::keys::TronAddress;
use crate::tron::SignedTransfer;

pub use grid::GridClient;

/// On-chain status of a transaction as reported by a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainTxStatus {
    /// The node has never seen this transaction id.
    Unknown,
    /// Accepted into the mempool or a not-yet-solid block.
    Pending,
    Confirmed,
    Failed,
}

/// TRC20 token metadata read from the contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native TRX balance in sun.
    async fn get_native_balance(&self, address: &TronAddress) -> Result<u64, WalletError>;

    /// TRC20 balance in the token's base units.
    async fn get_token_balance(
        &self,
        address: &TronAddress,
        contract: &TronAddress,
    ) -> Result<u64, WalletError>;

    async fn get_token_metadata(&self, contract: &TronAddress)
        -> Result<TokenMetadata, WalletError>;

    /// Broadcast a signed native transfer, returning the transaction id.
    async fn broadcast_native_transfer(&self, signed: &SignedTransfer)
        -> Result<String, WalletError>;

    /// Broadcast a signed TRC20 transfer, returning the transaction id.
    async fn broadcast_token_transfer(&self, signed: &SignedTransfer)
        -> Result<String, WalletError>;

    async fn get_transaction_status(&self, txid: &str) -> Result<ChainTxStatus, WalletError>;
}
