/// Wallet configuration from environment variables
///
/// Controls the TRON network, the full-node REST endpoint, and the local
/// storage directory. Defaults to mainnet against the public TronGrid
/// gateway.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Base-unit precision of the native coin (1 TRX = 1_000_000 sun).
pub const TRX_DECIMALS: u8 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TronNetwork {
    Mainnet,
    Shasta,
    Nile,
}

impl TronNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            TronNetwork::Mainnet => "mainnet",
            TronNetwork::Shasta => "shasta",
            TronNetwork::Nile => "nile",
        }
    }

    fn default_node_url(&self) -> &'static str {
        match self {
            TronNetwork::Mainnet => "https://api.trongrid.io",
            TronNetwork::Shasta => "https://api.shasta.trongrid.io",
            TronNetwork::Nile => "https://nile.trongrid.io",
        }
    }
}

#[derive(Clone, Debug)]
pub struct WalletConfig {
    /// TRON network the wallet operates on
    pub network: TronNetwork,
    /// Full-node REST endpoint (TronGrid-compatible)
    pub node_url: String,
    /// Base directory for local wallet records
    pub wallet_dir: PathBuf,
    /// Validity window for authentication proofs (mnemonic reveal)
    pub auth_window: Duration,
    /// How long to wait for a confirmation before reporting status unknown
    pub confirm_timeout: Duration,
}

impl WalletConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `TRON_NETWORK`: "mainnet" (default), "shasta", or "nile"
    /// - `TRON_NODE_URL`: full-node REST endpoint (optional, per-network default)
    /// - `WALLET_DIR`: local storage directory (default "./wallets")
    pub fn from_env() -> Self {
        let network_str = env::var("TRON_NETWORK")
            .unwrap_or_else(|_| "mainnet".to_string())
            .to_lowercase();

        let network = match network_str.as_str() {
            "shasta" => TronNetwork::Shasta,
            "nile" => TronNetwork::Nile,
            "mainnet" | "" => TronNetwork::Mainnet,
            other => {
                log::warn!("Unknown network '{}', defaulting to mainnet", other);
                TronNetwork::Mainnet
            }
        };

        let node_url = env::var("TRON_NODE_URL")
            .unwrap_or_else(|_| network.default_node_url().to_string());
        log::info!("TRON node: {} ({})", node_url, network.as_str());

        let wallet_dir = env::var("WALLET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./wallets"));

        Self {
            network,
            node_url,
            wallet_dir,
            auth_window: Duration::from_secs(60),
            confirm_timeout: Duration::from_secs(90),
        }
    }

    /// BIP44 derivation path for the wallet's single account.
    ///
    /// SLIP-44 coin type 195 is TRON. The same path is used on test
    /// networks so a phrase restores to the same address everywhere.
    pub fn derivation_path(&self) -> &'static str {
        "m/44'/195'/0'/0/0"
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: TronNetwork::Mainnet,
            node_url: "https://api.trongrid.io".to_string(),
            wallet_dir: PathBuf::from("./wallets"),
            auth_window: Duration::from_secs(60),
            confirm_timeout: Duration::from_secs(90),
        }
    }
}
