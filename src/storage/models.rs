use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Non-sensitive wallet metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub network: String,
}

/// A TRC20 token the user has opted to watch.
///
/// `contract` uniquely identifies a token within one wallet; the session
/// rejects duplicates. Insertion order is display order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackedToken {
    pub contract: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Cached balance in the token's base units; the chain is authoritative.
    pub balance: u64,
    /// Set when the last refresh for this token failed; the cached balance
    /// is kept rather than zeroed.
    #[serde(default)]
    pub stale: bool,
}

/// User-facing settings mirrored from the settings screen.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub biometric_enabled: bool,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            biometric_enabled: false,
            notifications_enabled: true,
        }
    }
}

/// The cached, non-sensitive wallet state (`state.json`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletState {
    /// Base58check address, re-derivable from the vaulted mnemonic.
    pub address: String,
    /// Cached native balance in sun.
    pub balance: u64,
    /// Set when the last native balance refresh failed.
    #[serde(default)]
    pub balance_stale: bool,
    pub tokens: Vec<TrackedToken>,
    #[serde(default)]
    pub settings: Settings,
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl WalletState {
    pub fn new(address: String) -> Self {
        Self {
            address,
            balance: 0,
            balance_stale: false,
            tokens: Vec::new(),
            settings: Settings::default(),
            last_refreshed: None,
        }
    }

    pub fn find_token(&self, contract: &str) -> Option<&TrackedToken> {
        self.tokens.iter().find(|t| t.contract == contract)
    }
}
