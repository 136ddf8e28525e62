use serde::{Deserialize, Serialize};

/// Public view returned by wallet creation and import.
///
/// This is the only place the mnemonic crosses the API boundary: it is
/// handed out exactly once so the UI can show the backup screen, and
/// is never part of any other view.
#[derive(Serialize, Deserialize)]
pub struct WalletInfo {
    pub name: String,
    pub address: String,
    pub mnemonic: String,
}

/// Summary row for the wallet list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletSummary {
    pub name: String,
    pub address: String,
    pub created_at: String,
}
