use thiserror::Error;

/// Error taxonomy for the wallet core.
///
/// Every error reaching the UI layer is distinguishable by variant so the
/// presentation code can pick a message without parsing free text. The
/// string payloads carry detail for logs only and never contain secret
/// material.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet already exists: {0}")]
    WalletExists(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Entropy source unavailable: {0}")]
    Entropy(String),

    #[error("Secure storage unavailable: {0}")]
    InsecureStorage(String),

    #[error("Failed to delete credential record: {0}")]
    DeleteFailed(String),

    #[error("Token already tracked: {0}")]
    DuplicateToken(String),

    #[error("Invalid token contract: {0}")]
    InvalidToken(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Transaction status unknown, check explorer: {0}")]
    UnknownTransactionStatus(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}
