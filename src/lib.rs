/// TRON Wallet Core
///
/// Key management and transaction signing core for a single-account TRON
/// wallet. The UI layer (screens, navigation) sits above this crate and
/// only consumes the `WalletManager` surface:
///
/// - `keys/` - mnemonic generation, BIP44 derivation, TRON addresses
/// - `storage/` - encrypted credential vault + non-sensitive state records
/// - `wallet/` - the wallet session: lifecycle, balances, tokens, auth
/// - `tron/` - transfer building, signing, and submission
/// - `chain/` - minimal chain client abstraction (TronGrid-style REST)
pub mod chain;
pub mod config;
pub mod error;
pub mod keys;
pub mod storage;
pub mod tron;
pub mod wallet;

pub use config::WalletConfig;
pub use error::WalletError;
pub use wallet::WalletManager;
