/// Wallet session module
///
/// Modular session implementation with clear separation of concerns:
///
/// - `manager.rs` - orchestrator for all wallet operations
/// - `wallet_ops.rs` - lifecycle (create, import, delete, reveal)
/// - `balance_ops.rs` - balance refresh and token tracking
/// - `auth.rs` - pluggable authentication proofs
/// - `types.rs` - public view types
pub mod auth;
pub mod balance_ops;
pub mod manager;
pub mod types;
pub mod wallet_ops;

pub use auth::{AuthProof, AuthVerifier, PassphraseVerifier};
pub use manager::WalletManager;
pub use types::{WalletInfo, WalletSummary};
