/// Mnemonic/key engine
///
/// Pure key material handling: no I/O, no network, no storage access.
///
/// - `manager.rs` - mnemonic generation/import and BIP44 key derivation
/// - `address.rs` - TRON base58check addresses
pub mod address;
pub mod manager;

pub use address::TronAddress;
pub use manager::{KeyManager, SigningKey, WalletKeys};
