/// Local persistence
///
/// Two records per wallet, following a strict sensitivity split:
///
/// - `vault.json` - the encrypted credential record (mnemonic); only the
///   `CredentialStore` reads or writes it.
/// - `state.json` / `metadata.json` - non-sensitive data (address, token
///   list, settings) for fast UI hydration without touching the vault.
pub mod file_system;
pub mod models;
pub mod vault;

pub use file_system::Storage;
pub use models::{Metadata, Settings, TrackedToken, WalletState};
pub use vault::{CredentialStore, DeviceKeyring, SecretRecord};
