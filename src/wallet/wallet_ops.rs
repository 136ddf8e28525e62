/// Wallet lifecycle operations
///
/// Handles creation, import, deletion, and mnemonic reveal.
use chrono::Utc;
use std::time::Duration;
use zeroize::Zeroizing;

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::keys::KeyManager;
use crate::storage::models::{Metadata, WalletState};
use crate::storage::vault::{CredentialStore, SecretRecord};
use crate::storage::Storage;
use crate::wallet::auth::{AuthProof, AuthVerifier};
use crate::wallet::types::{WalletInfo, WalletSummary};

/// Create a new wallet with a generated mnemonic.
///
/// The returned `WalletInfo` carries the mnemonic for the one-time
/// backup display; it is not retrievable again without authentication.
pub fn create_wallet(
    storage: &Storage,
    vault: &CredentialStore,
    config: &WalletConfig,
    name: &str,
) -> Result<WalletInfo, WalletError> {
    if storage.wallet_exists(name) {
        return Err(WalletError::WalletExists(name.to_string()));
    }

    let keys = KeyManager::generate()?;
    persist_new_wallet(storage, vault, config, name, keys)
}

/// Import a wallet from an existing mnemonic phrase.
pub fn import_wallet(
    storage: &Storage,
    vault: &CredentialStore,
    config: &WalletConfig,
    name: &str,
    phrase: &str,
) -> Result<WalletInfo, WalletError> {
    if storage.wallet_exists(name) {
        return Err(WalletError::WalletExists(name.to_string()));
    }

    let keys = KeyManager::from_mnemonic(phrase)?;
    persist_new_wallet(storage, vault, config, name, keys)
}

fn persist_new_wallet(
    storage: &Storage,
    vault: &CredentialStore,
    config: &WalletConfig,
    name: &str,
    keys: crate::keys::WalletKeys,
) -> Result<WalletInfo, WalletError> {
    let created_at = Utc::now();
    storage.create_wallet(name)?;

    // Vault first: if encryption is refused there must be no half-created
    // wallet left behind.
    let record = SecretRecord {
        mnemonic: keys.mnemonic.to_string(),
        created_at,
    };
    if let Err(e) = vault.save(name, &record) {
        let _ = storage.delete_wallet_dir(name);
        return Err(e);
    }

    storage.save_metadata(
        name,
        &Metadata {
            name: name.to_string(),
            created_at,
            network: config.network.as_str().to_string(),
        },
    )?;

    let address = keys.address.to_string();
    storage.save_state(name, &WalletState::new(address.clone()))?;

    log::info!("Wallet '{}' ready at {}", name, address);

    Ok(WalletInfo {
        name: name.to_string(),
        address,
        mnemonic: keys.mnemonic.to_string(),
    })
}

/// List all wallets with their public summaries.
pub fn list_wallets(storage: &Storage) -> Result<Vec<WalletSummary>, WalletError> {
    let mut wallets = Vec::new();
    for name in storage.list_wallets()? {
        if let (Ok(metadata), Ok(state)) = (storage.load_metadata(&name), storage.load_state(&name))
        {
            wallets.push(WalletSummary {
                name: metadata.name,
                address: state.address,
                created_at: metadata.created_at.to_rfc3339(),
            });
        }
    }
    Ok(wallets)
}

/// Delete a wallet and all its data.
///
/// The credential record goes first; if it cannot be removed the whole
/// operation aborts and nothing else is touched.
pub fn delete_wallet(
    storage: &Storage,
    vault: &CredentialStore,
    name: &str,
) -> Result<(), WalletError> {
    if !storage.wallet_exists(name) {
        return Err(WalletError::WalletNotFound(name.to_string()));
    }

    log::warn!("Deleting wallet: {}", name);
    vault.delete(name)?;
    storage.delete_wallet_dir(name)?;

    Ok(())
}

/// Reveal the mnemonic for backup, gated on a fresh authentication proof.
///
/// The proof must come from the session's pluggable verifier and be
/// inside the validity window; there is no other path to the phrase.
pub fn reveal_mnemonic(
    storage: &Storage,
    vault: &CredentialStore,
    verifier: &dyn AuthVerifier,
    window: Duration,
    name: &str,
    proof: &AuthProof,
) -> Result<Zeroizing<String>, WalletError> {
    if !storage.wallet_exists(name) {
        return Err(WalletError::WalletNotFound(name.to_string()));
    }
    if !verifier.verify(proof, window) {
        return Err(WalletError::AuthenticationRequired);
    }

    let record = vault.load(name)?;
    Ok(Zeroizing::new(record.mnemonic.clone()))
}
