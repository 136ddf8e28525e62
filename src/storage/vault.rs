use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{StorageError, WalletError};
use crate::storage::file_system::Storage;

/// Source of the data-encryption key, backed by the platform keystore.
///
/// On device this wraps the hardware-backed keystore (Secure Enclave,
/// StrongBox, ...). If the platform cannot provide hardware backing the
/// store refuses to persist secrets rather than silently downgrading
/// to a software key.
pub trait DeviceKeyring: Send + Sync {
    /// Whether the key material lives in hardware-backed storage.
    fn hardware_backed(&self) -> bool;

    /// The 32-byte data-encryption key for vault records.
    fn data_key(&self) -> Result<[u8; 32], WalletError>;
}

/// The decrypted credential record. Zeroized on drop; never logged.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretRecord {
    pub mnemonic: String,
    #[zeroize(skip)]
    pub created_at: DateTime<Utc>,
}

/// On-disk envelope: AEAD nonce + ciphertext, both hex.
#[derive(Serialize, Deserialize)]
struct VaultEnvelope {
    nonce: String,
    ciphertext: String,
}

/// Encrypted-at-rest store for wallet credentials.
///
/// One `vault.json` per wallet, sealed with XChaCha20-Poly1305 under the
/// keyring's data-encryption key. Save/delete for the same wallet are
/// serialized by the session's store lock.
pub struct CredentialStore {
    storage: Storage,
    keyring: Arc<dyn DeviceKeyring>,
}

impl CredentialStore {
    pub fn new(storage: Storage, keyring: Arc<dyn DeviceKeyring>) -> Self {
        Self { storage, keyring }
    }

    fn cipher(&self) -> Result<XChaCha20Poly1305, WalletError> {
        let mut key_bytes = self.keyring.data_key()?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key_bytes));
        key_bytes.zeroize();
        Ok(cipher)
    }

    /// Encrypt and persist the credential record for a wallet.
    ///
    /// Fails with `InsecureStorage` when the keyring is not hardware
    /// backed; there is no plaintext fallback.
    pub fn save(&self, wallet_id: &str, record: &SecretRecord) -> Result<(), WalletError> {
        if !self.keyring.hardware_backed() {
            return Err(WalletError::InsecureStorage(
                "platform keystore is not hardware-backed".to_string(),
            ));
        }

        let plaintext = Zeroizing::new(
            serde_json::to_vec(record).map_err(|e| StorageError::Json(e))?,
        );

        let mut nonce_bytes = [0u8; 24];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = XNonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()?
            .encrypt(nonce, plaintext.as_slice())
            .map_err(|_| StorageError::Crypto("vault encryption failed".to_string()))?;

        let envelope = VaultEnvelope {
            nonce: hex::encode(nonce_bytes),
            ciphertext: hex::encode(ciphertext),
        };
        let bytes = serde_json::to_vec_pretty(&envelope).map_err(StorageError::Json)?;
        self.storage.write_vault(wallet_id, &bytes)?;

        log::debug!("Credential record saved for wallet '{}'", wallet_id);
        Ok(())
    }

    /// Load and decrypt the credential record.
    pub fn load(&self, wallet_id: &str) -> Result<SecretRecord, WalletError> {
        let bytes = self.storage.read_vault(wallet_id)?;
        let envelope: VaultEnvelope =
            serde_json::from_slice(&bytes).map_err(StorageError::Json)?;

        let nonce_bytes = hex::decode(&envelope.nonce)
            .map_err(|e| StorageError::Crypto(format!("vault nonce: {}", e)))?;
        if nonce_bytes.len() != 24 {
            return Err(StorageError::Crypto("vault nonce length".to_string()).into());
        }
        let ciphertext = hex::decode(&envelope.ciphertext)
            .map_err(|e| StorageError::Crypto(format!("vault ciphertext: {}", e)))?;

        let plaintext = Zeroizing::new(
            self.cipher()?
                .decrypt(XNonce::from_slice(&nonce_bytes), ciphertext.as_slice())
                .map_err(|_| StorageError::Crypto("vault decryption failed".to_string()))?,
        );

        let record: SecretRecord =
            serde_json::from_slice(&plaintext).map_err(StorageError::Json)?;
        Ok(record)
    }

    pub fn exists(&self, wallet_id: &str) -> bool {
        self.storage.vault_exists(wallet_id)
    }

    /// Irreversibly remove the credential record.
    ///
    /// A failed delete that leaves secret material behind is a
    /// security-relevant error, not a warning.
    pub fn delete(&self, wallet_id: &str) -> Result<(), WalletError> {
        self.storage
            .delete_vault(wallet_id)
            .map_err(|e| WalletError::DeleteFailed(e.to_string()))?;
        log::info!("Credential record deleted for wallet '{}'", wallet_id);
        Ok(())
    }
}
