use std::fs;
use std::path::PathBuf;

use crate::error::StorageError;
use crate::storage::models::{Metadata, WalletState};

/// File-backed storage for non-sensitive wallet records.
///
/// Layout: one directory per wallet under the base path, holding
/// `metadata.json`, `state.json`, and the opaque `vault.json` written
/// by the credential store.
#[derive(Clone)]
pub struct Storage {
    base_path: PathBuf,
}

impl Storage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_path
    }

    fn wallet_dir(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    fn vault_path(&self, name: &str) -> PathBuf {
        self.wallet_dir(name).join("vault.json")
    }

    /// Create the directory structure for a new wallet.
    pub fn create_wallet(&self, name: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.wallet_dir(name))?;
        Ok(())
    }

    pub fn wallet_exists(&self, name: &str) -> bool {
        self.wallet_dir(name).exists()
    }

    pub fn save_metadata(&self, name: &str, meta: &Metadata) -> Result<(), StorageError> {
        let path = self.wallet_dir(name).join("metadata.json");
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_metadata(&self, name: &str) -> Result<Metadata, StorageError> {
        let path = self.wallet_dir(name).join("metadata.json");
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_state(&self, name: &str, state: &WalletState) -> Result<(), StorageError> {
        let path = self.wallet_dir(name).join("state.json");
        let json = serde_json::to_string_pretty(state)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_state(&self, name: &str) -> Result<WalletState, StorageError> {
        let path = self.wallet_dir(name).join("state.json");
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the opaque vault record. Only the credential store calls this;
    /// the bytes are already encrypted.
    pub fn write_vault(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        fs::write(self.vault_path(name), bytes)?;
        Ok(())
    }

    pub fn read_vault(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.vault_path(name);
        if !path.exists() {
            return Err(StorageError::FileNotFound(path.display().to_string()));
        }
        Ok(fs::read(path)?)
    }

    pub fn vault_exists(&self, name: &str) -> bool {
        self.vault_path(name).exists()
    }

    /// Remove the vault record. The file must actually be gone afterwards;
    /// leftover secret material is treated as an error by the caller.
    pub fn delete_vault(&self, name: &str) -> Result<(), StorageError> {
        let path = self.vault_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        if path.exists() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("vault still present after delete: {}", path.display()),
            )));
        }
        Ok(())
    }

    pub fn list_wallets(&self) -> Result<Vec<String>, StorageError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut wallets = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    wallets.push(name.to_string());
                }
            }
        }
        wallets.sort();
        Ok(wallets)
    }

    /// Delete a wallet's non-sensitive records and its directory.
    ///
    /// The vault must be deleted through the credential store first.
    pub fn delete_wallet_dir(&self, name: &str) -> Result<(), StorageError> {
        let wallet_dir = self.wallet_dir(name);
        if !wallet_dir.exists() {
            return Err(StorageError::FileNotFound(wallet_dir.display().to_string()));
        }

        log::warn!("Deleting wallet directory: {:?}", wallet_dir);
        fs::remove_dir_all(&wallet_dir)?;
        Ok(())
    }
}
