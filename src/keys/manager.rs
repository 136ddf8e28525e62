use bip39::Mnemonic;
use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::Network;
use rand::rngs::OsRng;
use rand::RngCore;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::WalletError;
use crate::keys::address::TronAddress;

/// BIP44 path for the wallet's single account (SLIP-44 coin 195 = TRON).
const DERIVATION_PATH: &str = "m/44'/195'/0'/0/0";

pub struct KeyManager;

impl KeyManager {
    /// Generate a new random wallet from fresh OS entropy.
    ///
    /// 128 bits of entropy yield a 12-word phrase, matching what the
    /// mobile onboarding flow displays for backup.
    pub fn generate() -> Result<WalletKeys, WalletError> {
        let mut entropy = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut entropy)
            .map_err(|e| WalletError::Entropy(e.to_string()))?;

        let mnemonic = Mnemonic::from_entropy(&entropy)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        entropy.zeroize();

        Self::derive_keys(mnemonic)
    }

    /// Import a wallet from an existing mnemonic phrase.
    ///
    /// Deterministic: the same phrase always yields the same address.
    pub fn from_mnemonic(words: &str) -> Result<WalletKeys, WalletError> {
        let mnemonic = Mnemonic::parse(words.trim())
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

        Self::derive_keys(mnemonic)
    }

    /// Derive the signing key and address for a mnemonic.
    ///
    /// BIP39 seed (empty passphrase) -> BIP32 master -> m/44'/195'/0'/0/0.
    /// The xprv network prefix never leaves this function, so the Bitcoin
    /// mainnet constant is used regardless of the TRON network.
    fn derive_keys(mnemonic: Mnemonic) -> Result<WalletKeys, WalletError> {
        let secp = Secp256k1::new();
        let mut seed = mnemonic.to_seed("");

        let master_key = Xpriv::new_master(Network::Bitcoin, &seed)
            .map_err(|e| WalletError::Internal(format!("master key: {}", e)))?;
        seed.zeroize();

        let path = DerivationPath::from_str(DERIVATION_PATH)
            .map_err(|e| WalletError::Internal(format!("derivation path: {}", e)))?;

        let account_key = master_key
            .derive_priv(&secp, &path)
            .map_err(|e| WalletError::Internal(format!("key derivation: {}", e)))?;

        let signing_key = SigningKey::new(account_key.private_key.secret_bytes());
        let address = TronAddress::from_public_key(&account_key.private_key.public_key(&secp));

        Ok(WalletKeys {
            mnemonic,
            signing_key,
            address,
        })
    }
}

/// Key material for one wallet, held only for the duration of a single
/// operation (creation, import, or signing).
pub struct WalletKeys {
    pub mnemonic: Mnemonic,
    pub signing_key: SigningKey,
    pub address: TronAddress,
}

impl Drop for WalletKeys {
    fn drop(&mut self) {
        self.mnemonic.zeroize();
    }
}

/// A secp256k1 secret key, zeroized when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn secret_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// No Debug/Display/Clone: the key must not leak through diagnostics.

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_derivation_is_deterministic() {
        let a = KeyManager::from_mnemonic(TEST_PHRASE).unwrap();
        let b = KeyManager::from_mnemonic(TEST_PHRASE).unwrap();
        assert_eq!(a.address, b.address);
        assert_eq!(a.signing_key.secret_bytes(), b.signing_key.secret_bytes());
    }

    #[test]
    fn test_derived_address_is_tron_format() {
        let keys = KeyManager::from_mnemonic(TEST_PHRASE).unwrap();
        let encoded = keys.address.to_string();
        assert!(encoded.starts_with('T'));
        assert_eq!(encoded.len(), 34);
    }

    #[test]
    fn test_generate_produces_valid_wallet() {
        let keys = KeyManager::generate().unwrap();
        assert_eq!(keys.mnemonic.word_count(), 12);
        // The generated phrase must re-derive to the same address.
        let reimported = KeyManager::from_mnemonic(&keys.mnemonic.to_string()).unwrap();
        assert_eq!(reimported.address, keys.address);
    }

    #[test]
    fn test_generate_never_repeats() {
        // Entropy sanity check: no two generated phrases collide.
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            let keys = KeyManager::generate().unwrap();
            assert!(seen.insert(keys.mnemonic.to_string()));
        }
    }

    // `WalletKeys` has no Debug impl, so error checks match on the
    // Result instead of unwrapping.
    #[test]
    fn test_reject_wrong_word_count() {
        assert!(matches!(
            KeyManager::from_mnemonic("abandon abandon abandon"),
            Err(WalletError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_reject_bad_checksum() {
        // 12x "abandon" has an invalid checksum ("about" is the valid last word).
        let phrase = ["abandon"; 12].join(" ");
        assert!(matches!(
            KeyManager::from_mnemonic(&phrase),
            Err(WalletError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_key_material_is_zeroizable() {
        fn assert_zeroize<T: Zeroize>() {}
        assert_zeroize::<Mnemonic>();
        assert_zeroize::<SigningKey>();
    }

    #[test]
    fn test_reject_unknown_word() {
        let phrase = "abandon abandon abandon abandon abandon abandon \
                      abandon abandon abandon abandon abandon notaword";
        assert!(KeyManager::from_mnemonic(phrase).is_err());
    }
}
