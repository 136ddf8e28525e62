use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::WalletError;

/// Proof of a recent successful authentication.
///
/// Minted by an `AuthVerifier` after the user proves their identity
/// (passphrase, biometric, ...). The proof is opaque to the session:
/// the verifier that minted it is the only party that can accept it.
#[derive(Clone, Debug)]
pub struct AuthProof {
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

/// Pluggable authentication check for sensitive operations (mnemonic
/// reveal). Implementations must never compare against a literal
/// constant; the secret lives in a derived hash or the platform's
/// biometric service.
pub trait AuthVerifier: Send + Sync {
    /// Whether the proof is authentic, unused, and still inside the
    /// validity window. Accepting a proof consumes it.
    fn verify(&self, proof: &AuthProof, window: Duration) -> bool;
}

/// Passphrase-based verifier over an Argon2 hash.
///
/// Holds only the PHC hash string, never the passphrase. Successful
/// authentication mints a single-use `AuthProof`; the issue time is
/// recorded verifier-side so a caller cannot stretch the window by
/// forging `issued_at`.
pub struct PassphraseVerifier {
    hash: String,
    issued: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl PassphraseVerifier {
    /// Hash a passphrase at setup time.
    pub fn new(passphrase: &str) -> Result<Self, WalletError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(passphrase.as_bytes(), &salt)
            .map_err(|e| WalletError::Internal(format!("passphrase hash: {}", e)))?
            .to_string();
        Ok(Self::from_hash(hash))
    }

    /// Restore a verifier from a previously stored PHC hash string.
    pub fn from_hash(hash: String) -> Self {
        Self {
            hash,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Check a passphrase and mint a proof on success.
    pub fn authenticate(&self, passphrase: &str) -> Result<AuthProof, WalletError> {
        let parsed = PasswordHash::new(&self.hash)
            .map_err(|e| WalletError::Internal(format!("stored hash: {}", e)))?;

        Argon2::default()
            .verify_password(passphrase.as_bytes(), &parsed)
            .map_err(|_| WalletError::AuthenticationRequired)?;

        let mut token_bytes = [0u8; 16];
        use argon2::password_hash::rand_core::RngCore;
        OsRng.fill_bytes(&mut token_bytes);

        let now = Utc::now();
        let proof = AuthProof {
            token: hex::encode(token_bytes),
            issued_at: now,
        };
        self.issued
            .lock()
            .expect("auth token map poisoned")
            .insert(proof.token.clone(), now);
        Ok(proof)
    }
}

impl AuthVerifier for PassphraseVerifier {
    fn verify(&self, proof: &AuthProof, window: Duration) -> bool {
        let mut issued = self.issued.lock().expect("auth token map poisoned");
        match issued.remove(&proof.token) {
            Some(issued_at) => {
                let age = Utc::now().signed_duration_since(issued_at);
                age.to_std().map(|a| a <= window).unwrap_or(false)
            }
            None => false,
        }
    }
}
