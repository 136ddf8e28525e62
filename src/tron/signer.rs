use bitcoin::secp256k1::{Message, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::keys::{KeyManager, TronAddress};
use crate::storage::vault::CredentialStore;
use crate::tron::transaction::{PendingTransaction, RawTransfer, SignedTransfer, TransferStatus};

/// Sign a built transfer with the wallet's key.
///
/// The mnemonic is loaded from the credential store only for the
/// duration of this call; the derived key is zeroized as soon as the
/// signature exists. Any failure to obtain the key surfaces as
/// `WalletError::Signing` and blocks the transfer.
pub fn sign_transfer(
    pending: &mut PendingTransaction,
    owner: &TronAddress,
    store: &CredentialStore,
    wallet_id: &str,
) -> Result<SignedTransfer, WalletError> {
    if pending.status != TransferStatus::Built {
        return Err(WalletError::Internal(format!(
            "cannot sign transfer in state {:?}",
            pending.status
        )));
    }

    let record = store
        .load(wallet_id)
        .map_err(|e| WalletError::Signing(format!("credential load: {}", e)))?;

    let keys = KeyManager::from_mnemonic(&record.mnemonic)
        .map_err(|e| WalletError::Signing(format!("key derivation: {}", e)))?;
    drop(record);

    // The stored mnemonic must still derive the wallet's address; a
    // mismatch means the vault and state records have diverged.
    if keys.address != *owner {
        return Err(WalletError::Signing(
            "derived address does not match wallet address".to_string(),
        ));
    }

    let raw = serde_json::to_vec(&RawTransfer::new(owner, pending))
        .map_err(|e| WalletError::Signing(e.to_string()))?;

    let digest: [u8; 32] = Sha256::digest(&raw).into();
    let txid = hex::encode(digest);

    let signature = {
        let secret = Zeroizing::new(*keys.signing_key.secret_bytes());
        let secret_key = SecretKey::from_slice(secret.as_ref())
            .map_err(|e| WalletError::Signing(e.to_string()))?;

        let secp = Secp256k1::new();
        let sig = secp.sign_ecdsa(&Message::from_digest(digest), &secret_key);
        hex::encode(sig.serialize_compact())
        // `secret` and `keys.signing_key` zeroize on drop here.
    };

    pending.advance(TransferStatus::Signed)?;
    pending.txid = Some(txid.clone());

    log::debug!("Transfer {} signed, txid {}", pending.id, txid);

    Ok(SignedTransfer {
        txid,
        raw,
        signature,
        token: pending.token,
    })
}
