use bitcoin::secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;

/// TRON mainnet address version byte (base58 addresses start with 'T').
const ADDRESS_PREFIX: u8 = 0x41;

/// Raw payload length: version byte + 20-byte account hash.
const PAYLOAD_LEN: usize = 21;

/// A TRON account address.
///
/// Stored as the 21-byte raw payload (0x41 prefix + last 20 bytes of
/// Keccak-256 over the uncompressed public key coordinates). Displayed
/// and parsed as base58check.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TronAddress([u8; PAYLOAD_LEN]);

impl TronAddress {
    /// Derive the address for a secp256k1 public key.
    ///
    /// Keccak-256 is taken over the 64-byte x||y coordinates (the
    /// uncompressed SEC1 encoding without the 0x04 tag), and the last
    /// 20 bytes of the digest form the account hash.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let uncompressed = public_key.serialize_uncompressed();
        let hash = Keccak256::digest(&uncompressed[1..]);

        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = ADDRESS_PREFIX;
        payload[1..].copy_from_slice(&hash[12..32]);
        Self(payload)
    }

    /// Parse and validate a base58check address string.
    ///
    /// Rejects bad checksums, wrong version bytes, and wrong payload
    /// lengths with `WalletError::InvalidRecipient`.
    pub fn from_base58(s: &str) -> Result<Self, WalletError> {
        let decoded = bs58::decode(s)
            .with_check(Some(ADDRESS_PREFIX))
            .into_vec()
            .map_err(|e| WalletError::InvalidRecipient(format!("{}: {}", s, e)))?;

        if decoded.len() != PAYLOAD_LEN {
            return Err(WalletError::InvalidRecipient(format!(
                "{}: payload is {} bytes, expected {}",
                s,
                decoded.len(),
                PAYLOAD_LEN
            )));
        }

        let mut payload = [0u8; PAYLOAD_LEN];
        payload.copy_from_slice(&decoded);
        Ok(Self(payload))
    }

    /// Raw 21-byte payload (version byte included), hex-encoded.
    ///
    /// This is the representation TRON nodes expect inside contract
    /// call parameters and raw transactions.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.0
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).with_check().into_string())
    }
}

impl fmt::Debug for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TronAddress({})", self)
    }
}

impl FromStr for TronAddress {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for TronAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TronAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TronAddress::from_base58(&s).map_err(serde::de::Error::custom)
    }
}
