//! Transaction domain model.
//!
//! # Responsibility
//! - Define the canonical transaction record persisted by the repository.
//! - Own the byte codec used to store arbitrary-precision amounts.
//!
//! # Invariants
//! - `id` is `0` until the store assigns one, and never changes afterwards.
//! - `amount` is non-negative; the codec is lossless for any magnitude.
//! - `tx_id` and `asset_id` are expected to be 32 bytes but are not validated.

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Store-assigned row identifier.
pub type TransactionRowId = i64;

/// Canonical record describing a transfer of an asset amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Auto-increment row id. `0` for records that were never persisted.
    #[serde(default)]
    pub id: TransactionRowId,
    /// Raw transaction id bytes, serialized as lowercase hex.
    #[serde(with = "hex")]
    pub tx_id: Vec<u8>,
    /// Raw asset id bytes, serialized as lowercase hex.
    #[serde(with = "hex")]
    pub asset_id: Vec<u8>,
    /// Serialized as a decimal string so any magnitude survives JSON.
    #[serde(with = "amount_decimal")]
    pub amount: BigUint,
    /// Free-form label such as `settlement`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Transaction {
    /// Creates an unsaved transaction record.
    pub fn new(
        tx_id: impl Into<Vec<u8>>,
        asset_id: impl Into<Vec<u8>>,
        amount: impl Into<BigUint>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            tx_id: tx_id.into(),
            asset_id: asset_id.into(),
            amount: amount.into(),
            kind: kind.into(),
        }
    }

    /// Returns whether the store has assigned an id to this record.
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}

/// Encodes an amount as minimal unsigned big-endian bytes.
///
/// Zero encodes to an empty byte string.
pub fn encode_amount(amount: &BigUint) -> Vec<u8> {
    if amount.bits() == 0 {
        return Vec::new();
    }
    amount.to_bytes_be()
}

/// Decodes unsigned big-endian bytes. Empty input is zero.
pub fn decode_amount(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

mod amount_decimal {
    use super::{BigUint, Deserialize, Deserializer, FromStr, Serializer};

    pub fn serialize<S: Serializer>(amount: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let text = String::deserialize(deserializer)?;
        BigUint::from_str(text.trim()).map_err(|err| {
            serde::de::Error::custom(format!("invalid amount `{text}`: {err}"))
        })
    }
}
