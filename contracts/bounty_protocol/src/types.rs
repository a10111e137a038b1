//! # Types
//!
//! Shared data structures and protocol constants used across the contract
//! core: fixed-width addresses, UTXO references, and the layout constants
//! every consumer (codec, verifier, admission, projection) must agree on.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Number of approver keys embedded in every contract instance.
///
/// The confirm / reject / split transitions require a valid signature from
/// every one of them (threshold = all).
pub const N_APPROVERS: usize = 1;

/// Locktime values below this marker are block heights; values at or above
/// it are UNIX timestamps in seconds.
pub const LOCKTIME_BLOCK_HEIGHT_MARKER: u64 = 500_000_000;

/// An input sequence at this value disables absolute-locktime enforcement,
/// so a refund spend must use any other value.
pub const SEQUENCE_DISABLED: u64 = u64::MAX;

/// Maximum number of `(address, percentage)` pairs in a split payout.
pub const MAX_SPLIT_SHARES: usize = 5;

/// Maximum byte length of the `issue_id` / `pr_id` script fields.
pub const MAX_ID_LEN: usize = 256;

// ─────────────────────────────────────────────────────────
// Address
// ─────────────────────────────────────────────────────────

/// A fixed-width ledger address: the first 20 bytes of the SHA-256 digest
/// of an x-only public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Derive the address of a 32-byte x-only public key.
    pub fn from_pubkey(key: &[u8; 32]) -> Self {
        let digest = Sha256::digest(key);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest[..20]);
        Address(addr)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Address(arr))
    }
}

// ─────────────────────────────────────────────────────────
// UtxoRef
// ─────────────────────────────────────────────────────────

/// Stable identity of a tracked output: `(transaction id, output index)`.
///
/// Serialized on the wire as `{ "txid": "<hex>", "vout": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtxoRef {
    pub txid: [u8; 32],
    pub vout: u32,
}

impl UtxoRef {
    pub fn new(txid: [u8; 32], vout: u32) -> Self {
        Self { txid, vout }
    }

    pub fn txid_hex(&self) -> String {
        hex::encode(self.txid)
    }

    /// Parse a reference from a hex transaction id and an output index.
    pub fn parse(txid_hex: &str, vout: u32) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(txid_hex)?;
        let txid: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self { txid, vout })
    }
}

#[derive(Serialize, Deserialize)]
struct UtxoRefWire {
    txid: String,
    vout: u32,
}

impl Serialize for UtxoRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        UtxoRefWire {
            txid: self.txid_hex(),
            vout: self.vout,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UtxoRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = UtxoRefWire::deserialize(deserializer)?;
        UtxoRef::parse(&wire.txid, wire.vout)
            .map_err(|_| D::Error::custom("txid must be 32 hex-encoded bytes"))
    }
}
