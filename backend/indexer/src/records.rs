//! Row types persisted by the projection.
//!
//! A [`BountyRecord`] is the flattened, hex-encoded form of a decoded
//! contract instance plus its lifecycle metadata.  It exists only for
//! outputs the admission gate accepted; the contract parameters themselves
//! stay a transient view reconstructed from the script.

use bounty_protocol::{BountyParams, UtxoRef};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a tracked bounty.
///
/// Under the current purge-on-spend policy only `active` rows exist; the
/// terminal variants are kept so a future spend classifier can transition
/// records instead of deleting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BountyStatus {
    Active,
    Completed,
    Rejected,
    Refunded,
}

impl BountyStatus {
    /// Short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Refunded => "refunded",
        }
    }
}

/// A projection row as stored in / read from the database.
///
/// Binary fields (addresses, ids, keys) are hex-encoded; `approvers` is the
/// concatenation of the hex-encoded approver keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BountyRecord {
    pub txid: String,
    pub vout: i64,
    pub creator_addr: String,
    pub repo_owner_addr: String,
    pub contributor_addr: String,
    pub issue_id: String,
    pub pr_id: String,
    pub approvers: String,
    pub deadline: i64,
    pub identity_key: String,
    pub value: i64,
    pub status: String,
    pub created_at: i64,
}

impl BountyRecord {
    /// Flatten a decoded contract instance into a fresh `active` row.
    pub fn from_params(r: &UtxoRef, params: &BountyParams, value: u64, created_at: i64) -> Self {
        Self {
            txid: r.txid_hex(),
            vout: i64::from(r.vout),
            creator_addr: params.creator_addr.to_hex(),
            repo_owner_addr: params.repo_owner_addr.to_hex(),
            contributor_addr: params.contributor_addr.to_hex(),
            issue_id: hex::encode(&params.issue_id),
            pr_id: hex::encode(&params.pr_id),
            approvers: params.approvers.iter().map(hex::encode).collect(),
            deadline: params.deadline as i64,
            identity_key: hex::encode(params.creator_identity_key),
            value: value as i64,
            status: BountyStatus::Active.as_str().to_string(),
            created_at,
        }
    }
}
