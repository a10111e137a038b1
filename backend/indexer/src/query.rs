//! Lookup protocol — a tagged union of query shapes routed against the
//! projection.
//!
//! A request body that matches no variant never reaches this module: the
//! API layer maps the serde failure to [`IndexerError::InvalidQuery`].
//! A `by_ref` miss is an explicit [`LookupAnswer::NotFound`], distinct from
//! a query error.

use bounty_protocol::UtxoRef;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db;
use crate::errors::{IndexerError, Result};
use crate::records::{BountyRecord, BountyStatus};

/// Identifier of this lookup service; questions for any other service are
/// rejected as invalid.
pub const SERVICE_ID: &str = "ls_bounty";

#[derive(Debug, Clone, Deserialize)]
pub struct LookupQuestion {
    pub service: String,
    pub query: Query,
}

/// Every question the lookup service answers.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    /// All currently tracked (unspent) bounties.
    AllActive,
    /// Bounties in the given lifecycle status.
    ByStatus { status: BountyStatus },
    /// Bounties attached to one issue (hex-encoded id).
    ByIssue { issue_id: String },
    /// Bounties attached to one pull request (hex-encoded id).
    ByPr { pr_id: String },
    /// Bounties bound to one creator identity key (hex).
    ByIdentity { identity_key: String },
    /// Bounties whose repository owner is `addr` (hex).
    ByRepoOwner { addr: String },
    /// Bounties paying out to contributor `addr` (hex).
    ByContributor { addr: String },
    /// The full record behind one exact reference.
    ByRef { txid: String, vout: u32 },
    /// Bounties whose deadline is at or before `cursor` (the caller picks
    /// the unit space — block height or timestamp — it queries in).
    ExpiringBy { cursor: u64 },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupAnswer {
    Refs { refs: Vec<UtxoRef> },
    Record { record: BountyRecord },
    NotFound,
}

/// Answer one lookup question against the store.
pub async fn lookup(pool: &SqlitePool, question: &LookupQuestion) -> Result<LookupAnswer> {
    if question.service != SERVICE_ID {
        return Err(IndexerError::InvalidQuery(format!(
            "unknown service `{}`",
            question.service
        )));
    }

    let rows = match &question.query {
        Query::AllActive => db::refs_by_status(pool, BountyStatus::Active.as_str()).await?,
        Query::ByStatus { status } => db::refs_by_status(pool, status.as_str()).await?,
        Query::ByIssue { issue_id } => db::refs_by_issue(pool, issue_id).await?,
        Query::ByPr { pr_id } => db::refs_by_pr(pool, pr_id).await?,
        Query::ByIdentity { identity_key } => db::refs_by_identity(pool, identity_key).await?,
        Query::ByRepoOwner { addr } => db::refs_by_repo_owner(pool, addr).await?,
        Query::ByContributor { addr } => db::refs_by_contributor(pool, addr).await?,
        Query::ExpiringBy { cursor } => db::refs_expiring_by(pool, *cursor as i64).await?,
        Query::ByRef { txid, vout } => {
            return match db::get_record(pool, txid, i64::from(*vout)).await? {
                Some(record) => Ok(LookupAnswer::Record { record }),
                None => Ok(LookupAnswer::NotFound),
            };
        }
    };

    let refs = rows
        .into_iter()
        .map(|(txid, vout)| {
            UtxoRef::parse(&txid, vout as u32)
                .map_err(|_| IndexerError::Record(format!("bad txid in store: {txid}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LookupAnswer::Refs { refs })
}
