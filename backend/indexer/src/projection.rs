//! Projection of admitted bounty outputs into the queryable store.
//!
//! Three lifecycle notifications, keyed by [`UtxoRef`] and scoped by topic:
//! adds create a row, spends and removals delete it.  All three are
//! idempotent — events may be redelivered or (for different references)
//! arrive in any order, and every interleaving converges to the same state.
//! The one ordering assumption taken from the delivery layer is that an add
//! for a reference arrives before its spend.

use bounty_protocol::{BountyParams, UtxoRef};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::db;
use crate::errors::Result;
use crate::records::BountyRecord;

pub struct Projection {
    pool: SqlitePool,
    topic: String,
}

impl Projection {
    pub fn new(pool: SqlitePool, topic: impl Into<String>) -> Self {
        Self {
            pool,
            topic: topic.into(),
        }
    }

    /// An admitted output appeared on the ledger.
    ///
    /// A script that fails to decode is logged and dropped, not an error:
    /// the admission gate should have filtered it, but this component stays
    /// defensive against admission-policy drift.
    pub async fn output_added(
        &self,
        r: UtxoRef,
        script: &[u8],
        value: u64,
        topic: &str,
    ) -> Result<()> {
        if topic != self.topic {
            return Ok(());
        }
        let params = match BountyParams::decode(script) {
            Ok(params) => params,
            Err(e) => {
                warn!(
                    txid = %r.txid_hex(),
                    vout = r.vout,
                    error = %e,
                    "dropping non-decodable output"
                );
                return Ok(());
            }
        };

        let record = BountyRecord::from_params(&r, &params, value, unix_now());
        if db::insert_record(&self.pool, &record).await? {
            info!(txid = %r.txid_hex(), vout = r.vout, "tracking new bounty output");
        } else {
            debug!(txid = %r.txid_hex(), vout = r.vout, "duplicate add ignored");
        }
        Ok(())
    }

    /// A tracked output was consumed by a spend.
    pub async fn output_spent(&self, r: UtxoRef, topic: &str) -> Result<()> {
        if topic != self.topic {
            return Ok(());
        }
        if db::delete_record(&self.pool, &r.txid_hex(), i64::from(r.vout)).await? {
            info!(txid = %r.txid_hex(), vout = r.vout, "bounty output spent");
        } else {
            debug!(txid = %r.txid_hex(), vout = r.vout, "spend for untracked output ignored");
        }
        Ok(())
    }

    /// A tracked output was rolled back by a ledger reorganization.
    pub async fn output_removed(&self, r: UtxoRef, topic: &str) -> Result<()> {
        if topic != self.topic {
            return Ok(());
        }
        if db::delete_record(&self.pool, &r.txid_hex(), i64::from(r.vout)).await? {
            info!(txid = %r.txid_hex(), vout = r.vout, "bounty output rolled back");
        } else {
            debug!(txid = %r.txid_hex(), vout = r.vout, "removal for untracked output ignored");
        }
        Ok(())
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
