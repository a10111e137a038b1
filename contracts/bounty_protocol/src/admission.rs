//! # Admission gate
//!
//! Decides, per output of a candidate transaction, whether it is a
//! well-formed, identity-bound instance of the bounty contract.  A failure
//! on one output never aborts evaluation of the rest — partial admission
//! within a single transaction is expected and correct.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::script::BountyParams;
use crate::sig::SigVerifier;
use crate::tx::{Transaction, TxError};
use crate::types::UtxoRef;

/// Verdict for one transaction: which outputs enter the tracked set, and
/// which previously tracked coins stay in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admittance {
    pub outputs_to_admit: Vec<u32>,
    pub coins_to_retain: Vec<UtxoRef>,
}

/// Evaluate every output of `tx_bytes` against the contract rules.
///
/// An output is admitted iff its locking script decodes under the fixed
/// layout and the embedded identity binding verifies.  `outputs_to_admit`
/// preserves the transaction's output order; consumers rely on positional
/// correspondence.
///
/// A transaction envelope that does not parse fails the whole call — that
/// is a malformed input, not a per-output policy decision.
pub fn admit(
    verifier: &SigVerifier,
    tx_bytes: &[u8],
    previous_coins: &[UtxoRef],
) -> Result<Admittance, TxError> {
    let tx = Transaction::decode(tx_bytes)?;
    let txid = hex::encode(tx.txid());

    let mut outputs_to_admit = Vec::new();
    for (vout, output) in tx.outputs.iter().enumerate() {
        let params = match BountyParams::decode(&output.script_pubkey) {
            Ok(params) => params,
            Err(e) => {
                debug!(%txid, vout, error = %e, "output is not a bounty script");
                continue;
            }
        };
        if !verifier.verify_identity(&params) {
            debug!(%txid, vout, "identity binding failed verification");
            continue;
        }
        outputs_to_admit.push(vout as u32);
    }

    // Previously admitted coins remain valid instances; keep them tracked.
    Ok(Admittance {
        outputs_to_admit,
        coins_to_retain: previous_coins.to_vec(),
    })
}
