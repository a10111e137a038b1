//! # Spend verifier
//!
//! Evaluates the four contract transitions against the spending
//! transaction's structure.  No state is stored anywhere: every evaluation
//! recomputes the expected payout from the contract parameters and compares
//! its hash to the output hash the transaction commits to, so a spend that
//! diverts funds can never satisfy the contract.
//!
//! Any unmet precondition is a hard, typed failure; this component only
//! accepts or rejects, it never retries.

use thiserror::Error;

use crate::script::{pay_to_address_script, BountyParams};
use crate::sig::SigVerifier;
use crate::tx::{outputs_hash, Transaction, TxError, TxOutput};
use crate::types::{
    Address, LOCKTIME_BLOCK_HEIGHT_MARKER, MAX_SPLIT_SHARES, N_APPROVERS, SEQUENCE_DISABLED,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("supplied {0} key does not hash to the contract address")]
    KeyMismatch(&'static str),

    #[error("invalid {0} signature")]
    SignatureInvalid(&'static str),

    #[error("expected {expected} approver signatures, got {got}")]
    ApproverCount { expected: usize, got: usize },

    #[error("relative timelock is disabled on the spending input")]
    TimelockDisabled,

    #[error("locktime {lock_time} and deadline {deadline} are in different unit spaces")]
    LocktimeUnitMismatch { lock_time: u64, deadline: u64 },

    #[error("locktime {lock_time} is below the contract deadline {deadline}")]
    DeadlineNotReached { lock_time: u64, deadline: u64 },

    #[error("split must carry between 1 and 5 shares, got {0}")]
    ShareCount(usize),

    #[error("split percentages must sum to exactly 100, got {0}")]
    ShareSum(u32),

    #[error("claimed outputs do not match the transaction's committed output hash")]
    PayoutMismatch,
}

/// One `(address, percentage)` pair of a split payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Share {
    pub addr: Address,
    pub percent: u8,
}

/// The four transitions a locked bounty can take.  Mutually exclusive per
/// spend — the UTXO is consumed exactly once.
#[derive(Debug, Clone)]
pub enum Spend {
    /// Pay the full locked value to the contributor.
    Confirm {
        repo_owner_key: [u8; 32],
        repo_owner_sig: [u8; 64],
        approver_sigs: Vec<[u8; 64]>,
    },
    /// Pay the full locked value back to the creator.
    Reject {
        repo_owner_key: [u8; 32],
        repo_owner_sig: [u8; 64],
        approver_sigs: Vec<[u8; 64]>,
    },
    /// Creator reclaims the value after the deadline.
    Refund {
        creator_key: [u8; 32],
        creator_sig: [u8; 64],
    },
    /// Split the value across up to five addresses by percentage.
    Split {
        repo_owner_key: [u8; 32],
        repo_owner_sig: [u8; 64],
        approver_sigs: Vec<[u8; 64]>,
        shares: Vec<Share>,
    },
}

/// The slice of the spending transaction a single evaluation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendContext {
    /// Message the spend signatures commit to.
    pub sighash: [u8; 32],
    /// The transaction's committed output hash.
    pub outputs_hash: [u8; 32],
    /// Absolute locktime of the spending transaction.
    pub lock_time: u64,
    /// Sequence of the spending input; `u64::MAX` disables locktime.
    pub sequence: u64,
}

impl SpendContext {
    /// Extract the context for spending input `input_index` of `tx`.
    pub fn of_input(tx: &Transaction, input_index: usize) -> Result<Self, TxError> {
        let input = tx
            .inputs
            .get(input_index)
            .ok_or(TxError::InputIndexOutOfRange {
                index: input_index,
                len: tx.inputs.len(),
            })?;
        Ok(Self {
            sighash: tx.sighash(input_index),
            outputs_hash: tx.outputs_hash(),
            lock_time: tx.lock_time,
            sequence: input.sequence,
        })
    }
}

/// Evaluate one transition of the contract locked by `params` over `value`.
pub fn verify_spend(
    verifier: &SigVerifier,
    params: &BountyParams,
    value: u64,
    spend: &Spend,
    ctx: &SpendContext,
) -> Result<(), VerifyError> {
    match spend {
        Spend::Confirm {
            repo_owner_key,
            repo_owner_sig,
            approver_sigs,
        } => {
            check_release_sigs(verifier, params, repo_owner_key, repo_owner_sig, approver_sigs, ctx)?;
            enforce_payout(&[pay_full(value, &params.contributor_addr)], ctx)
        }
        Spend::Reject {
            repo_owner_key,
            repo_owner_sig,
            approver_sigs,
        } => {
            check_release_sigs(verifier, params, repo_owner_key, repo_owner_sig, approver_sigs, ctx)?;
            enforce_payout(&[pay_full(value, &params.creator_addr)], ctx)
        }
        Spend::Refund {
            creator_key,
            creator_sig,
        } => {
            if Address::from_pubkey(creator_key) != params.creator_addr {
                return Err(VerifyError::KeyMismatch("creator"));
            }
            if !verifier.verify(creator_key, &ctx.sighash, creator_sig) {
                return Err(VerifyError::SignatureInvalid("creator"));
            }
            check_deadline(params.deadline, ctx)?;
            enforce_payout(&[pay_full(value, &params.creator_addr)], ctx)
        }
        Spend::Split {
            repo_owner_key,
            repo_owner_sig,
            approver_sigs,
            shares,
        } => {
            check_release_sigs(verifier, params, repo_owner_key, repo_owner_sig, approver_sigs, ctx)?;
            let outputs = split_outputs(value, shares)?;
            enforce_payout(&outputs, ctx)
        }
    }
}

/// Signature requirements shared by confirm, reject, and split: the repo
/// owner plus every one of the `N_APPROVERS` approvers.
fn check_release_sigs(
    verifier: &SigVerifier,
    params: &BountyParams,
    repo_owner_key: &[u8; 32],
    repo_owner_sig: &[u8; 64],
    approver_sigs: &[[u8; 64]],
    ctx: &SpendContext,
) -> Result<(), VerifyError> {
    if Address::from_pubkey(repo_owner_key) != params.repo_owner_addr {
        return Err(VerifyError::KeyMismatch("repo owner"));
    }
    if !verifier.verify(repo_owner_key, &ctx.sighash, repo_owner_sig) {
        return Err(VerifyError::SignatureInvalid("repo owner"));
    }
    if approver_sigs.len() != N_APPROVERS {
        return Err(VerifyError::ApproverCount {
            expected: N_APPROVERS,
            got: approver_sigs.len(),
        });
    }
    for (key, sig) in params.approvers.iter().zip(approver_sigs) {
        if !verifier.verify(key, &ctx.sighash, sig) {
            return Err(VerifyError::SignatureInvalid("approver"));
        }
    }
    Ok(())
}

/// Deadline rules for a refund: the spending input's relative timelock must
/// be enabled, and the transaction's locktime must be at or past the
/// deadline in the same unit space (height vs timestamp).
fn check_deadline(deadline: u64, ctx: &SpendContext) -> Result<(), VerifyError> {
    if ctx.sequence == SEQUENCE_DISABLED {
        return Err(VerifyError::TimelockDisabled);
    }
    let lock_is_height = ctx.lock_time < LOCKTIME_BLOCK_HEIGHT_MARKER;
    let deadline_is_height = deadline < LOCKTIME_BLOCK_HEIGHT_MARKER;
    if lock_is_height != deadline_is_height {
        return Err(VerifyError::LocktimeUnitMismatch {
            lock_time: ctx.lock_time,
            deadline,
        });
    }
    if ctx.lock_time < deadline {
        return Err(VerifyError::DeadlineNotReached {
            lock_time: ctx.lock_time,
            deadline,
        });
    }
    Ok(())
}

/// Build the expected output set for a split payout.
fn split_outputs(value: u64, shares: &[Share]) -> Result<Vec<TxOutput>, VerifyError> {
    if shares.is_empty() || shares.len() > MAX_SPLIT_SHARES {
        return Err(VerifyError::ShareCount(shares.len()));
    }
    let sum: u32 = shares.iter().map(|s| u32::from(s.percent)).sum();
    if sum != 100 {
        return Err(VerifyError::ShareSum(sum));
    }
    Ok(shares
        .iter()
        .filter(|s| s.percent > 0)
        .map(|s| TxOutput {
            value: (u128::from(value) * u128::from(s.percent) / 100) as u64,
            script_pubkey: pay_to_address_script(&s.addr),
        })
        .collect())
}

fn pay_full(value: u64, addr: &Address) -> TxOutput {
    TxOutput {
        value,
        script_pubkey: pay_to_address_script(addr),
    }
}

fn enforce_payout(expected: &[TxOutput], ctx: &SpendContext) -> Result<(), VerifyError> {
    if outputs_hash(expected) != ctx.outputs_hash {
        return Err(VerifyError::PayoutMismatch);
    }
    Ok(())
}
