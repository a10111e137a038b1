//! # Bounty escrow contract core
//!
//! The consensus-aligned heart of the bounty tracker.  It covers three
//! tightly coupled pieces that must agree bit-for-bit on the contract
//! encoding:
//!
//! | Piece              | Module        |
//! |--------------------|---------------|
//! | Script codec       | [`script`]    |
//! | Spend verifier     | [`verify`]    |
//! | Admission gate     | [`admission`] |
//!
//! Supporting layers: the transaction envelope codec ([`tx`]), the schnorr
//! verification capability ([`sig`]), and shared types and constants
//! ([`types`]).
//!
//! Everything here is pure and synchronous.  The projection service in
//! `backend/indexer` consumes this crate to extract indexable fields; the
//! ledger layer consumes it to validate spends.

mod cursor;

pub mod admission;
pub mod script;
pub mod sig;
pub mod tx;
pub mod types;
pub mod verify;

#[cfg(any(test, feature = "testutils"))]
pub mod testutil;

#[cfg(test)]
mod test_admission;
#[cfg(test)]
mod test_verify;

pub use admission::{admit, Admittance};
pub use script::{pay_to_address_script, BountyParams, ScriptError, SCRIPT_MAGIC, SCRIPT_VERSION};
pub use sig::{identity_message, SigVerifier};
pub use tx::{outputs_hash, sha256d, OutPoint, Transaction, TxError, TxInput, TxOutput};
pub use types::{
    Address, UtxoRef, LOCKTIME_BLOCK_HEIGHT_MARKER, MAX_ID_LEN, MAX_SPLIT_SHARES, N_APPROVERS,
    SEQUENCE_DISABLED,
};
pub use verify::{verify_spend, Share, Spend, SpendContext, VerifyError};
