//! # Script codec
//!
//! The bounty escrow contract is carried on the ledger as a locking script
//! with a fixed binary layout.  This module is the single shared definition
//! of that layout: the verifier, the admission gate, and the projection all
//! decode through it, so encode and decode must stay exact inverses.
//!
//! ## Layout (little-endian)
//!
//! ```text
//! magic            4   b"BNTY"
//! version          1   0x01
//! creator_addr    20
//! repo_owner_addr 20
//! contributor     20
//! issue_id         2 + n   u16 length prefix
//! pr_id            2 + n   u16 length prefix
//! approvers       32 * N_APPROVERS
//! deadline         8   u64
//! identity_key    32
//! identity_sig    64
//! ```
//!
//! Trailing bytes after the signature are rejected: a script either is a
//! bounty contract byte-for-byte or it is not one at all.

use thiserror::Error;

use crate::cursor::ByteReader;
use crate::types::{Address, MAX_ID_LEN, N_APPROVERS};

/// First four bytes of every bounty locking script.
pub const SCRIPT_MAGIC: [u8; 4] = *b"BNTY";

/// Current script layout version.
pub const SCRIPT_VERSION: u8 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("script ended before field `{0}`")]
    UnexpectedEnd(&'static str),

    #[error("script does not start with the bounty magic bytes")]
    BadMagic,

    #[error("unsupported script version {0}")]
    BadVersion(u8),

    #[error("`{field}` is {len} bytes, above the {MAX_ID_LEN}-byte limit")]
    IdTooLong { field: &'static str, len: usize },

    #[error("{0} trailing bytes after the contract fields")]
    TrailingBytes(usize),
}

/// The escrow contract parameters — a transient view reconstructed from a
/// locking script on demand, never stored directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BountyParams {
    pub creator_addr: Address,
    pub repo_owner_addr: Address,
    pub contributor_addr: Address,
    /// Opaque identifier of the tracked issue (e.g. a GitHub issue URL).
    pub issue_id: Vec<u8>,
    /// Opaque identifier of the pull request resolving the issue.
    pub pr_id: Vec<u8>,
    /// X-only public keys whose signatures release or reject the bounty.
    pub approvers: [[u8; 32]; N_APPROVERS],
    /// Block height or UNIX timestamp after which the creator may refund,
    /// disambiguated by [`crate::types::LOCKTIME_BLOCK_HEIGHT_MARKER`].
    pub deadline: u64,
    /// Off-ledger identity key the instance is bound to.
    pub creator_identity_key: [u8; 32],
    /// Schnorr signature by `creator_identity_key` over the fixed identity
    /// message (see [`crate::sig::identity_message`]).
    pub creator_signature: [u8; 64],
}

impl BountyParams {
    /// Serialize the contract parameters into the fixed script layout.
    pub fn encode(&self) -> Vec<u8> {
        debug_assert!(self.issue_id.len() <= MAX_ID_LEN);
        debug_assert!(self.pr_id.len() <= MAX_ID_LEN);

        let mut out = Vec::with_capacity(
            4 + 1 + 60 + 4 + self.issue_id.len() + self.pr_id.len() + 32 * N_APPROVERS + 8 + 96,
        );
        out.extend_from_slice(&SCRIPT_MAGIC);
        out.push(SCRIPT_VERSION);
        out.extend_from_slice(&self.creator_addr.0);
        out.extend_from_slice(&self.repo_owner_addr.0);
        out.extend_from_slice(&self.contributor_addr.0);
        out.extend_from_slice(&(self.issue_id.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.issue_id);
        out.extend_from_slice(&(self.pr_id.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.pr_id);
        for approver in &self.approvers {
            out.extend_from_slice(approver);
        }
        out.extend_from_slice(&self.deadline.to_le_bytes());
        out.extend_from_slice(&self.creator_identity_key);
        out.extend_from_slice(&self.creator_signature);
        out
    }

    /// Parse a locking script back into contract parameters.
    ///
    /// Fails (never panics) on any deviation from the layout; the exact
    /// inverse of [`BountyParams::encode`] for all valid inputs.
    pub fn decode(script: &[u8]) -> Result<Self, ScriptError> {
        let mut r = ByteReader::new(script);

        let magic = r
            .array::<4>()
            .ok_or(ScriptError::UnexpectedEnd("magic"))?;
        if magic != SCRIPT_MAGIC {
            return Err(ScriptError::BadMagic);
        }
        let version = r.u8().ok_or(ScriptError::UnexpectedEnd("version"))?;
        if version != SCRIPT_VERSION {
            return Err(ScriptError::BadVersion(version));
        }

        let creator_addr = Address(
            r.array::<20>()
                .ok_or(ScriptError::UnexpectedEnd("creator_addr"))?,
        );
        let repo_owner_addr = Address(
            r.array::<20>()
                .ok_or(ScriptError::UnexpectedEnd("repo_owner_addr"))?,
        );
        let contributor_addr = Address(
            r.array::<20>()
                .ok_or(ScriptError::UnexpectedEnd("contributor_addr"))?,
        );

        let issue_id = read_id(&mut r, "issue_id")?;
        let pr_id = read_id(&mut r, "pr_id")?;

        let mut approvers = [[0u8; 32]; N_APPROVERS];
        for approver in approvers.iter_mut() {
            *approver = r
                .array::<32>()
                .ok_or(ScriptError::UnexpectedEnd("approvers"))?;
        }

        let deadline = r.u64_le().ok_or(ScriptError::UnexpectedEnd("deadline"))?;
        let creator_identity_key = r
            .array::<32>()
            .ok_or(ScriptError::UnexpectedEnd("identity_key"))?;
        let creator_signature = r
            .array::<64>()
            .ok_or(ScriptError::UnexpectedEnd("identity_sig"))?;

        if r.remaining() > 0 {
            return Err(ScriptError::TrailingBytes(r.remaining()));
        }

        Ok(Self {
            creator_addr,
            repo_owner_addr,
            contributor_addr,
            issue_id,
            pr_id,
            approvers,
            deadline,
            creator_identity_key,
            creator_signature,
        })
    }
}

fn read_id(r: &mut ByteReader<'_>, field: &'static str) -> Result<Vec<u8>, ScriptError> {
    let len = r.u16_le().ok_or(ScriptError::UnexpectedEnd(field))? as usize;
    if len > MAX_ID_LEN {
        return Err(ScriptError::IdTooLong { field, len });
    }
    let bytes = r.take(len).ok_or(ScriptError::UnexpectedEnd(field))?;
    Ok(bytes.to_vec())
}

/// Standard payment template for payout outputs:
/// `OP_DUP OP_HASH <addr20> OP_EQUALVERIFY OP_CHECKSIG`.
pub fn pay_to_address_script(addr: &Address) -> Vec<u8> {
    let mut script = Vec::with_capacity(25);
    script.extend_from_slice(&[0x76, 0xa9, 0x14]);
    script.extend_from_slice(&addr.0);
    script.extend_from_slice(&[0x88, 0xac]);
    script
}
