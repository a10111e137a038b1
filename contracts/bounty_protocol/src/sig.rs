//! # Signature primitive
//!
//! Schnorr verification over x-only secp256k1 keys, injected into the
//! verifier and the admission gate as a stateless capability rather than
//! reached through a module-level singleton.

use secp256k1::schnorr::Signature;
use secp256k1::{Message, Secp256k1, VerifyOnly, XOnlyPublicKey};
use sha2::{Digest, Sha256};

use crate::script::BountyParams;

/// Protocol identifier the identity binding is scoped to.
pub const IDENTITY_PROTOCOL_ID: &[u8] = b"bounty";

/// Key identifier within the identity protocol.
pub const IDENTITY_KEY_ID: &[u8] = b"1";

/// The fixed message the embedded `creator_signature` commits to:
/// `sha256(protocol_id || 0x00 || key_id)`.
pub fn identity_message() -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(IDENTITY_PROTOCOL_ID);
    hasher.update([0u8]);
    hasher.update(IDENTITY_KEY_ID);
    hasher.finalize().into()
}

/// Verification-only signature checker.
///
/// Cheap to clone behind an `Arc`; holds no key material and no state
/// beyond the precomputed verification context.
pub struct SigVerifier {
    secp: Secp256k1<VerifyOnly>,
}

impl SigVerifier {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }

    /// Verify a 64-byte schnorr signature by `key` over `digest`.
    ///
    /// Malformed keys or signatures simply fail verification; there is no
    /// distinct error channel because callers treat both identically.
    pub fn verify(&self, key: &[u8; 32], digest: &[u8; 32], sig: &[u8; 64]) -> bool {
        let Ok(key) = XOnlyPublicKey::from_slice(key) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(sig) else {
            return false;
        };
        let msg = Message::from_digest(*digest);
        self.secp.verify_schnorr(&sig, &msg, &key).is_ok()
    }

    /// Check the identity binding embedded in a decoded contract: the
    /// `creator_signature` must verify against `creator_identity_key` over
    /// the fixed identity message.
    pub fn verify_identity(&self, params: &BountyParams) -> bool {
        self.verify(
            &params.creator_identity_key,
            &identity_message(),
            &params.creator_signature,
        )
    }
}

impl Default for SigVerifier {
    fn default() -> Self {
        Self::new()
    }
}
