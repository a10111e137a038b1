//! Deterministic fixtures for contract tests.
//!
//! Available to downstream crates behind the `testutils` feature, mirroring
//! how the ledger tooling this crate integrates with exposes its own test
//! helpers.

use secp256k1::{Keypair, Message, Secp256k1, XOnlyPublicKey};

use crate::script::BountyParams;
use crate::sig::identity_message;
use crate::tx::{OutPoint, Transaction, TxInput, TxOutput};
use crate::types::Address;

/// Deterministic keypair from a non-zero seed byte.
pub fn keypair(seed: u8) -> (Keypair, [u8; 32]) {
    assert_ne!(seed, 0, "seed must be a valid secret scalar");
    let secp = Secp256k1::new();
    let mut sk = [0u8; 32];
    sk[31] = seed;
    let kp = Keypair::from_seckey_slice(&secp, &sk).expect("non-zero scalar below curve order");
    let (xonly, _) = XOnlyPublicKey::from_keypair(&kp);
    (kp, xonly.serialize())
}

/// Deterministic schnorr signature over a 32-byte digest.
pub fn sign(kp: &Keypair, digest: &[u8; 32]) -> [u8; 64] {
    let secp = Secp256k1::new();
    let msg = Message::from_digest(*digest);
    secp.sign_schnorr_no_aux_rand(&msg, kp).serialize()
}

/// A complete, correctly signed contract instance plus the keys behind it.
pub struct Fixture {
    pub creator_kp: Keypair,
    pub creator_pk: [u8; 32],
    pub repo_owner_kp: Keypair,
    pub repo_owner_pk: [u8; 32],
    pub contributor_pk: [u8; 32],
    pub approver_kp: Keypair,
    pub identity_kp: Keypair,
    pub params: BountyParams,
}

/// Build a valid bounty instance with fixed keys and a block-height
/// deadline of 850_000.
pub fn bounty_fixture() -> Fixture {
    let (creator_kp, creator_pk) = keypair(1);
    let (repo_owner_kp, repo_owner_pk) = keypair(2);
    let (_contributor_kp, contributor_pk) = keypair(3);
    let (approver_kp, approver_pk) = keypair(4);
    let (identity_kp, identity_pk) = keypair(5);

    let creator_signature = sign(&identity_kp, &identity_message());

    let params = BountyParams {
        creator_addr: Address::from_pubkey(&creator_pk),
        repo_owner_addr: Address::from_pubkey(&repo_owner_pk),
        contributor_addr: Address::from_pubkey(&contributor_pk),
        issue_id: b"github.com/acme/widget/issues/7".to_vec(),
        pr_id: b"github.com/acme/widget/pull/9".to_vec(),
        approvers: [approver_pk],
        deadline: 850_000,
        creator_identity_key: identity_pk,
        creator_signature,
    };

    Fixture {
        creator_kp,
        creator_pk,
        repo_owner_kp,
        repo_owner_pk,
        contributor_pk,
        approver_kp,
        identity_kp,
        params,
    }
}

/// One-input transaction spending a bounty coin into `outputs`.
pub fn spend_tx(outputs: Vec<TxOutput>, lock_time: u64, sequence: u64) -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![TxInput {
            previous_outpoint: OutPoint {
                txid: [9u8; 32],
                index: 0,
            },
            signature_script: Vec::new(),
            sequence,
        }],
        outputs,
        lock_time,
    }
}

/// Funding transaction carrying the given locking scripts as its outputs,
/// 1_000 units each.
pub fn funding_tx(scripts: Vec<Vec<u8>>) -> Transaction {
    Transaction {
        version: 1,
        inputs: vec![TxInput {
            previous_outpoint: OutPoint {
                txid: [8u8; 32],
                index: 0,
            },
            signature_script: Vec::new(),
            sequence: 0,
        }],
        outputs: scripts
            .into_iter()
            .map(|script_pubkey| TxOutput {
                value: 1_000,
                script_pubkey,
            })
            .collect(),
        lock_time: 0,
    }
}
