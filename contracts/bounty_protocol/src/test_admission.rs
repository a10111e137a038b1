//! Admission-gate tests: per-output independence, order preservation, and
//! envelope failure semantics.

use crate::admission::admit;
use crate::sig::SigVerifier;
use crate::testutil::{bounty_fixture, funding_tx, keypair, sign};
use crate::tx::TxError;
use crate::types::UtxoRef;

#[test]
fn admits_valid_output_among_garbage() {
    let fx = bounty_fixture();
    let tx = funding_tx(vec![fx.params.encode(), b"OP_RETURN junk".to_vec()]);
    let verdict = admit(&SigVerifier::new(), &tx.encode(), &[]).unwrap();
    assert_eq!(verdict.outputs_to_admit, vec![0]);
}

#[test]
fn corrupting_one_output_does_not_change_the_others_verdict() {
    let fx = bounty_fixture();
    let valid = fx.params.encode();

    let mut corrupted = valid.clone();
    let last = corrupted.len() - 1;
    corrupted[last] ^= 0xff; // breaks the identity signature

    let tx = funding_tx(vec![valid.clone(), corrupted.clone()]);
    let verdict = admit(&SigVerifier::new(), &tx.encode(), &[]).unwrap();
    assert_eq!(verdict.outputs_to_admit, vec![0]);

    let tx = funding_tx(vec![corrupted, valid]);
    let verdict = admit(&SigVerifier::new(), &tx.encode(), &[]).unwrap();
    assert_eq!(verdict.outputs_to_admit, vec![1]);
}

#[test]
fn admitted_indices_preserve_output_order() {
    let fx = bounty_fixture();
    let valid = fx.params.encode();
    let tx = funding_tx(vec![valid.clone(), b"garbage".to_vec(), valid]);
    let verdict = admit(&SigVerifier::new(), &tx.encode(), &[]).unwrap();
    assert_eq!(verdict.outputs_to_admit, vec![0, 2]);
}

#[test]
fn rejects_forged_identity_binding() {
    let fx = bounty_fixture();
    let mut params = fx.params.clone();
    // Signature from a different identity key over the right message.
    let (forger_kp, _) = keypair(12);
    params.creator_signature = sign(&forger_kp, &crate::sig::identity_message());

    let tx = funding_tx(vec![params.encode()]);
    let verdict = admit(&SigVerifier::new(), &tx.encode(), &[]).unwrap();
    assert!(verdict.outputs_to_admit.is_empty());
}

#[test]
fn no_bounty_outputs_means_empty_admission() {
    let tx = funding_tx(vec![vec![0x51], vec![]]);
    let verdict = admit(&SigVerifier::new(), &tx.encode(), &[]).unwrap();
    assert!(verdict.outputs_to_admit.is_empty());
}

#[test]
fn malformed_envelope_fails_the_whole_call() {
    let err = admit(&SigVerifier::new(), &[0x01, 0x02, 0x03], &[]).unwrap_err();
    assert!(matches!(err, TxError::UnexpectedEnd(_)));
}

#[test]
fn previous_coins_are_retained() {
    let fx = bounty_fixture();
    let prior = vec![UtxoRef::new([7u8; 32], 0), UtxoRef::new([7u8; 32], 3)];
    let tx = funding_tx(vec![fx.params.encode()]);
    let verdict = admit(&SigVerifier::new(), &tx.encode(), &prior).unwrap();
    assert_eq!(verdict.coins_to_retain, prior);
}
