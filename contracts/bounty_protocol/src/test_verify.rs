//! Spend-verifier tests: each of the four transitions, happy path and
//! every precondition failure.

use crate::script::pay_to_address_script;
use crate::sig::SigVerifier;
use crate::testutil::{bounty_fixture, keypair, sign, spend_tx};
use crate::tx::TxOutput;
use crate::types::{Address, SEQUENCE_DISABLED};
use crate::verify::{verify_spend, Share, Spend, SpendContext, VerifyError};

const VALUE: u64 = 1_000;

fn pay(value: u64, addr: &Address) -> TxOutput {
    TxOutput {
        value,
        script_pubkey: pay_to_address_script(addr),
    }
}

/// Build the spend context for a one-input transaction with `outputs`.
fn ctx_for(outputs: Vec<TxOutput>, lock_time: u64, sequence: u64) -> SpendContext {
    let tx = spend_tx(outputs, lock_time, sequence);
    SpendContext::of_input(&tx, 0).unwrap()
}

fn release_sigs(fx: &crate::testutil::Fixture, ctx: &SpendContext) -> ([u8; 64], Vec<[u8; 64]>) {
    (
        sign(&fx.repo_owner_kp, &ctx.sighash),
        vec![sign(&fx.approver_kp, &ctx.sighash)],
    )
}

// ─────────────────────────────────────────────────────────
// confirm
// ─────────────────────────────────────────────────────────

#[test]
fn confirm_pays_contributor_in_full() {
    let fx = bounty_fixture();
    let ctx = ctx_for(
        vec![pay(VALUE, &fx.params.contributor_addr)],
        0,
        0,
    );
    let (repo_owner_sig, approver_sigs) = release_sigs(&fx, &ctx);
    let spend = Spend::Confirm {
        repo_owner_key: fx.repo_owner_pk,
        repo_owner_sig,
        approver_sigs,
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Ok(())
    );
}

#[test]
fn confirm_rejects_diverted_payout() {
    let fx = bounty_fixture();
    // Pays the repo owner instead of the contributor.
    let ctx = ctx_for(vec![pay(VALUE, &fx.params.repo_owner_addr)], 0, 0);
    let (repo_owner_sig, approver_sigs) = release_sigs(&fx, &ctx);
    let spend = Spend::Confirm {
        repo_owner_key: fx.repo_owner_pk,
        repo_owner_sig,
        approver_sigs,
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::PayoutMismatch)
    );
}

#[test]
fn confirm_rejects_short_payout() {
    let fx = bounty_fixture();
    let ctx = ctx_for(vec![pay(VALUE - 1, &fx.params.contributor_addr)], 0, 0);
    let (repo_owner_sig, approver_sigs) = release_sigs(&fx, &ctx);
    let spend = Spend::Confirm {
        repo_owner_key: fx.repo_owner_pk,
        repo_owner_sig,
        approver_sigs,
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::PayoutMismatch)
    );
}

#[test]
fn confirm_rejects_wrong_repo_owner_key() {
    let fx = bounty_fixture();
    let (intruder_kp, intruder_pk) = keypair(9);
    let ctx = ctx_for(vec![pay(VALUE, &fx.params.contributor_addr)], 0, 0);
    let spend = Spend::Confirm {
        repo_owner_key: intruder_pk,
        repo_owner_sig: sign(&intruder_kp, &ctx.sighash),
        approver_sigs: vec![sign(&fx.approver_kp, &ctx.sighash)],
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::KeyMismatch("repo owner"))
    );
}

#[test]
fn confirm_rejects_bad_repo_owner_signature() {
    let fx = bounty_fixture();
    let ctx = ctx_for(vec![pay(VALUE, &fx.params.contributor_addr)], 0, 0);
    let spend = Spend::Confirm {
        repo_owner_key: fx.repo_owner_pk,
        // Signed over the wrong message.
        repo_owner_sig: sign(&fx.repo_owner_kp, &[0u8; 32]),
        approver_sigs: vec![sign(&fx.approver_kp, &ctx.sighash)],
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::SignatureInvalid("repo owner"))
    );
}

#[test]
fn confirm_rejects_bad_approver_signature() {
    let fx = bounty_fixture();
    let (stranger_kp, _) = keypair(10);
    let ctx = ctx_for(vec![pay(VALUE, &fx.params.contributor_addr)], 0, 0);
    let spend = Spend::Confirm {
        repo_owner_key: fx.repo_owner_pk,
        repo_owner_sig: sign(&fx.repo_owner_kp, &ctx.sighash),
        approver_sigs: vec![sign(&stranger_kp, &ctx.sighash)],
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::SignatureInvalid("approver"))
    );
}

#[test]
fn confirm_rejects_missing_approver_signatures() {
    let fx = bounty_fixture();
    let ctx = ctx_for(vec![pay(VALUE, &fx.params.contributor_addr)], 0, 0);
    let spend = Spend::Confirm {
        repo_owner_key: fx.repo_owner_pk,
        repo_owner_sig: sign(&fx.repo_owner_kp, &ctx.sighash),
        approver_sigs: vec![],
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::ApproverCount {
            expected: 1,
            got: 0
        })
    );
}

// ─────────────────────────────────────────────────────────
// reject
// ─────────────────────────────────────────────────────────

#[test]
fn reject_pays_creator_in_full() {
    let fx = bounty_fixture();
    let ctx = ctx_for(vec![pay(VALUE, &fx.params.creator_addr)], 0, 0);
    let (repo_owner_sig, approver_sigs) = release_sigs(&fx, &ctx);
    let spend = Spend::Reject {
        repo_owner_key: fx.repo_owner_pk,
        repo_owner_sig,
        approver_sigs,
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Ok(())
    );
}

#[test]
fn reject_must_not_pay_contributor() {
    let fx = bounty_fixture();
    let ctx = ctx_for(vec![pay(VALUE, &fx.params.contributor_addr)], 0, 0);
    let (repo_owner_sig, approver_sigs) = release_sigs(&fx, &ctx);
    let spend = Spend::Reject {
        repo_owner_key: fx.repo_owner_pk,
        repo_owner_sig,
        approver_sigs,
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::PayoutMismatch)
    );
}

// ─────────────────────────────────────────────────────────
// refund
// ─────────────────────────────────────────────────────────

fn refund_spend(fx: &crate::testutil::Fixture, ctx: &SpendContext) -> Spend {
    Spend::Refund {
        creator_key: fx.creator_pk,
        creator_sig: sign(&fx.creator_kp, &ctx.sighash),
    }
}

#[test]
fn refund_after_deadline_succeeds() {
    let fx = bounty_fixture();
    // Deadline is height 850_000; spend at 850_000 exactly.
    let ctx = ctx_for(vec![pay(VALUE, &fx.params.creator_addr)], 850_000, 0);
    let spend = refund_spend(&fx, &ctx);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Ok(())
    );
}

#[test]
fn refund_before_deadline_fails() {
    let fx = bounty_fixture();
    let ctx = ctx_for(vec![pay(VALUE, &fx.params.creator_addr)], 849_999, 0);
    let spend = refund_spend(&fx, &ctx);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::DeadlineNotReached {
            lock_time: 849_999,
            deadline: 850_000
        })
    );
}

#[test]
fn refund_with_disabled_sequence_fails() {
    let fx = bounty_fixture();
    let ctx = ctx_for(
        vec![pay(VALUE, &fx.params.creator_addr)],
        850_000,
        SEQUENCE_DISABLED,
    );
    let spend = refund_spend(&fx, &ctx);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::TimelockDisabled)
    );
}

#[test]
fn refund_rejects_locktime_unit_mismatch() {
    let fx = bounty_fixture();
    // Deadline is a block height; locktime is a UNIX timestamp.  The raw
    // comparison would pass, the unit check must not.
    let ctx = ctx_for(
        vec![pay(VALUE, &fx.params.creator_addr)],
        1_700_000_000,
        0,
    );
    let spend = refund_spend(&fx, &ctx);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::LocktimeUnitMismatch {
            lock_time: 1_700_000_000,
            deadline: 850_000
        })
    );
}

#[test]
fn refund_with_timestamp_deadline_succeeds_in_timestamp_space() {
    let fx = bounty_fixture();
    let mut params = fx.params.clone();
    params.deadline = 1_700_000_000;
    let ctx = ctx_for(vec![pay(VALUE, &params.creator_addr)], 1_700_000_001, 0);
    let spend = Spend::Refund {
        creator_key: fx.creator_pk,
        creator_sig: sign(&fx.creator_kp, &ctx.sighash),
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &params, VALUE, &spend, &ctx),
        Ok(())
    );
}

#[test]
fn refund_rejects_non_creator_key() {
    let fx = bounty_fixture();
    let (intruder_kp, intruder_pk) = keypair(11);
    let ctx = ctx_for(vec![pay(VALUE, &fx.params.creator_addr)], 850_000, 0);
    let spend = Spend::Refund {
        creator_key: intruder_pk,
        creator_sig: sign(&intruder_kp, &ctx.sighash),
    };
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::KeyMismatch("creator"))
    );
}

// ─────────────────────────────────────────────────────────
// split
// ─────────────────────────────────────────────────────────

fn share(seed: u8, percent: u8) -> Share {
    let (_, pk) = keypair(seed);
    Share {
        addr: Address::from_pubkey(&pk),
        percent,
    }
}

fn split_spend(fx: &crate::testutil::Fixture, ctx: &SpendContext, shares: Vec<Share>) -> Spend {
    let (repo_owner_sig, approver_sigs) = release_sigs(fx, ctx);
    Spend::Split {
        repo_owner_key: fx.repo_owner_pk,
        repo_owner_sig,
        approver_sigs,
        shares,
    }
}

#[test]
fn split_sixty_forty_pays_600_and_400() {
    let fx = bounty_fixture();
    let a = share(20, 60);
    let b = share(21, 40);
    let ctx = ctx_for(
        vec![pay(600, &a.addr), pay(400, &b.addr)],
        0,
        0,
    );
    let spend = split_spend(&fx, &ctx, vec![a, b]);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Ok(())
    );
}

#[test]
fn split_fails_on_amount_divergence() {
    let fx = bounty_fixture();
    let a = share(20, 60);
    let b = share(21, 40);
    // 599 + 401 also sums to the full value but diverges from the shares.
    let ctx = ctx_for(vec![pay(599, &a.addr), pay(401, &b.addr)], 0, 0);
    let spend = split_spend(&fx, &ctx, vec![a, b]);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::PayoutMismatch)
    );
}

#[test]
fn split_rejects_sum_below_100() {
    let fx = bounty_fixture();
    let shares = vec![share(20, 60), share(21, 39)];
    let ctx = ctx_for(vec![], 0, 0);
    let spend = split_spend(&fx, &ctx, shares);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::ShareSum(99))
    );
}

#[test]
fn split_rejects_sum_above_100() {
    let fx = bounty_fixture();
    let shares = vec![share(20, 60), share(21, 41)];
    let ctx = ctx_for(vec![], 0, 0);
    let spend = split_spend(&fx, &ctx, shares);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::ShareSum(101))
    );
}

#[test]
fn split_rejects_zero_or_too_many_shares() {
    let fx = bounty_fixture();
    let ctx = ctx_for(vec![], 0, 0);

    let spend = split_spend(&fx, &ctx, vec![]);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::ShareCount(0))
    );

    let six = vec![
        share(20, 50),
        share(21, 10),
        share(22, 10),
        share(23, 10),
        share(24, 10),
        share(25, 10),
    ];
    let spend = split_spend(&fx, &ctx, six);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Err(VerifyError::ShareCount(6))
    );
}

#[test]
fn split_skips_zero_percent_shares() {
    let fx = bounty_fixture();
    let a = share(20, 100);
    let b = share(21, 0);
    // Only one output expected: the zero-percent share produces none.
    let ctx = ctx_for(vec![pay(VALUE, &a.addr)], 0, 0);
    let spend = split_spend(&fx, &ctx, vec![a, b]);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Ok(())
    );
}

#[test]
fn split_amounts_are_floored() {
    let fx = bounty_fixture();
    let a = share(20, 33);
    let b = share(21, 67);
    // floor(1000 * 33 / 100) = 330, floor(1000 * 67 / 100) = 670.
    let ctx = ctx_for(vec![pay(330, &a.addr), pay(670, &b.addr)], 0, 0);
    let spend = split_spend(&fx, &ctx, vec![a, b]);
    assert_eq!(
        verify_spend(&SigVerifier::new(), &fx.params, VALUE, &spend, &ctx),
        Ok(())
    );
}
