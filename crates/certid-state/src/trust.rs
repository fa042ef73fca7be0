//! TrustScoring: the pure, deterministic scoring function of spec §4.5,
//! overridden by the integer-cents fee term of §9's Design Notes (the only
//! near-float computation in the formula, and it must floor after integer
//! arithmetic rather than carry a float through).

use certid_core::{
    Addr, CertIdError, Height, Timestamp, FEE_BURNED_CAP_CENTS, FEE_TERM_MAX, HARDWARE_TERM_MAX,
    HIGH_TRUST_DEVICE_SCORE_THRESHOLD, MAX_TRUST_SCORE, ONCHAIN_AGE_BONUS_MONTHS,
    ONCHAIN_AGE_POINTS, ONCHAIN_TX_COUNT_BONUS, ONCHAIN_TX_POINTS, SOCIAL_ACCOUNTS_CAP,
    SOCIAL_POINTS_PER_ACCOUNT, VERIFIED_HUMANITY_THRESHOLD,
};

use crate::db::StateDb;
use crate::records::{ScoreComponents, TrustScoreResult};

/// Snapshots a submitted score as the latest `TrustScoreResult` for
/// `address` (spec §3, §4.5 "scores are stored keyed by address and
/// overwritten on each computation"). `UpdateTrustScore` only carries the
/// final `score` (spec §6's interface table), never the factor breakdown
/// `compute_trust_score` consumes — that computation happens off-chain, in
/// whichever oracle produced the score — so `components`/`sybil_multiplier`
/// are recorded at their neutral defaults rather than fabricated on-chain.
pub fn record_trust_score(
    db: &StateDb,
    address: Addr,
    score: u8,
    time: Timestamp,
) -> Result<(), CertIdError> {
    db.put_trust_result(&TrustScoreResult {
        address,
        score,
        components: ScoreComponents::default(),
        sybil_multiplier: 1.0,
        is_verified_human: score >= VERIFIED_HUMANITY_THRESHOLD,
        computed_at: time,
    })
}

/// `GetTrustScore(address)` (spec §6): the latest stored `TrustScoreResult`,
/// if any `UpdateTrustScore` has ever been applied for `address`.
pub fn get_trust_score(db: &StateDb, address: &Addr) -> Result<TrustScoreResult, CertIdError> {
    db.get_trust_result(address)?
        .ok_or_else(|| CertIdError::TrustScoreNotFound(address.to_b58()))
}

/// Inputs to the pure scoring function. An oracle (or test) computes a
/// `TrustScoreResult` from these off-chain/inline; the on-chain
/// `UpdateTrustScore` handler only ever receives the resulting `score` — it
/// never re-derives it from these factors.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreInputs {
    pub linked_device_score: u32,
    pub linked_device_shared_accounts: u32,
    pub verified_social_accounts: u32,
    pub account_age_months: u32,
    pub transaction_count: u64,
    pub total_fees_burned_cents: u64,
}

/// Computes a `TrustScoreResult` from `inputs`. Integer arithmetic
/// throughout — the fee term is floored, never carried as a float, per the
/// Design Notes override of the formula's USD presentation.
pub fn compute_trust_score(
    address: Addr,
    inputs: ScoreInputs,
    height: Height,
    time: Timestamp,
) -> TrustScoreResult {
    let hardware = if inputs.linked_device_score >= HIGH_TRUST_DEVICE_SCORE_THRESHOLD {
        (HARDWARE_TERM_MAX as u32 / inputs.linked_device_shared_accounts.max(1)) as u8
    } else {
        0
    };

    let social = (inputs.verified_social_accounts.min(SOCIAL_ACCOUNTS_CAP)
        * SOCIAL_POINTS_PER_ACCOUNT as u32) as u8;

    let onchain = (if inputs.account_age_months >= ONCHAIN_AGE_BONUS_MONTHS {
        ONCHAIN_AGE_POINTS
    } else {
        0
    }) + (if inputs.transaction_count >= ONCHAIN_TX_COUNT_BONUS {
        ONCHAIN_TX_POINTS
    } else {
        0
    });

    let fee = if inputs.total_fees_burned_cents >= FEE_BURNED_CAP_CENTS {
        FEE_TERM_MAX
    } else {
        (inputs.total_fees_burned_cents * FEE_TERM_MAX as u64 / FEE_BURNED_CAP_CENTS) as u8
    };

    let score = (hardware as u32 + social as u32 + onchain as u32 + fee as u32)
        .min(MAX_TRUST_SCORE as u32) as u8;

    TrustScoreResult {
        address,
        score,
        components: ScoreComponents { hardware, social, onchain, fee },
        sybil_multiplier: 1.0,
        is_verified_human: score >= VERIFIED_HUMANITY_THRESHOLD,
        computed_at: time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_scenario_e5() {
        let alice = Addr::from_bytes([1u8; 20]);
        let inputs = ScoreInputs {
            linked_device_score: 90,
            linked_device_shared_accounts: 2,
            verified_social_accounts: 2,
            account_age_months: 7,
            transaction_count: 10,
            total_fees_burned_cents: 500,
        };
        let result = compute_trust_score(alice, inputs, 1, 1000);
        assert_eq!(result.components.hardware, 20);
        assert_eq!(result.components.social, 20);
        assert_eq!(result.components.onchain, 20);
        assert_eq!(result.components.fee, 5);
        assert_eq!(result.score, 65);
        assert!(result.is_verified_human);
    }

    #[test]
    fn score_never_exceeds_cap() {
        let alice = Addr::from_bytes([2u8; 20]);
        let inputs = ScoreInputs {
            linked_device_score: 100,
            linked_device_shared_accounts: 1,
            verified_social_accounts: 10,
            account_age_months: 24,
            transaction_count: 100,
            total_fees_burned_cents: 5_000,
        };
        let result = compute_trust_score(alice, inputs, 1, 1000);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn fee_term_floors_below_cap() {
        let alice = Addr::from_bytes([3u8; 20]);
        let inputs = ScoreInputs {
            total_fees_burned_cents: 250,
            ..Default::default()
        };
        let result = compute_trust_score(alice, inputs, 1, 1000);
        assert_eq!(result.components.fee, 2);
    }

    #[test]
    fn is_pure_given_identical_inputs() {
        let alice = Addr::from_bytes([4u8; 20]);
        let inputs = ScoreInputs {
            linked_device_score: 50,
            linked_device_shared_accounts: 3,
            verified_social_accounts: 1,
            account_age_months: 3,
            transaction_count: 2,
            total_fees_burned_cents: 0,
        };
        let a = compute_trust_score(alice.clone(), inputs, 5, 5000);
        let b = compute_trust_score(alice, inputs, 5, 5000);
        assert_eq!(a.score, b.score);
        assert_eq!(a.components.hardware, b.components.hardware);
    }
}
