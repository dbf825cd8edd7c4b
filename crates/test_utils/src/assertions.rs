//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful
//! failure messages than bare `assert_eq!`.

use core_kernel::{ClaimId, Money};
use domain_audit::{AuditReport, FlagKind};
use domain_batch::{Batch, BatchStatus};

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {}",
        money
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}

/// Asserts that money values sum to a total
///
/// # Panics
///
/// Panics if any part carries a different currency or the sum does not
/// equal the total.
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = Money::sum(parts.iter(), total.currency()).expect("currency mismatch in parts");
    assert_eq!(
        sum.amount(),
        total.amount(),
        "Sum of parts ({}) does not equal total ({})",
        sum,
        total
    );
}

/// Asserts that a batch sits at the expected workflow status
pub fn assert_batch_status(batch: &Batch, expected: BatchStatus) {
    assert_eq!(
        batch.status(),
        expected,
        "Batch {} is {} but {} was expected",
        batch.batch_number(),
        batch.status(),
        expected
    );
}

/// Asserts that an audit report flagged a claim with the given kind
pub fn assert_flagged(report: &AuditReport, claim_id: ClaimId, kind: FlagKind) {
    let kinds: Vec<FlagKind> = report
        .flags_for(claim_id)
        .iter()
        .map(|flag| flag.kind)
        .collect();
    assert!(
        kinds.contains(&kind),
        "Expected a {} flag on claim {}, found {:?}",
        kind,
        claim_id,
        kinds
    );
}

/// Asserts that an audit report raised nothing against a claim
pub fn assert_clean(report: &AuditReport, claim_id: ClaimId) {
    let flags = report.flags_for(claim_id);
    assert!(
        flags.is_empty(),
        "Expected no flags on claim {}, found {:?}",
        claim_id,
        flags
    );
}
