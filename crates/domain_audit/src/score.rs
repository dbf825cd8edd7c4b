//! Risk scoring
//!
//! Every flag contributes severity weight times rule-family weight to a
//! claim's cumulative score, and the score maps onto a band used for
//! triage ordering. The numbers rank claims for human attention; nothing
//! downstream depends on their absolute values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;

use crate::flag::AuditFlag;

/// Triage band derived from a claim's cumulative risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBand {
    /// Maps a cumulative score onto its band
    pub fn from_score(score: Decimal) -> Self {
        if score <= Decimal::ZERO {
            RiskBand::None
        } else if score <= dec!(5) {
            RiskBand::Low
        } else if score <= dec!(10) {
            RiskBand::Medium
        } else if score <= dec!(20) {
            RiskBand::High
        } else {
            RiskBand::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::None => "none",
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
            RiskBand::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cumulative risk position of one claim after a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub claim_id: ClaimId,
    pub score: Decimal,
    pub band: RiskBand,
    pub flag_count: usize,
}

impl RiskAssessment {
    /// Scores one claim from the flags raised against it
    pub fn assess<'a, I>(claim_id: ClaimId, flags: I) -> Self
    where
        I: IntoIterator<Item = &'a AuditFlag>,
    {
        let mut score = Decimal::ZERO;
        let mut flag_count = 0;
        for flag in flags {
            score += flag.score_contribution();
            flag_count += 1;
        }
        Self {
            claim_id,
            score,
            band: RiskBand::from_score(score),
            flag_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::{FlagKind, Severity};

    fn flag(kind: FlagKind, severity: Severity) -> AuditFlag {
        AuditFlag::new(ClaimId::new(), kind, severity, "test finding")
    }

    #[test]
    fn test_no_flags_is_no_risk() {
        let assessment = RiskAssessment::assess(ClaimId::new(), []);
        assert_eq!(assessment.score, Decimal::ZERO);
        assert_eq!(assessment.band, RiskBand::None);
    }

    #[test]
    fn test_single_low_flag_is_low_band() {
        // zero_cost low: 1 x 1.0 = 1.0
        let flags = [flag(FlagKind::ZeroCost, Severity::Low)];
        let assessment = RiskAssessment::assess(ClaimId::new(), flags.iter());
        assert_eq!(assessment.score, dec!(1.0));
        assert_eq!(assessment.band, RiskBand::Low);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(RiskBand::from_score(dec!(0)), RiskBand::None);
        assert_eq!(RiskBand::from_score(dec!(5)), RiskBand::Low);
        assert_eq!(RiskBand::from_score(dec!(5.1)), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(dec!(10)), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(dec!(20)), RiskBand::High);
        assert_eq!(RiskBand::from_score(dec!(20.5)), RiskBand::Critical);
    }

    #[test]
    fn test_critical_duplicate_lands_in_critical_band() {
        // critical (10) x duplicate (2.0) = 20, plus anything tips over
        let flags = [
            flag(FlagKind::Duplicate, Severity::Critical),
            flag(FlagKind::ZeroCost, Severity::Low),
        ];
        let assessment = RiskAssessment::assess(ClaimId::new(), flags.iter());
        assert_eq!(assessment.score, dec!(21.0));
        assert_eq!(assessment.band, RiskBand::Critical);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_severity() -> impl Strategy<Value = Severity> {
            prop_oneof![
                Just(Severity::Low),
                Just(Severity::Medium),
                Just(Severity::High),
                Just(Severity::Critical),
            ]
        }

        fn arb_kind() -> impl Strategy<Value = FlagKind> {
            prop_oneof![
                Just(FlagKind::Duplicate),
                Just(FlagKind::CostVariance),
                Just(FlagKind::TimeVariance),
                Just(FlagKind::Frequency),
                Just(FlagKind::DecisionMismatch),
                Just(FlagKind::ExcessiveCost),
                Just(FlagKind::ZeroCost),
            ]
        }

        fn arb_flags(max: usize) -> impl Strategy<Value = Vec<AuditFlag>> {
            prop::collection::vec(
                (arb_kind(), arb_severity())
                    .prop_map(|(kind, severity)| flag(kind, severity)),
                0..max,
            )
        }

        proptest! {
            #[test]
            fn adding_flags_never_lowers_the_score(
                base in arb_flags(10),
                extra in (arb_kind(), arb_severity()),
            ) {
                let claim_id = ClaimId::new();
                let before = RiskAssessment::assess(claim_id, base.iter());

                let mut grown = base.clone();
                grown.push(flag(extra.0, extra.1));
                let after = RiskAssessment::assess(claim_id, grown.iter());

                prop_assert!(after.score >= before.score);
                prop_assert!(after.band >= before.band);
            }

            #[test]
            fn band_is_monotone_in_score(a in 0i64..10_000, b in 0i64..10_000) {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                // Two decimal places, 0.00 through 99.99
                prop_assert!(
                    RiskBand::from_score(Decimal::new(lo, 2))
                        <= RiskBand::from_score(Decimal::new(hi, 2))
                );
            }
        }
    }
}
