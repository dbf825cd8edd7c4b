//! Comprehensive tests for domain_audit

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Actor, BatchId, ClaimId, FacilityId, Money};
use domain_claims::{CareType, Decision};

use domain_audit::config::AuditConfig;
use domain_audit::engine::AuditEngine;
use domain_audit::flag::{FlagKind, Severity};
use domain_audit::log::{ErrorLogEntry, ResolutionStatus};
use domain_audit::snapshot::ClaimSnapshot;

fn engine() -> AuditEngine {
    AuditEngine::default()
}

fn snapshot(beneficiary: &str, diagnosis: &str, amount: Decimal) -> ClaimSnapshot {
    ClaimSnapshot {
        claim_id: ClaimId::new(),
        batch_id: BatchId::new(),
        facility_id: FacilityId::new(),
        beneficiary_id: beneficiary.to_string(),
        beneficiary_name: format!("{} surname", beneficiary),
        nin: None,
        phone: None,
        primary_diagnosis: diagnosis.to_string(),
        treatment_description: "standard care protocol".to_string(),
        care_type: CareType::Inpatient,
        admission_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        treatment_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        discharge_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        total_cost: Money::ngn(amount),
        approved_cost: None,
        decision: Decision::Pending,
        submitted_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
    }
}

/// Shifts the encounter onto a new admission date, keeping the stay length
fn admitted_on(mut claim: ClaimSnapshot, date: NaiveDate) -> ClaimSnapshot {
    let stay = claim.discharge_date - claim.admission_date;
    claim.admission_date = date;
    claim.treatment_date = date;
    claim.discharge_date = date + stay;
    claim
}

// ============================================================================
// Duplicate Tests
// ============================================================================

mod duplicate_tests {
    use super::*;

    #[test]
    fn test_repeat_within_ten_days_flags_high() {
        let first = snapshot("BEN-001", "Malaria", dec!(50000));
        let repeat = admitted_on(
            snapshot("BEN-001", "Malaria", dec!(50000)),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
        );
        let (first_id, repeat_id) = (first.claim_id, repeat.claim_id);

        let report = engine().run(&[first, repeat]);

        let flags = report.flags_for(repeat_id);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].kind, FlagKind::Duplicate);
        assert_eq!(flags[0].severity, Severity::High);
        assert_eq!(flags[0].related_claim_id, Some(first_id));
        assert!(report.flags_for(first_id).is_empty());
    }

    #[test]
    fn test_repeat_after_fortyfive_days_not_flagged() {
        let first = snapshot("BEN-001", "Malaria", dec!(50000));
        let repeat = admitted_on(
            snapshot("BEN-001", "Malaria", dec!(50000)),
            NaiveDate::from_ymd_opt(2024, 4, 15).unwrap(),
        );

        let report = engine().run(&[first, repeat]);

        assert!(report.is_clean());
    }

    #[test]
    fn test_chain_of_repeats_flags_each_later_claim() {
        // lift the frequency limit so only the duplicate rule speaks
        let config = AuditConfig {
            beneficiary_diagnosis_claim_limit: 5,
            ..AuditConfig::default()
        };
        let engine = AuditEngine::new(config);

        let first = snapshot("BEN-001", "Malaria", dec!(50000));
        let second = admitted_on(
            snapshot("BEN-001", "Malaria", dec!(50000)),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
        );
        let third = admitted_on(
            snapshot("BEN-001", "Malaria", dec!(50000)),
            NaiveDate::from_ymd_opt(2024, 3, 21).unwrap(),
        );
        let ids = (first.claim_id, second.claim_id, third.claim_id);

        let report = engine.run(&[first, second, third]);

        assert!(report.flags_for(ids.0).is_empty());
        assert_eq!(report.flags_for(ids.1)[0].related_claim_id, Some(ids.0));
        assert_eq!(report.flags_for(ids.2)[0].related_claim_id, Some(ids.1));
        assert_eq!(report.by_kind.get(&FlagKind::Duplicate), Some(&2));
    }

    #[test]
    fn test_shared_phone_flags_medium() {
        let mut a = snapshot("BEN-001", "Malaria", dec!(50000));
        a.beneficiary_name = "Ada Obi".to_string();
        a.phone = Some("08031234567".to_string());
        let mut b = snapshot("BEN-002", "Typhoid", dec!(60000));
        b.beneficiary_name = "Chinedu Eze".to_string();
        b.phone = Some("08031234567".to_string());

        let report = engine().run(&[a.clone(), b.clone()]);

        for claim_id in [a.claim_id, b.claim_id] {
            let flags = report.flags_for(claim_id);
            assert_eq!(flags.len(), 1);
            assert_eq!(flags[0].kind, FlagKind::Duplicate);
            assert_eq!(flags[0].severity, Severity::Medium);
        }
    }

    #[test]
    fn test_identifier_shared_under_one_name_not_flagged() {
        // the same person appearing twice is not an identity clash
        let mut a = snapshot("BEN-001", "Malaria", dec!(50000));
        a.beneficiary_name = "Ada Obi".to_string();
        a.nin = Some("12345678901".to_string());
        let mut b = snapshot("BEN-002", "Typhoid", dec!(60000));
        b.beneficiary_name = "ada obi".to_string();
        b.nin = Some("12345678901".to_string());

        let report = engine().run(&[a, b]);

        assert!(report.is_clean());
    }
}

// ============================================================================
// Variance Tests
// ============================================================================

mod variance_tests {
    use super::*;

    #[test]
    fn test_outlier_above_peer_mean_flags_high() {
        let claims = vec![
            snapshot("BEN-001", "post surgical care", dec!(20000)),
            snapshot("BEN-002", "post surgical care", dec!(20000)),
            snapshot("BEN-003", "post surgical care", dec!(20000)),
            snapshot("BEN-004", "post surgical care", dec!(60000)),
        ];
        let outlier_id = claims[3].claim_id;

        let report = engine().run(&claims);

        // mean 30000: the outlier sits 100% above, the rest 33% below
        let variance: Vec<_> = report
            .flags
            .iter()
            .filter(|flag| flag.kind == FlagKind::CostVariance)
            .collect();
        assert_eq!(variance.len(), 1);
        assert_eq!(variance[0].claim_id, outlier_id);
        assert_eq!(variance[0].severity, Severity::High);
    }

    #[test]
    fn test_outlier_below_peer_mean_flags_medium() {
        let claims = vec![
            snapshot("BEN-001", "post surgical care", dec!(100000)),
            snapshot("BEN-002", "post surgical care", dec!(100000)),
            snapshot("BEN-003", "post surgical care", dec!(100000)),
            snapshot("BEN-004", "post surgical care", dec!(10000)),
        ];
        let low_id = claims[3].claim_id;

        let report = engine().run(&claims);

        let variance: Vec<_> = report
            .flags
            .iter()
            .filter(|flag| flag.kind == FlagKind::CostVariance)
            .collect();
        assert_eq!(variance.len(), 1);
        assert_eq!(variance[0].claim_id, low_id);
        assert_eq!(variance[0].severity, Severity::Medium);
    }

    #[test]
    fn test_peer_groups_split_by_procedure() {
        let mut wild = snapshot("BEN-003", "post surgical care", dec!(200000));
        wild.treatment_description = "full surgical revision".to_string();
        let claims = vec![
            snapshot("BEN-001", "post surgical care", dec!(20000)),
            snapshot("BEN-002", "post surgical care", dec!(20000)),
            wild,
        ];

        // the expensive claim has no peers on its procedure, so no
        // variance comparison happens
        let report = engine().run(&claims);
        assert!(report.is_clean());
    }

    #[test]
    fn test_treatment_before_admission_flags_high() {
        let mut claim = snapshot("BEN-001", "fracture care", dec!(50000));
        claim.treatment_date = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();

        let report = engine().run(&[claim.clone()]);

        let flags = report.flags_for(claim.claim_id);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].kind, FlagKind::TimeVariance);
        assert_eq!(flags[0].severity, Severity::High);
    }

    #[test]
    fn test_discharge_before_admission_flags_high() {
        let mut claim = snapshot("BEN-001", "fracture care", dec!(50000));
        claim.discharge_date = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();

        let report = engine().run(&[claim.clone()]);

        let flags = report.flags_for(claim.claim_id);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].kind, FlagKind::TimeVariance);
        assert_eq!(flags[0].severity, Severity::High);
    }

    #[test]
    fn test_outpatient_stay_limit_boundary() {
        let mut at_limit = snapshot("BEN-001", "asthma", dec!(30000));
        at_limit.care_type = CareType::Outpatient;
        at_limit.discharge_date = at_limit.admission_date + Duration::days(7);
        assert!(engine().run(&[at_limit]).is_clean());

        let mut over = snapshot("BEN-002", "asthma", dec!(30000));
        over.care_type = CareType::Outpatient;
        over.discharge_date = over.admission_date + Duration::days(8);

        let report = engine().run(&[over.clone()]);
        let flags = report.flags_for(over.claim_id);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].kind, FlagKind::TimeVariance);
        assert_eq!(flags[0].severity, Severity::Medium);
    }

    #[test]
    fn test_long_inpatient_stay_is_allowed() {
        let mut claim = snapshot("BEN-001", "fracture care", dec!(120000));
        claim.discharge_date = claim.admission_date + Duration::days(20);

        assert!(engine().run(&[claim]).is_clean());
    }
}

// ============================================================================
// Frequency Tests
// ============================================================================

mod frequency_tests {
    use super::*;

    #[test]
    fn test_facility_burst_counts_on_local_calendar_date() {
        let facility = FacilityId::new();

        // six claims late on the 5th UTC and six early on the 6th UTC
        // all land on the 6th in Lagos, crossing the daily limit
        let mut claims = Vec::new();
        for n in 0..6 {
            let mut claim = snapshot(
                &format!("BEN-{:03}", n),
                &format!("evening condition {}", n),
                dec!(20000),
            );
            claim.facility_id = facility;
            claim.submitted_at = Utc.with_ymd_and_hms(2024, 3, 5, 23, 30, 0).unwrap();
            claims.push(claim);
        }
        for n in 6..12 {
            let mut claim = snapshot(
                &format!("BEN-{:03}", n),
                &format!("morning condition {}", n),
                dec!(20000),
            );
            claim.facility_id = facility;
            claim.submitted_at = Utc.with_ymd_and_hms(2024, 3, 6, 0, 30, 0).unwrap();
            claims.push(claim);
        }

        let report = engine().run(&claims);

        assert_eq!(report.by_kind.get(&FlagKind::Frequency), Some(&12));
        for claim in &claims {
            let flags = report.flags_for(claim.claim_id);
            assert_eq!(flags.len(), 1);
            assert_eq!(flags[0].severity, Severity::Medium);
        }
    }

    #[test]
    fn test_beneficiary_repeat_diagnosis_flags_high() {
        // admissions spread two months apart so the duplicate window
        // never catches them, only the per-diagnosis count does
        let claims = vec![
            admitted_on(
                snapshot("BEN-001", "Malaria", dec!(50000)),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ),
            admitted_on(
                snapshot("BEN-001", "Malaria", dec!(50000)),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ),
            admitted_on(
                snapshot("BEN-001", "Malaria", dec!(50000)),
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            ),
        ];

        let report = engine().run(&claims);

        assert_eq!(report.by_kind.get(&FlagKind::Frequency), Some(&3));
        for claim in &claims {
            let flags = report.flags_for(claim.claim_id);
            assert_eq!(flags.len(), 1);
            assert_eq!(flags[0].kind, FlagKind::Frequency);
            assert_eq!(flags[0].severity, Severity::High);
        }
    }

    #[test]
    fn test_two_claims_per_diagnosis_stay_under_the_limit() {
        let claims = vec![
            admitted_on(
                snapshot("BEN-001", "Malaria", dec!(50000)),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ),
            admitted_on(
                snapshot("BEN-001", "Malaria", dec!(50000)),
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            ),
        ];

        assert!(engine().run(&claims).is_clean());
    }
}

// ============================================================================
// Consistency Tests
// ============================================================================

mod consistency_tests {
    use super::*;

    #[test]
    fn test_rejected_claim_with_approved_cost_flags_critical() {
        let mut claim = snapshot("BEN-001", "fracture care", dec!(150000));
        claim.decision = Decision::Rejected;
        claim.approved_cost = Some(Money::ngn(dec!(150000)));

        let report = engine().run(&[claim.clone()]);

        let flags = report.flags_for(claim.claim_id);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].kind, FlagKind::DecisionMismatch);
        assert_eq!(flags[0].severity, Severity::Critical);
    }

    #[test]
    fn test_rejected_claim_with_cleared_cost_not_flagged() {
        let mut claim = snapshot("BEN-001", "fracture care", dec!(150000));
        claim.decision = Decision::Rejected;
        claim.approved_cost = Some(Money::zero(core_kernel::Currency::NGN));

        assert!(engine().run(&[claim]).is_clean());
    }

    #[test]
    fn test_approved_cost_on_pending_decision_flags_high() {
        let mut claim = snapshot("BEN-001", "fracture care", dec!(150000));
        claim.approved_cost = Some(Money::ngn(dec!(120000)));

        let report = engine().run(&[claim.clone()]);

        let flags = report.flags_for(claim.claim_id);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].kind, FlagKind::DecisionMismatch);
        assert_eq!(flags[0].severity, Severity::High);
    }

    #[test]
    fn test_cost_above_diagnosis_ceiling_flags_critical() {
        let claim = snapshot("BEN-001", "Caesarean Section", dec!(400000));

        let report = engine().run(&[claim.clone()]);

        let flags = report.flags_for(claim.claim_id);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].kind, FlagKind::ExcessiveCost);
        assert_eq!(flags[0].severity, Severity::Critical);
    }

    #[test]
    fn test_ceiling_override_lifts_the_tariff() {
        let mut config = AuditConfig::default();
        config
            .ceiling_overrides
            .insert("caesarean section".to_string(), dec!(450000));
        let engine = AuditEngine::new(config);

        let claim = snapshot("BEN-001", "Caesarean Section", dec!(400000));

        assert!(engine.run(&[claim]).is_clean());
    }

    #[test]
    fn test_zero_cost_with_described_treatment_flags_low() {
        let claim = snapshot("BEN-001", "fracture care", dec!(0));

        let report = engine().run(&[claim.clone()]);

        let flags = report.flags_for(claim.claim_id);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].kind, FlagKind::ZeroCost);
        assert_eq!(flags[0].severity, Severity::Low);
    }

    #[test]
    fn test_zero_cost_with_trivial_description_not_flagged() {
        let mut claim = snapshot("BEN-001", "fracture care", dec!(0));
        claim.treatment_description = "checkup".to_string();

        assert!(engine().run(&[claim]).is_clean());
    }
}

// ============================================================================
// Report Tests
// ============================================================================

mod report_tests {
    use super::*;

    fn mixed_scenario() -> Vec<ClaimSnapshot> {
        let first = snapshot("BEN-001", "Malaria", dec!(50000));
        let repeat = admitted_on(
            snapshot("BEN-001", "Malaria", dec!(50000)),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
        );
        let mut mismatch = snapshot("BEN-002", "asthma", dec!(120000));
        mismatch.decision = Decision::Rejected;
        mismatch.approved_cost = Some(Money::ngn(dec!(120000)));
        let excessive = snapshot("BEN-003", "Typhoid", dec!(200000));

        vec![first, repeat, mismatch, excessive]
    }

    #[test]
    fn test_report_is_deterministic() {
        let claims = mixed_scenario();

        let one = engine().run(&claims);
        let two = engine().run(&claims);

        assert_eq!(one.flags, two.flags);
        assert_eq!(one.assessments, two.assessments);
        assert_eq!(one.by_severity, two.by_severity);
        assert_eq!(one.by_kind, two.by_kind);
    }

    #[test]
    fn test_aggregate_counts_match_flag_totals() {
        let report = engine().run(&mixed_scenario());

        let by_severity: usize = report.by_severity.values().sum();
        let by_kind: usize = report.by_kind.values().sum();
        assert_eq!(by_severity, report.flags.len());
        assert_eq!(by_kind, report.flags.len());
        assert_eq!(report.claims_audited, 4);
    }

    #[test]
    fn test_assessments_rank_highest_risk_first() {
        let report = engine().run(&mixed_scenario());

        assert_eq!(report.assessments.len(), 3);
        for pair in report.assessments.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_lookup_helpers_agree_with_the_flag_list() {
        let claims = mixed_scenario();
        let clean_id = claims[0].claim_id;
        let flagged_id = claims[1].claim_id;

        let report = engine().run(&claims);

        assert!(report.flags_for(clean_id).is_empty());
        assert!(report.assessment_for(clean_id).is_none());

        let assessment = report.assessment_for(flagged_id).unwrap();
        assert_eq!(assessment.flag_count, report.flags_for(flagged_id).len());
    }
}

// ============================================================================
// Resolution Tests
// ============================================================================

mod resolution_tests {
    use super::*;

    fn flagged_entry() -> ErrorLogEntry {
        let first = snapshot("BEN-001", "Malaria", dec!(50000));
        let repeat = admitted_on(
            snapshot("BEN-001", "Malaria", dec!(50000)),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
        );
        let batch_id = repeat.batch_id;

        let report = engine().run(&[first, repeat]);
        ErrorLogEntry::from_flag(&report.flags[0], Some(batch_id))
    }

    #[test]
    fn test_flag_becomes_an_open_log_entry() {
        let entry = flagged_entry();

        assert_eq!(entry.resolution, ResolutionStatus::Open);
        assert_eq!(entry.kind, FlagKind::Duplicate);
        assert_eq!(entry.severity, Severity::High);
        assert!(entry.related_claim_id.is_some());
        assert!(entry.batch_id.is_some());
    }

    #[test]
    fn test_full_resolution_path() {
        let auditor = Actor::admin("AUD-007");
        let mut entry = flagged_entry();

        entry.begin_review().unwrap();
        assert_eq!(entry.resolution, ResolutionStatus::UnderReview);

        entry
            .resolve("facility confirmed a genuine readmission", &auditor)
            .unwrap();
        assert_eq!(entry.resolution, ResolutionStatus::Resolved);
        assert_eq!(entry.resolved_by.as_deref(), Some("AUD-007"));
        assert!(entry.resolution.is_terminal());
    }

    #[test]
    fn test_ignored_entry_cannot_be_reopened() {
        let auditor = Actor::admin("AUD-007");
        let mut entry = flagged_entry();

        entry.ignore(Some("below materiality".to_string()), &auditor).unwrap();

        assert!(entry.begin_review().is_err());
        assert!(entry.resolve("late note", &auditor).is_err());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn arb_snapshot() -> impl Strategy<Value = ClaimSnapshot> {
        (
            0usize..6,
            0usize..4,
            1_000u32..400_000,
            0i64..60,
            0i64..10,
        )
            .prop_map(|(ben, diag, amount, offset, stay)| {
                let diagnoses = ["malaria", "typhoid", "fracture care", "asthma"];
                let base = snapshot(
                    &format!("BEN-{:03}", ben),
                    diagnoses[diag],
                    Decimal::from(amount),
                );
                let mut claim = admitted_on(
                    base,
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset),
                );
                claim.discharge_date = claim.admission_date + Duration::days(stay);
                claim
            })
    }

    proptest! {
        #[test]
        fn treatment_before_admission_always_raises_a_high_time_flag(
            gap_days in 1i64..365,
            stay in 0i64..30,
        ) {
            let mut claim = snapshot("BEN-001", "fracture care", dec!(50000));
            claim.treatment_date = claim.admission_date - Duration::days(gap_days);
            claim.discharge_date = claim.admission_date + Duration::days(stay);

            let report = engine().run(&[claim.clone()]);

            let raised = report
                .flags_for(claim.claim_id)
                .into_iter()
                .any(|flag| {
                    flag.kind == FlagKind::TimeVariance && flag.severity == Severity::High
                });
            prop_assert!(raised);
        }

        #[test]
        fn report_structure_stays_consistent(
            claims in prop::collection::vec(arb_snapshot(), 0..25),
        ) {
            let report = engine().run(&claims);

            let by_severity: usize = report.by_severity.values().sum();
            let by_kind: usize = report.by_kind.values().sum();
            prop_assert_eq!(by_severity, report.flags.len());
            prop_assert_eq!(by_kind, report.flags.len());

            let flagged: HashSet<ClaimId> =
                report.flags.iter().map(|flag| flag.claim_id).collect();
            prop_assert_eq!(report.assessments.len(), flagged.len());

            for assessment in &report.assessments {
                let flags = report.flags_for(assessment.claim_id);
                let expected: Decimal =
                    flags.iter().map(|flag| flag.score_contribution()).sum();
                prop_assert_eq!(assessment.score, expected);
                prop_assert_eq!(assessment.flag_count, flags.len());
            }

            for pair in report.assessments.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
