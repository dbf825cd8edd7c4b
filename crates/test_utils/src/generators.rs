//! Property-Based Test Generators
//!
//! Proptest strategies for generating random portal data that keeps
//! domain invariants (dates in order, amounts in tariff range, NINs
//! eleven digits).

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, Money};
use domain_audit::ClaimSnapshot;
use domain_claims::{CareType, Decision, DischargeForm};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::{ClaimSnapshotBuilder, DischargeFormBuilder};
use crate::fixtures::{COMMON_DIAGNOSES, COMMON_TREATMENTS};

/// Strategy for the portal currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::NGN),
        Just(Currency::USD),
        Just(Currency::GBP),
        Just(Currency::EUR),
        Just(Currency::XOF),
    ]
}

/// Strategy for claim-scale amounts in whole naira
pub fn claim_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1_000i64..500_000i64).prop_map(Decimal::from)
}

/// Strategy for NGN money at claim scale
pub fn ngn_money_strategy() -> impl Strategy<Value = Money> {
    claim_amount_strategy().prop_map(Money::ngn)
}

/// Strategy for diagnoses from the standard-cost table
pub fn diagnosis_strategy() -> impl Strategy<Value = String> {
    (0..COMMON_DIAGNOSES.len()).prop_map(|i| COMMON_DIAGNOSES[i].to_string())
}

/// Strategy for treatment descriptions
pub fn treatment_strategy() -> impl Strategy<Value = String> {
    (0..COMMON_TREATMENTS.len()).prop_map(|i| COMMON_TREATMENTS[i].to_string())
}

/// Strategy for care types
pub fn care_type_strategy() -> impl Strategy<Value = CareType> {
    prop_oneof![Just(CareType::Inpatient), Just(CareType::Outpatient)]
}

/// Strategy for review decisions
pub fn decision_strategy() -> impl Strategy<Value = Decision> {
    prop_oneof![
        Just(Decision::Pending),
        Just(Decision::Approved),
        Just(Decision::Rejected),
        Just(Decision::PartiallyApproved),
    ]
}

/// Strategy for service dates across 2024
pub fn service_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..365i64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    })
}

/// Strategy for in-order encounter dates (admission, treatment, discharge)
pub fn encounter_dates_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate, NaiveDate)> {
    (0i64..330i64, 0i64..3i64, 0i64..14i64).prop_map(|(start, treat, stay)| {
        let admission = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(start);
        let treatment = admission + Duration::days(treat.min(stay));
        let discharge = admission + Duration::days(stay);
        (admission, treatment, discharge)
    })
}

/// Strategy for well-formed discharge forms
pub fn discharge_form_strategy() -> impl Strategy<Value = DischargeForm> {
    (
        0u32..50_000u32,
        diagnosis_strategy(),
        treatment_strategy(),
        care_type_strategy(),
        encounter_dates_strategy(),
        claim_amount_strategy(),
    )
        .prop_map(|(seq, diagnosis, treatment, care_type, dates, amount)| {
            DischargeFormBuilder::new()
                .with_beneficiary_id(format!("NHIS-{:05}", seq))
                .with_diagnosis(diagnosis)
                .with_treatment(treatment)
                .with_care_type(care_type)
                .with_dates(dates.0, dates.1, dates.2)
                .with_procedure_cost(amount)
                .build()
        })
}

/// Strategy for audit claim snapshots with coherent dates and costs
pub fn claim_snapshot_strategy() -> impl Strategy<Value = ClaimSnapshot> {
    (
        0u32..50_000u32,
        diagnosis_strategy(),
        treatment_strategy(),
        care_type_strategy(),
        encounter_dates_strategy(),
        claim_amount_strategy(),
        0i64..72i64,
    )
        .prop_map(
            |(seq, diagnosis, treatment, care_type, dates, amount, hours)| {
                let submitted =
                    Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap() + Duration::hours(hours);
                ClaimSnapshotBuilder::new()
                    .with_beneficiary(format!("NHIS-{:05}", seq), format!("Beneficiary {}", seq))
                    .with_diagnosis(diagnosis)
                    .with_treatment(treatment)
                    .with_care_type(care_type)
                    .with_dates(dates.0, dates.1, dates.2)
                    .with_total_cost(amount)
                    .submitted_at(submitted)
                    .build()
            },
        )
}
