//! Audit engine
//!
//! Runs the integrity rules over a set of claim snapshots and produces a
//! report of flags, per-claim risk assessments, and aggregate counts. A
//! scan never mutates the claims it reads and never touches storage, so
//! the same snapshots always yield the same findings.
//!
//! Each rule works off indexes built in a single pass over the input,
//! keeping a scan close to linear in the number of claims rather than
//! comparing every pair.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, FacilityId};
use domain_claims::{CareType, Decision};

use crate::config::AuditConfig;
use crate::flag::{AuditFlag, FlagKind, Severity};
use crate::score::RiskAssessment;
use crate::snapshot::ClaimSnapshot;

/// Shortest treatment description that makes a zero cost suspicious
const ZERO_COST_DESCRIPTION_MIN: usize = 10;

/// Outcome of one audit scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub run_at: DateTime<Utc>,
    pub claims_audited: usize,
    /// Every flag raised, grouped by claim in input order
    pub flags: Vec<AuditFlag>,
    /// One entry per flagged claim, highest score first
    pub assessments: Vec<RiskAssessment>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_kind: BTreeMap<FlagKind, usize>,
}

impl AuditReport {
    /// Flags raised against one claim
    pub fn flags_for(&self, claim_id: ClaimId) -> Vec<&AuditFlag> {
        self.flags
            .iter()
            .filter(|flag| flag.claim_id == claim_id)
            .collect()
    }

    /// Risk assessment for one claim, present only if it was flagged
    pub fn assessment_for(&self, claim_id: ClaimId) -> Option<&RiskAssessment> {
        self.assessments
            .iter()
            .find(|assessment| assessment.claim_id == claim_id)
    }

    pub fn is_clean(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Rule-based integrity scanner for claims
#[derive(Debug, Clone, Default)]
pub struct AuditEngine {
    config: AuditConfig,
}

impl AuditEngine {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Runs every rule over the snapshots and assembles the report
    pub fn run(&self, claims: &[ClaimSnapshot]) -> AuditReport {
        let mut raised = Vec::new();
        self.detect_duplicates(claims, &mut raised);
        self.detect_cost_variance(claims, &mut raised);
        self.detect_time_anomalies(claims, &mut raised);
        self.detect_frequency_anomalies(claims, &mut raised);
        self.check_decision_consistency(claims, &mut raised);

        // Group per claim, then reassemble in input order so the report
        // is stable across runs.
        let mut per_claim: HashMap<ClaimId, Vec<AuditFlag>> = HashMap::new();
        for flag in raised {
            per_claim.entry(flag.claim_id).or_default().push(flag);
        }

        let mut flags = Vec::new();
        let mut assessments = Vec::new();
        for claim in claims {
            if let Some(claim_flags) = per_claim.remove(&claim.claim_id) {
                assessments.push(RiskAssessment::assess(claim.claim_id, claim_flags.iter()));
                flags.extend(claim_flags);
            }
        }
        assessments.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.claim_id.cmp(&b.claim_id)));

        let mut by_severity = BTreeMap::new();
        let mut by_kind = BTreeMap::new();
        for flag in &flags {
            *by_severity.entry(flag.severity).or_insert(0) += 1;
            *by_kind.entry(flag.kind).or_insert(0) += 1;
        }

        tracing::info!(
            claims_audited = claims.len(),
            flags_raised = flags.len(),
            "claims audit scan complete"
        );

        AuditReport {
            run_at: Utc::now(),
            claims_audited: claims.len(),
            flags,
            assessments,
            by_severity,
            by_kind,
        }
    }

    /// Repeat encounters plus NINs and phones shared across names
    fn detect_duplicates(&self, claims: &[ClaimSnapshot], flags: &mut Vec<AuditFlag>) {
        let mut encounters: HashMap<(String, String), Vec<&ClaimSnapshot>> = HashMap::new();
        for claim in claims {
            let beneficiary = normalize(&claim.beneficiary_id);
            let diagnosis = normalize(&claim.primary_diagnosis);
            if beneficiary.is_empty() || diagnosis.is_empty() {
                continue;
            }
            encounters
                .entry((beneficiary, diagnosis))
                .or_default()
                .push(claim);
        }

        for group in encounters.values_mut() {
            if group.len() < 2 {
                continue;
            }
            // The earliest claim in a repeat chain is taken as the
            // legitimate one; each later claim is flagged against its
            // nearest predecessor.
            group.sort_by_key(|claim| (claim.admission_date, claim.claim_id));
            for pair in group.windows(2) {
                let (earlier, later) = (pair[0], pair[1]);
                let gap = (later.admission_date - earlier.admission_date).num_days();
                if gap <= self.config.duplicate_window_days {
                    flags.push(
                        AuditFlag::new(
                            later.claim_id,
                            FlagKind::Duplicate,
                            Severity::High,
                            format!(
                                "repeat encounter for the same beneficiary and diagnosis \
                                 {} days after claim {}",
                                gap, earlier.claim_id
                            ),
                        )
                        .related_to(earlier.claim_id),
                    );
                }
            }
        }

        self.flag_shared_identifier(
            claims,
            |claim| claim.nin.as_deref(),
            Severity::Critical,
            "national identity number",
            flags,
        );
        self.flag_shared_identifier(
            claims,
            |claim| claim.phone.as_deref(),
            Severity::Medium,
            "phone number",
            flags,
        );
    }

    /// Flags every carrier of an identifier that maps to more than one
    /// beneficiary name
    fn flag_shared_identifier<'a, F>(
        &self,
        claims: &'a [ClaimSnapshot],
        identifier: F,
        severity: Severity,
        label: &str,
        flags: &mut Vec<AuditFlag>,
    ) where
        F: Fn(&'a ClaimSnapshot) -> Option<&'a str>,
    {
        let mut carriers: HashMap<String, Vec<&ClaimSnapshot>> = HashMap::new();
        for claim in claims {
            if let Some(value) = identifier(claim) {
                let key = normalize(value);
                if key.is_empty() {
                    continue;
                }
                carriers.entry(key).or_default().push(claim);
            }
        }

        for group in carriers.values() {
            let names: HashSet<String> = group
                .iter()
                .map(|claim| normalize(&claim.beneficiary_name))
                .collect();
            if names.len() < 2 {
                continue;
            }
            for claim in group {
                flags.push(AuditFlag::new(
                    claim.claim_id,
                    FlagKind::Duplicate,
                    severity,
                    format!("{} shared across {} beneficiary names", label, names.len()),
                ));
            }
        }
    }

    /// Costs far from the (diagnosis, procedure) peer mean
    fn detect_cost_variance(&self, claims: &[ClaimSnapshot], flags: &mut Vec<AuditFlag>) {
        let mut groups: HashMap<(String, String), Vec<&ClaimSnapshot>> = HashMap::new();
        for claim in claims {
            let diagnosis = normalize(&claim.primary_diagnosis);
            let procedure = normalize(&claim.treatment_description);
            if diagnosis.is_empty() || procedure.is_empty() {
                continue;
            }
            groups.entry((diagnosis, procedure)).or_default().push(claim);
        }

        for group in groups.values() {
            if group.len() < 2 {
                continue;
            }
            let total: Decimal = group.iter().map(|claim| claim.total_cost.amount()).sum();
            let mean = total / Decimal::from(group.len() as u64);
            if mean.is_zero() {
                continue;
            }
            for claim in group {
                let deviation = (claim.total_cost.amount() - mean) / mean * dec!(100);
                if deviation > self.config.cost_variance_threshold_pct {
                    flags.push(AuditFlag::new(
                        claim.claim_id,
                        FlagKind::CostVariance,
                        Severity::High,
                        format!(
                            "cost {} is {}% above the peer mean of {}",
                            claim.total_cost,
                            deviation.round_dp(1),
                            mean.round_dp(2)
                        ),
                    ));
                } else if deviation < -self.config.cost_variance_threshold_pct {
                    flags.push(AuditFlag::new(
                        claim.claim_id,
                        FlagKind::CostVariance,
                        Severity::Medium,
                        format!(
                            "cost {} is {}% below the peer mean of {}",
                            claim.total_cost,
                            deviation.abs().round_dp(1),
                            mean.round_dp(2)
                        ),
                    ));
                }
            }
        }
    }

    /// Impossible or implausible encounter dates
    fn detect_time_anomalies(&self, claims: &[ClaimSnapshot], flags: &mut Vec<AuditFlag>) {
        for claim in claims {
            if claim.treatment_date < claim.admission_date {
                flags.push(AuditFlag::new(
                    claim.claim_id,
                    FlagKind::TimeVariance,
                    Severity::High,
                    "treatment date precedes admission date",
                ));
            }
            if claim.discharge_date < claim.admission_date {
                flags.push(AuditFlag::new(
                    claim.claim_id,
                    FlagKind::TimeVariance,
                    Severity::High,
                    "discharge date precedes admission date",
                ));
            }
            if claim.care_type == CareType::Outpatient {
                let stay = claim.stay_duration_days();
                if stay > self.config.outpatient_stay_limit_days {
                    flags.push(AuditFlag::new(
                        claim.claim_id,
                        FlagKind::TimeVariance,
                        Severity::Medium,
                        format!(
                            "outpatient stay of {} days exceeds the {} day limit",
                            stay, self.config.outpatient_stay_limit_days
                        ),
                    ));
                }
            }
        }
    }

    /// Submission volume beyond plausible limits
    fn detect_frequency_anomalies(&self, claims: &[ClaimSnapshot], flags: &mut Vec<AuditFlag>) {
        let mut by_facility_date: HashMap<(FacilityId, NaiveDate), Vec<&ClaimSnapshot>> =
            HashMap::new();
        let mut by_beneficiary_diagnosis: HashMap<(String, String), Vec<&ClaimSnapshot>> =
            HashMap::new();
        for claim in claims {
            let date = self.config.timezone.calendar_date(claim.submitted_at);
            by_facility_date
                .entry((claim.facility_id, date))
                .or_default()
                .push(claim);

            let beneficiary = normalize(&claim.beneficiary_id);
            let diagnosis = normalize(&claim.primary_diagnosis);
            if !beneficiary.is_empty() && !diagnosis.is_empty() {
                by_beneficiary_diagnosis
                    .entry((beneficiary, diagnosis))
                    .or_default()
                    .push(claim);
            }
        }

        for ((_, date), group) in &by_facility_date {
            if group.len() > self.config.facility_daily_claim_limit {
                for claim in group {
                    flags.push(AuditFlag::new(
                        claim.claim_id,
                        FlagKind::Frequency,
                        Severity::Medium,
                        format!("facility submitted {} claims on {}", group.len(), date),
                    ));
                }
            }
        }

        for group in by_beneficiary_diagnosis.values() {
            if group.len() > self.config.beneficiary_diagnosis_claim_limit {
                for claim in group {
                    flags.push(AuditFlag::new(
                        claim.claim_id,
                        FlagKind::Frequency,
                        Severity::High,
                        format!(
                            "beneficiary has {} claims for the same diagnosis",
                            group.len()
                        ),
                    ));
                }
            }
        }
    }

    /// Decision, approved cost, and tariff ceiling cross-checks
    fn check_decision_consistency(&self, claims: &[ClaimSnapshot], flags: &mut Vec<AuditFlag>) {
        for claim in claims {
            if let Some(approved) = claim.approved_cost {
                if claim.decision == Decision::Rejected && !approved.is_zero() {
                    flags.push(AuditFlag::new(
                        claim.claim_id,
                        FlagKind::DecisionMismatch,
                        Severity::Critical,
                        format!("rejected claim carries an approved cost of {}", approved),
                    ));
                }
                if claim.decision == Decision::Pending {
                    flags.push(AuditFlag::new(
                        claim.claim_id,
                        FlagKind::DecisionMismatch,
                        Severity::High,
                        "approved cost recorded while the decision is still pending",
                    ));
                }
            }

            let ceiling = self.config.ceiling_for(&claim.primary_diagnosis);
            if claim.total_cost.amount() > ceiling {
                flags.push(AuditFlag::new(
                    claim.claim_id,
                    FlagKind::ExcessiveCost,
                    Severity::Critical,
                    format!(
                        "total cost {} exceeds the ceiling of {} for {}",
                        claim.total_cost,
                        ceiling,
                        normalize(&claim.primary_diagnosis)
                    ),
                ));
            }

            if claim.total_cost.is_zero()
                && claim.treatment_description.trim().len() >= ZERO_COST_DESCRIPTION_MIN
            {
                flags.push(AuditFlag::new(
                    claim.claim_id,
                    FlagKind::ZeroCost,
                    Severity::Low,
                    "zero total cost against a described treatment",
                ));
            }
        }
    }
}

/// Case-insensitive, whitespace-trimmed key for grouping
fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
