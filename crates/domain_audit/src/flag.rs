//! Audit flags
//!
//! A flag is a non-blocking integrity finding attached to a claim. Flags
//! never mutate the claim they point at; they are ranked, scored, and
//! optionally stored as error-log entries for human follow-up.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;

/// How serious a finding is
///
/// Ordering matters: `Critical` ranks above `High` and so on, and each
/// level carries a fixed weight in the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Weight this severity contributes to the risk score
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 3,
            Severity::High => 7,
            Severity::Critical => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The family of rule that raised a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// Repeated beneficiary/diagnosis pairs, shared NINs or phones
    Duplicate,
    /// Cost far from the (diagnosis, procedure) group mean
    CostVariance,
    /// Impossible or implausible encounter dates
    TimeVariance,
    /// Too many claims from one facility or beneficiary
    Frequency,
    /// Decision and approved cost disagree
    DecisionMismatch,
    /// Total cost above the configured ceiling
    ExcessiveCost,
    /// Zero cost against a described treatment
    ZeroCost,
}

impl FlagKind {
    /// Weight this rule family contributes to the risk score
    pub fn weight(&self) -> Decimal {
        match self {
            FlagKind::Duplicate => dec!(2.0),
            FlagKind::CostVariance => dec!(1.5),
            FlagKind::TimeVariance => dec!(1.8),
            FlagKind::Frequency => dec!(1.3),
            FlagKind::DecisionMismatch => dec!(1.2),
            FlagKind::ExcessiveCost => dec!(1.1),
            FlagKind::ZeroCost => dec!(1.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKind::Duplicate => "duplicate",
            FlagKind::CostVariance => "cost_variance",
            FlagKind::TimeVariance => "time_variance",
            FlagKind::Frequency => "frequency",
            FlagKind::DecisionMismatch => "decision_mismatch",
            FlagKind::ExcessiveCost => "excessive_cost",
            FlagKind::ZeroCost => "zero_cost",
        }
    }
}

impl std::fmt::Display for FlagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One integrity finding against one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFlag {
    /// The claim the finding is raised against
    pub claim_id: ClaimId,
    pub kind: FlagKind,
    pub severity: Severity,
    /// Human-readable description of what was found
    pub message: String,
    /// The other claim involved, for pairwise findings
    pub related_claim_id: Option<ClaimId>,
}

impl AuditFlag {
    pub fn new(
        claim_id: ClaimId,
        kind: FlagKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            claim_id,
            kind,
            severity,
            message: message.into(),
            related_claim_id: None,
        }
    }

    /// Attaches the other claim involved in a pairwise finding
    pub fn related_to(mut self, other: ClaimId) -> Self {
        self.related_claim_id = Some(other);
        self
    }

    /// Contribution of this flag to a claim's risk score
    pub fn score_contribution(&self) -> Decimal {
        Decimal::from(self.severity.weight()) * self.kind.weight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_score_contribution_combines_weights() {
        let flag = AuditFlag::new(
            ClaimId::new(),
            FlagKind::Duplicate,
            Severity::High,
            "repeat encounter",
        );
        // high (7) x duplicate (2.0)
        assert_eq!(flag.score_contribution(), dec!(14.0));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&FlagKind::DecisionMismatch).unwrap(),
            "\"decision_mismatch\""
        );
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
    }
}
