//! Audit DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{BatchId, ClaimId, ErrorLogId};
use domain_audit::{
    AuditFlag, AuditReport, ErrorLogEntry, FlagKind, ResolutionStatus, RiskAssessment, RiskBand,
    Severity,
};

#[derive(Debug, Deserialize)]
pub struct RunAuditRequest {
    /// Batches whose claims are scanned
    pub batch_ids: Vec<Uuid>,
    /// When set, every finding is persisted to the error log
    #[serde(default)]
    pub store_findings: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResolveEntryRequest {
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct IgnoreEntryRequest {
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FlagResponse {
    pub claim_id: ClaimId,
    pub kind: FlagKind,
    pub severity: Severity,
    pub message: String,
    pub related_claim_id: Option<ClaimId>,
    pub score_contribution: Decimal,
}

impl From<&AuditFlag> for FlagResponse {
    fn from(flag: &AuditFlag) -> Self {
        Self {
            claim_id: flag.claim_id,
            kind: flag.kind,
            severity: flag.severity,
            message: flag.message.clone(),
            related_claim_id: flag.related_claim_id,
            score_contribution: flag.score_contribution(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub claim_id: ClaimId,
    pub score: Decimal,
    pub band: RiskBand,
    pub flag_count: usize,
}

impl From<&RiskAssessment> for AssessmentResponse {
    fn from(assessment: &RiskAssessment) -> Self {
        Self {
            claim_id: assessment.claim_id,
            score: assessment.score,
            band: assessment.band,
            flag_count: assessment.flag_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditRunResponse {
    pub run_at: DateTime<Utc>,
    pub claims_audited: usize,
    pub flags: Vec<FlagResponse>,
    pub assessments: Vec<AssessmentResponse>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_kind: BTreeMap<FlagKind, usize>,
    /// Findings written to the error log by this run
    pub findings_stored: usize,
}

impl AuditRunResponse {
    pub fn new(report: &AuditReport, findings_stored: usize) -> Self {
        Self {
            run_at: report.run_at,
            claims_audited: report.claims_audited,
            flags: report.flags.iter().map(FlagResponse::from).collect(),
            assessments: report
                .assessments
                .iter()
                .map(AssessmentResponse::from)
                .collect(),
            by_severity: report.by_severity.clone(),
            by_kind: report.by_kind.clone(),
            findings_stored,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorLogEntryResponse {
    pub id: ErrorLogId,
    pub claim_id: ClaimId,
    pub batch_id: Option<BatchId>,
    pub kind: FlagKind,
    pub severity: Severity,
    pub message: String,
    pub related_claim_id: Option<ClaimId>,
    pub resolution: ResolutionStatus,
    pub resolution_note: Option<String>,
    pub resolved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ErrorLogEntry> for ErrorLogEntryResponse {
    fn from(entry: &ErrorLogEntry) -> Self {
        Self {
            id: entry.id,
            claim_id: entry.claim_id,
            batch_id: entry.batch_id,
            kind: entry.kind,
            severity: entry.severity,
            message: entry.message.clone(),
            related_claim_id: entry.related_claim_id,
            resolution: entry.resolution,
            resolution_note: entry.resolution_note.clone(),
            resolved_by: entry.resolved_by.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}
