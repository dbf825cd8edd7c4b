//! Error log
//!
//! Flags worth human follow-up are persisted as error-log entries.
//! Entries carry a small resolution workflow so reviewers can claim a
//! finding, write up what they concluded, and close it out. Resolved
//! and ignored entries are terminal; the log is an audit trail, not a
//! scratchpad.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, BatchId, ClaimId, ErrorLogId};

use crate::error::{AuditError, AuditResult};
use crate::flag::{AuditFlag, FlagKind, Severity};

/// Where a logged finding sits in its follow-up workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Open,
    UnderReview,
    Resolved,
    Ignored,
}

impl ResolutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolutionStatus::Resolved | ResolutionStatus::Ignored)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Open => "open",
            ResolutionStatus::UnderReview => "under_review",
            ResolutionStatus::Resolved => "resolved",
            ResolutionStatus::Ignored => "ignored",
        }
    }
}

impl std::fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted audit finding awaiting human follow-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
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

impl ErrorLogEntry {
    /// Opens a log entry from a flag raised during a scan
    pub fn from_flag(flag: &AuditFlag, batch_id: Option<BatchId>) -> Self {
        let now = Utc::now();
        Self {
            id: ErrorLogId::new(),
            claim_id: flag.claim_id,
            batch_id,
            kind: flag.kind,
            severity: flag.severity,
            message: flag.message.clone(),
            related_claim_id: flag.related_claim_id,
            resolution: ResolutionStatus::Open,
            resolution_note: None,
            resolved_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves an open entry under review
    pub fn begin_review(&mut self) -> AuditResult<()> {
        self.transition_to(ResolutionStatus::UnderReview)
    }

    /// Closes the entry with a written conclusion
    pub fn resolve(&mut self, note: impl Into<String>, resolver: &Actor) -> AuditResult<()> {
        let note = note.into();
        if note.trim().is_empty() {
            return Err(AuditError::MissingResolutionNote);
        }
        self.transition_to(ResolutionStatus::Resolved)?;
        self.resolution_note = Some(note);
        self.resolved_by = Some(resolver.id().to_string());
        Ok(())
    }

    /// Dismisses the entry as not worth pursuing
    pub fn ignore(&mut self, note: Option<String>, resolver: &Actor) -> AuditResult<()> {
        self.transition_to(ResolutionStatus::Ignored)?;
        self.resolution_note = note.filter(|n| !n.trim().is_empty());
        self.resolved_by = Some(resolver.id().to_string());
        Ok(())
    }

    fn transition_to(&mut self, next: ResolutionStatus) -> AuditResult<()> {
        let allowed = matches!(
            (self.resolution, next),
            (ResolutionStatus::Open, ResolutionStatus::UnderReview)
                | (ResolutionStatus::Open, ResolutionStatus::Resolved)
                | (ResolutionStatus::Open, ResolutionStatus::Ignored)
                | (ResolutionStatus::UnderReview, ResolutionStatus::Resolved)
                | (ResolutionStatus::UnderReview, ResolutionStatus::Ignored)
        );
        if !allowed {
            return Err(AuditError::InvalidResolutionTransition {
                from: self.resolution.to_string(),
                to: next.to_string(),
            });
        }
        self.resolution = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
