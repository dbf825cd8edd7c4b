//! # Domain: Audit
//!
//! Rule-based integrity scanning over submitted claims. The engine runs
//! duplicate, cost-variance, time, frequency and decision-consistency
//! rules over flat claim snapshots, scores each flagged claim into a
//! risk band, and aggregates the findings into a report. Findings worth
//! follow-up become error-log entries with their own resolution
//! workflow.

pub mod config;
pub mod engine;
pub mod error;
pub mod flag;
pub mod log;
pub mod score;
pub mod snapshot;

pub use config::AuditConfig;
pub use engine::{AuditEngine, AuditReport};
pub use error::{AuditError, AuditResult};
pub use flag::{AuditFlag, FlagKind, Severity};
pub use log::{ErrorLogEntry, ResolutionStatus};
pub use score::{RiskAssessment, RiskBand};
pub use snapshot::ClaimSnapshot;
