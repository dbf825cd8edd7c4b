//! # Domain: Payments
//!
//! The money trail that follows batch closure. `PaymentSummary` keeps
//! the closure advice on record per batch, `DisbursementLedger` tracks
//! paid against approved until each disbursement is confirmed, and the
//! `Reimbursement` aggregate follows scheme payouts to TPAs across one
//! or more closed batches.

pub mod error;
pub mod ledger;
pub mod reimbursement;
pub mod summary;

pub use error::{PaymentError, PaymentResult};
pub use ledger::{DisbursementLedger, LedgerEntry};
pub use reimbursement::{Reimbursement, ReimbursementStatus};
pub use summary::PaymentSummary;
