//! In-memory persistence and process-local adapters
//!
//! The portal keeps its working set in process memory behind async
//! read/write locks. Handlers read an aggregate out by value, run the
//! domain operation, and write the result back; the last writer wins on
//! concurrent updates to the same aggregate.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use core_kernel::{BatchId, Currency, DomainPort, ErrorLogId, Money, PortError, ReimbursementId};
use domain_audit::ErrorLogEntry;
use domain_batch::{Batch, Notification, NotificationSender};
use domain_payment::{
    DisbursementLedger, LedgerEntry, PaymentResult, PaymentSummary, Reimbursement,
};

/// Process-local store for the portal's aggregates
#[derive(Debug)]
pub struct PortalStore {
    batches: RwLock<HashMap<BatchId, Batch>>,
    error_log: RwLock<HashMap<ErrorLogId, ErrorLogEntry>>,
    reimbursements: RwLock<HashMap<ReimbursementId, Reimbursement>>,
    summaries: RwLock<Vec<PaymentSummary>>,
    ledger: RwLock<DisbursementLedger>,
}

impl PortalStore {
    pub fn new(currency: Currency) -> Self {
        Self {
            batches: RwLock::new(HashMap::new()),
            error_log: RwLock::new(HashMap::new()),
            reimbursements: RwLock::new(HashMap::new()),
            summaries: RwLock::new(Vec::new()),
            ledger: RwLock::new(DisbursementLedger::new(currency)),
        }
    }

    /// Saves a batch, replacing any stored version
    pub async fn put_batch(&self, batch: Batch) {
        self.batches.write().await.insert(batch.id(), batch);
    }

    pub async fn batch(&self, id: BatchId) -> Option<Batch> {
        self.batches.read().await.get(&id).cloned()
    }

    /// All batches in creation order
    pub async fn batches(&self) -> Vec<Batch> {
        let mut all: Vec<Batch> = self.batches.read().await.values().cloned().collect();
        all.sort_by_key(|batch| batch.id());
        all
    }

    /// Persists a set of audit findings
    pub async fn add_log_entries(&self, entries: Vec<ErrorLogEntry>) -> usize {
        let mut log = self.error_log.write().await;
        let stored = entries.len();
        for entry in entries {
            log.insert(entry.id, entry);
        }
        stored
    }

    pub async fn log_entry(&self, id: ErrorLogId) -> Option<ErrorLogEntry> {
        self.error_log.read().await.get(&id).cloned()
    }

    /// Saves a log entry, replacing any stored version
    pub async fn put_log_entry(&self, entry: ErrorLogEntry) {
        self.error_log.write().await.insert(entry.id, entry);
    }

    /// All log entries, newest first
    pub async fn log_entries(&self) -> Vec<ErrorLogEntry> {
        let mut all: Vec<ErrorLogEntry> = self.error_log.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.id.cmp(&a.id));
        all
    }

    /// Saves a reimbursement, replacing any stored version
    pub async fn put_reimbursement(&self, reimbursement: Reimbursement) {
        self.reimbursements
            .write()
            .await
            .insert(reimbursement.id(), reimbursement);
    }

    pub async fn reimbursement(&self, id: ReimbursementId) -> Option<Reimbursement> {
        self.reimbursements.read().await.get(&id).cloned()
    }

    /// All reimbursements in creation order
    pub async fn reimbursements(&self) -> Vec<Reimbursement> {
        let mut all: Vec<Reimbursement> =
            self.reimbursements.read().await.values().cloned().collect();
        all.sort_by_key(|r| r.id());
        all
    }

    pub async fn add_summary(&self, summary: PaymentSummary) {
        self.summaries.write().await.push(summary);
    }

    pub async fn summary_for_batch(&self, batch_id: BatchId) -> Option<PaymentSummary> {
        self.summaries
            .read()
            .await
            .iter()
            .find(|summary| summary.batch_id == batch_id)
            .cloned()
    }

    /// Opens a ledger entry for a just-closed batch
    pub async fn record_closure(&self, batch: &Batch) -> PaymentResult<LedgerEntry> {
        self.ledger.write().await.record_closure(batch).cloned()
    }

    /// Settles the ledger entry for a disbursed batch
    pub async fn confirm_disbursement(
        &self,
        batch_id: BatchId,
        disbursed: Money,
    ) -> PaymentResult<LedgerEntry> {
        self.ledger
            .write()
            .await
            .confirm_disbursement(batch_id, disbursed)
            .cloned()
    }

    /// Snapshot of the disbursement ledger for the read side
    pub async fn ledger(&self) -> DisbursementLedger {
        self.ledger.read().await.clone()
    }
}

/// Notification adapter that records deliveries as log events
///
/// The portal has no mail or SMS channel yet; closure notices surface
/// in the structured log until one exists.
#[derive(Debug, Default)]
pub struct LoggingNotificationSender;

impl DomainPort for LoggingNotificationSender {}

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn send(&self, notification: Notification) -> Result<(), PortError> {
        tracing::info!(
            batch_id = %notification.batch_id,
            recipient = ?notification.recipient,
            subject = %notification.subject,
            "notification dispatched"
        );
        Ok(())
    }
}
