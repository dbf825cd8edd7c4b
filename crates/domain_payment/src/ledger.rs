//! Disbursement ledger
//!
//! Tracks paid against approved for every closed batch, independent of
//! the claims' own payment fields. An entry opens at closure with the
//! claim-level approved total and the advice amount, settles once when
//! the disbursement is confirmed, and is read-only afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, Currency, FacilityId, Money};
use domain_batch::{Batch, BatchStatus};

use crate::error::{PaymentError, PaymentResult};

/// One closed batch as the ledger saw it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub batch_id: BatchId,
    pub batch_number: String,
    pub facility_id: FacilityId,
    /// Sum of claim-level approved costs at closure
    pub approved_total: Money,
    /// Amount the closure advice committed to pay
    pub paid_total: Money,
    /// Amount actually disbursed, set at confirmation
    pub disbursed_total: Option<Money>,
    pub recorded_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// Paid minus approved, positive when the closure committed more
    /// than the claim-level approvals
    pub fn variance(&self) -> PaymentResult<Money> {
        Ok(self.paid_total.checked_sub(&self.approved_total)?)
    }

    /// Whether the disbursement has been confirmed
    pub fn is_settled(&self) -> bool {
        self.disbursed_total.is_some()
    }
}

/// Running record of batch closures and their disbursements
///
/// The ledger is single-currency; batches and confirmation amounts in
/// any other currency are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisbursementLedger {
    currency: Currency,
    entries: Vec<LedgerEntry>,
}

impl DisbursementLedger {
    /// Creates an empty ledger for the given currency
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            entries: Vec::new(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the entry for a batch
    pub fn entry_for(&self, batch_id: BatchId) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.batch_id == batch_id)
    }

    /// All entries recorded for a facility, in recording order
    pub fn entries_for_facility(&self, facility_id: FacilityId) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.facility_id == facility_id)
            .collect()
    }

    /// Opens a ledger entry for a freshly closed batch
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::BatchNotClosed` for batches that have not
    /// reached closure, `PaymentError::CurrencyMismatch` for foreign
    /// currencies, and `PaymentError::DuplicateLedgerEntry` when the
    /// batch was already recorded.
    pub fn record_closure(&mut self, batch: &Batch) -> PaymentResult<&LedgerEntry> {
        if batch.status() != BatchStatus::Closed {
            return Err(PaymentError::BatchNotClosed {
                batch_id: batch.id(),
            });
        }
        if batch.currency() != self.currency {
            return Err(PaymentError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: batch.currency().to_string(),
            });
        }
        if self.entry_for(batch.id()).is_some() {
            return Err(PaymentError::DuplicateLedgerEntry {
                batch_id: batch.id(),
            });
        }
        // A closed batch always carries its paid amount
        let paid = batch
            .paid_amount()
            .ok_or(PaymentError::BatchNotClosed {
                batch_id: batch.id(),
            })?;

        self.entries.push(LedgerEntry {
            batch_id: batch.id(),
            batch_number: batch.batch_number().to_string(),
            facility_id: batch.facility_id(),
            approved_total: batch.total_approved(),
            paid_total: paid,
            disbursed_total: None,
            recorded_at: Utc::now(),
            confirmed_at: None,
        });
        let entry = self.entries.last().unwrap();
        tracing::info!(
            batch_id = %entry.batch_id,
            paid = %entry.paid_total,
            "disbursement ledger entry recorded"
        );
        Ok(entry)
    }

    /// Settles an entry with the amount actually disbursed
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NoLedgerEntry` when the batch was never
    /// recorded, `PaymentError::AlreadyDisbursed` when the entry is
    /// already settled, and `PaymentError::CurrencyMismatch` for
    /// foreign amounts.
    pub fn confirm_disbursement(
        &mut self,
        batch_id: BatchId,
        disbursed: Money,
    ) -> PaymentResult<&LedgerEntry> {
        if disbursed.currency() != self.currency {
            return Err(PaymentError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: disbursed.currency().to_string(),
            });
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.batch_id == batch_id)
            .ok_or(PaymentError::NoLedgerEntry { batch_id })?;
        if entry.disbursed_total.is_some() {
            return Err(PaymentError::AlreadyDisbursed { batch_id });
        }
        entry.disbursed_total = Some(disbursed);
        entry.confirmed_at = Some(Utc::now());
        tracing::info!(batch_id = %batch_id, disbursed = %disbursed, "disbursement confirmed");
        Ok(entry)
    }

    /// Sum of claim-level approvals across all entries
    pub fn total_approved(&self) -> PaymentResult<Money> {
        Ok(Money::sum(
            self.entries.iter().map(|e| &e.approved_total),
            self.currency,
        )?)
    }

    /// Sum of closure advice amounts across all entries
    pub fn total_paid(&self) -> PaymentResult<Money> {
        Ok(Money::sum(
            self.entries.iter().map(|e| &e.paid_total),
            self.currency,
        )?)
    }

    /// Sum of confirmed disbursements, unsettled entries count as zero
    pub fn total_disbursed(&self) -> PaymentResult<Money> {
        Ok(Money::sum(
            self.entries.iter().filter_map(|e| e.disbursed_total.as_ref()),
            self.currency,
        )?)
    }

    /// Portfolio-level paid minus approved
    pub fn portfolio_variance(&self) -> PaymentResult<Money> {
        let paid = self.total_paid()?;
        let approved = self.total_approved()?;
        Ok(paid.checked_sub(&approved)?)
    }
}
