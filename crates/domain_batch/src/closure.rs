//! Batch closure reporting and notification fan-out
//!
//! Closing a batch fixes the amount to be paid and produces a report of
//! what was approved, rejected and scheduled. The parties involved are
//! notified afterwards; a failed notification is logged and swallowed,
//! it never unwinds the closure itself.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, BatchId, FacilityId, Money};
use domain_claims::Decision;

use crate::batch::{Batch, PaymentAdvice};
use crate::error::BatchResult;
use crate::notify::{Notification, NotificationSender, Recipient};

/// Summary produced when a batch is closed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureReport {
    pub batch_id: BatchId,
    pub batch_number: String,
    pub facility_id: FacilityId,
    pub closed_at: DateTime<Utc>,
    pub claim_count: usize,
    pub approved_count: usize,
    pub partially_approved_count: usize,
    pub rejected_count: usize,
    pub pending_count: usize,
    pub total_claimed: Money,
    pub total_approved: Money,
    pub amount_to_pay: Money,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

impl ClosureReport {
    /// Builds a report from a batch that has just been closed
    pub fn for_batch(batch: &Batch) -> Self {
        let mut approved_count = 0;
        let mut partially_approved_count = 0;
        let mut rejected_count = 0;
        let mut pending_count = 0;
        for claim in batch.claims() {
            match claim.decision {
                Decision::Approved => approved_count += 1,
                Decision::PartiallyApproved => partially_approved_count += 1,
                Decision::Rejected => rejected_count += 1,
                Decision::Pending => pending_count += 1,
            }
        }

        let amount_to_pay = batch
            .paid_amount()
            .unwrap_or_else(|| Money::zero(batch.currency()));

        Self {
            batch_id: batch.id(),
            batch_number: batch.batch_number().to_string(),
            facility_id: batch.facility_id(),
            closed_at: batch.closed_at().unwrap_or_else(Utc::now),
            claim_count: batch.claim_count(),
            approved_count,
            partially_approved_count,
            rejected_count,
            pending_count,
            total_claimed: batch.total_claimed(),
            total_approved: batch.total_approved(),
            amount_to_pay,
            notifications_sent: 0,
            notifications_failed: 0,
        }
    }
}

/// Closes batches and announces the outcome to the parties involved
pub struct ClosureService {
    notifier: Arc<dyn NotificationSender>,
}

impl ClosureService {
    pub fn new(notifier: Arc<dyn NotificationSender>) -> Self {
        Self { notifier }
    }

    /// Closes a batch and notifies the parties involved
    ///
    /// The facility, the scheme administration, and the assigned TPA
    /// (if any) each receive a closure notice.
    ///
    /// # Errors
    ///
    /// Returns the batch's own closure errors. Notification failures are
    /// logged, counted on the report, and never propagated.
    pub async fn close_batch(
        &self,
        batch: &mut Batch,
        advice: PaymentAdvice,
        actor: &Actor,
    ) -> BatchResult<ClosureReport> {
        batch.close(advice, actor)?;
        let mut report = ClosureReport::for_batch(batch);

        for notification in closure_notifications(batch, &report) {
            match self.notifier.send(notification).await {
                Ok(()) => report.notifications_sent += 1,
                Err(error) => {
                    report.notifications_failed += 1;
                    tracing::warn!(
                        batch_id = %batch.id(),
                        error = %error,
                        "closure notification failed"
                    );
                }
            }
        }
        Ok(report)
    }

    /// Confirms a disbursement and notifies the facility
    ///
    /// # Errors
    ///
    /// Returns the batch's own disbursement errors. Notification
    /// failures are logged and never propagated.
    pub async fn confirm_disbursement(&self, batch: &mut Batch, actor: &Actor) -> BatchResult<()> {
        batch.confirm_disbursement(actor)?;

        let paid = batch
            .paid_amount()
            .unwrap_or_else(|| Money::zero(batch.currency()));
        let notification = Notification::new(
            batch.id(),
            Recipient::Facility {
                facility_id: batch.facility_id(),
            },
            format!("Payment completed for batch {}", batch.batch_number()),
            format!(
                "Disbursement of {} for batch {} has been confirmed.",
                paid,
                batch.batch_number()
            ),
        );
        if let Err(error) = self.notifier.send(notification).await {
            tracing::warn!(
                batch_id = %batch.id(),
                error = %error,
                "disbursement notification failed"
            );
        }
        Ok(())
    }
}

/// Builds the messages announcing a batch closure
fn closure_notifications(batch: &Batch, report: &ClosureReport) -> Vec<Notification> {
    let mut notifications = vec![
        Notification::new(
            batch.id(),
            Recipient::Facility {
                facility_id: batch.facility_id(),
            },
            format!("Batch {} closed", batch.batch_number()),
            format!(
                "{} of {} claim(s) approved. Amount scheduled for payment: {}.",
                report.approved_count + report.partially_approved_count,
                report.claim_count,
                report.amount_to_pay
            ),
        ),
        Notification::new(
            batch.id(),
            Recipient::SchemeAdmin,
            format!("Batch {} closed", batch.batch_number()),
            format!(
                "Batch {} closed with {} scheduled for payment across {} claim(s).",
                batch.batch_number(),
                report.amount_to_pay,
                report.claim_count
            ),
        ),
    ];
    if let Some(tpa_id) = batch.tpa_id() {
        notifications.push(Notification::new(
            batch.id(),
            Recipient::Tpa { tpa_id },
            format!("Batch {} closed", batch.batch_number()),
            format!(
                "Review of batch {} is settled, {} claim(s) scheduled for payment.",
                batch.batch_number(),
                report.approved_count + report.partially_approved_count
            ),
        ));
    }
    notifications
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ReviewOutcome;
    use crate::notify::mock::MockNotificationSender;
    use chrono::NaiveDate;
    use core_kernel::{Currency, DateRange, FacilityId, TpaId};
    use domain_claims::{CareType, ClaimReview, ClaimStatus, CostBreakdown, DischargeForm};
    use rust_decimal_macros::dec;

    fn reviewed_batch() -> (Batch, Actor, TpaId) {
        let facility_id = FacilityId::new();
        let tpa_id = TpaId::new();
        let facility_actor = Actor::facility("desk-1", facility_id);
        let tpa_actor = Actor::tpa("reviewer-1", tpa_id);
        let admin = Actor::admin("scheme-admin");

        let period = DateRange::week_containing(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        let mut batch = Batch::create(facility_id, period, Currency::NGN, &facility_actor).unwrap();
        batch.open(&facility_actor).unwrap();
        let form = DischargeForm {
            beneficiary_id: "NHIS-5001".to_string(),
            beneficiary_name: "Taiwo Adisa".to_string(),
            hospital_number: "SSH/2024/77".to_string(),
            nin: None,
            phone: None,
            primary_diagnosis: "Fracture, left radius".to_string(),
            secondary_diagnosis: None,
            treatment_description: "Closed reduction and cast".to_string(),
            care_type: CareType::Outpatient,
            admission_date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            treatment_date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            discharge_date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            costs: CostBreakdown::new(dec!(8000), dec!(30000), dec!(4000), dec!(0), Currency::NGN),
        };
        let claim_id = batch.add_claim(form, &facility_actor).unwrap().id;
        batch.submit(&facility_actor).unwrap();
        batch.begin_review(tpa_id, &tpa_actor).unwrap();

        let review = ClaimReview::resolve(
            Decision::Approved,
            None,
            Some(Money::ngn(dec!(40000))),
            None,
            None,
            &tpa_actor,
        )
        .unwrap();
        batch.review_claim(claim_id, review, &tpa_actor).unwrap();
        batch
            .complete_review(ReviewOutcome::Approved { remarks: None }, &tpa_actor)
            .unwrap();

        (batch, admin, tpa_id)
    }

    fn advice() -> PaymentAdvice {
        PaymentAdvice {
            review_summary: None,
            paid_amount: Money::ngn(dec!(40000)),
            beneficiaries_paid: 1,
            payment_date: NaiveDate::from_ymd_opt(2024, 7, 20).unwrap(),
            justification: "Paid per approved tariff".to_string(),
            signature: "Dr. A. Bello".to_string(),
            forwarding_letter: None,
        }
    }

    #[tokio::test]
    async fn test_closure_notifies_all_parties() {
        let (mut batch, admin, tpa_id) = reviewed_batch();

        let sender = Arc::new(MockNotificationSender::new());
        let service = ClosureService::new(sender.clone());
        let report = service
            .close_batch(&mut batch, advice(), &admin)
            .await
            .unwrap();

        assert_eq!(report.notifications_sent, 3);
        assert_eq!(report.notifications_failed, 0);
        assert_eq!(report.amount_to_pay, Money::ngn(dec!(40000)));

        let delivered = sender.delivered().await;
        assert_eq!(delivered.len(), 3);
        assert!(delivered.iter().any(|n| matches!(
            n.recipient,
            Recipient::Facility { facility_id } if facility_id == batch.facility_id()
        )));
        assert!(delivered
            .iter()
            .any(|n| matches!(n.recipient, Recipient::SchemeAdmin)));
        assert!(delivered.iter().any(|n| matches!(
            n.recipient,
            Recipient::Tpa { tpa_id: id } if id == tpa_id
        )));
    }

    #[tokio::test]
    async fn test_failed_notifications_never_block_closure() {
        let (mut batch, admin, _) = reviewed_batch();

        let service = ClosureService::new(Arc::new(MockNotificationSender::failing()));
        let report = service
            .close_batch(&mut batch, advice(), &admin)
            .await
            .unwrap();

        assert!(batch.closed_at().is_some());
        assert_eq!(report.notifications_sent, 0);
        assert_eq!(report.notifications_failed, 3);
    }

    #[tokio::test]
    async fn test_disbursement_notification_sent() {
        let (mut batch, admin, _) = reviewed_batch();

        let sender = Arc::new(MockNotificationSender::new());
        let service = ClosureService::new(sender.clone());
        service
            .close_batch(&mut batch, advice(), &admin)
            .await
            .unwrap();
        service
            .confirm_disbursement(&mut batch, &admin)
            .await
            .unwrap();

        assert!(batch
            .claims()
            .iter()
            .all(|c| c.status == ClaimStatus::VerifiedPaid));
        let delivered = sender.delivered().await;
        assert_eq!(delivered.len(), 4);
        assert!(delivered[3].subject.starts_with("Payment completed"));
    }
}
