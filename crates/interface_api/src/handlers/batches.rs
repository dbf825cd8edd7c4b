//! Batch workflow handlers
//!
//! Every mutation loads the batch out of the store, runs the domain
//! operation with the resolved actor, and writes the batch back. On
//! concurrent updates the last writer wins.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Actor, BatchId, ClaimId, ClaimItemId, DateRange, DocumentRef, FacilityId, Money, TpaId};
use domain_batch::{Batch, PaymentAdvice, ReviewOutcome};
use domain_claims::{ClaimReview, ItemReview};
use domain_payment::PaymentSummary;

use crate::dto::batches::{
    BatchDetailResponse, BatchResponse, BeginReviewRequest, CloseBatchRequest,
    ClosureResponse, CompleteReviewRequest, CreateBatchRequest,
};
use crate::dto::claims::{
    AddItemRequest, ClaimItemResponse, ClaimResponse, CreateClaimRequest, ReviewClaimRequest,
    ReviewItemRequest,
};
use crate::error::ApiError;
use crate::AppState;

/// Creates a batch in draft for a facility and period
pub async fn create_batch(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateBatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let period = DateRange::new(request.period_start, request.period_end)?;
    let currency = request.currency.unwrap_or(state.config.currency);
    let batch = Batch::create(
        FacilityId::from_uuid(request.facility_id),
        period,
        currency,
        &actor,
    )?;

    let response = BatchResponse::from(&batch);
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

/// Lists batches in creation order
pub async fn list_batches(
    State(state): State<AppState>,
) -> Result<Json<Vec<BatchResponse>>, ApiError> {
    let batches = state.store.batches().await;
    Ok(Json(batches.iter().map(BatchResponse::from).collect()))
}

/// Gets a batch with its claims
pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchDetailResponse>, ApiError> {
    let batch = load_batch(&state, id).await?;
    Ok(Json(BatchDetailResponse::from(&batch)))
}

/// Opens a draft batch for claim capture
pub async fn open_batch(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchResponse>, ApiError> {
    let mut batch = load_batch(&state, id).await?;
    batch.open(&actor)?;

    let response = BatchResponse::from(&batch);
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

/// Captures a discharge form as a claim in the batch
pub async fn add_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;

    let mut batch = load_batch(&state, id).await?;
    let form = request.into_discharge_form(batch.currency());
    let claim = batch.add_claim(form, &actor)?;

    let response = ClaimResponse::from(claim);
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

/// Attaches a line item to a captured claim
pub async fn add_claim_item(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((id, claim_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<ClaimItemResponse>, ApiError> {
    request.validate()?;

    let mut batch = load_batch(&state, id).await?;
    let unit_cost = Money::new(request.unit_cost, batch.currency());
    let standard_cost = request
        .standard_cost
        .map(|amount| Money::new(amount, batch.currency()));
    let item = batch.add_claim_item(
        ClaimId::from_uuid(claim_id),
        request.category,
        request.description,
        request.quantity,
        unit_cost,
        standard_cost,
        &actor,
    )?;

    let response = ClaimItemResponse::from(item);
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

/// Submits the batch for verification
pub async fn submit_batch(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchResponse>, ApiError> {
    let mut batch = load_batch(&state, id).await?;
    batch.submit(&actor)?;

    let response = BatchResponse::from(&batch);
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

/// Assigns a TPA and starts the review
pub async fn begin_review(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<BeginReviewRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let mut batch = load_batch(&state, id).await?;
    batch.begin_review(TpaId::from_uuid(request.tpa_id), &actor)?;

    let response = BatchResponse::from(&batch);
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

/// Applies the reviewer's decision to one claim
pub async fn review_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((id, claim_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ReviewClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let mut batch = load_batch(&state, id).await?;
    let approved_cost = request
        .approved_cost
        .map(|amount| Money::new(amount, batch.currency()));
    let review = ClaimReview::resolve(
        request.decision,
        request.declared_status,
        approved_cost,
        request.rejection_reason,
        request.remarks,
        &actor,
    )?;

    let claim_id = ClaimId::from_uuid(claim_id);
    batch.review_claim(claim_id, review, &actor)?;

    let response = batch
        .claim(claim_id)
        .map(ClaimResponse::from)
        .ok_or_else(|| ApiError::Internal("Reviewed claim not found".to_string()))?;
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

/// Applies an item-level review to a claim
pub async fn review_claim_item(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((id, claim_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(request): Json<ReviewItemRequest>,
) -> Result<Json<ClaimItemResponse>, ApiError> {
    let mut batch = load_batch(&state, id).await?;
    let review = ItemReview {
        status: request.status,
        approved_quantity: request.approved_quantity,
        approved_unit_cost: request
            .approved_unit_cost
            .map(|amount| Money::new(amount, batch.currency())),
        rejection_reason: request.rejection_reason,
    };

    let claim_id = ClaimId::from_uuid(claim_id);
    let item_id = ClaimItemId::from_uuid(item_id);
    batch.review_claim_item(claim_id, item_id, review, &actor)?;

    let response = batch
        .claim(claim_id)
        .and_then(|claim| claim.items.iter().find(|item| item.id == item_id))
        .map(ClaimItemResponse::from)
        .ok_or_else(|| ApiError::Internal("Reviewed item not found".to_string()))?;
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

/// Records the batch-level outcome of a finished review
pub async fn complete_review(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteReviewRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let outcome = match request.outcome.as_str() {
        "approved" => ReviewOutcome::Approved {
            remarks: request.remarks,
        },
        "rejected" => ReviewOutcome::Rejected {
            reason: request.reason.unwrap_or_default(),
        },
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unknown review outcome: {other}"
            )))
        }
    };

    let mut batch = load_batch(&state, id).await?;
    batch.complete_review(outcome, &actor)?;

    let response = BatchResponse::from(&batch);
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

/// Closes the batch with payment advice
///
/// Closure persists the payment-summary record, opens the disbursement
/// ledger entry, and fans closure notices out to the parties involved.
pub async fn close_batch(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<CloseBatchRequest>,
) -> Result<Json<ClosureResponse>, ApiError> {
    let mut batch = load_batch(&state, id).await?;
    let forwarding_letter = request
        .forwarding_letter
        .map(|upload| DocumentRef::new(upload.file_name, upload.label, actor.id()))
        .transpose()?;
    let advice = PaymentAdvice {
        review_summary: request.review_summary,
        paid_amount: Money::new(request.paid_amount, batch.currency()),
        beneficiaries_paid: request.beneficiaries_paid,
        payment_date: request.payment_date,
        justification: request.justification,
        signature: request.signature,
        forwarding_letter,
    };

    let report = state
        .closure
        .close_batch(&mut batch, advice.clone(), &actor)
        .await?;
    let summary = PaymentSummary::record(&batch, &advice, &actor)?;
    state.store.add_summary(summary).await;
    state.store.record_closure(&batch).await?;

    let response = ClosureResponse::from(&report);
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

/// Confirms that the closed batch's payment went out
pub async fn confirm_disbursement(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchResponse>, ApiError> {
    let mut batch = load_batch(&state, id).await?;
    state
        .closure
        .confirm_disbursement(&mut batch, &actor)
        .await?;

    let paid = batch
        .paid_amount()
        .ok_or_else(|| ApiError::Internal("Closed batch has no paid amount".to_string()))?;
    state.store.confirm_disbursement(batch.id(), paid).await?;

    let response = BatchResponse::from(&batch);
    state.store.put_batch(batch).await;
    Ok(Json(response))
}

pub(crate) async fn load_batch(state: &AppState, id: Uuid) -> Result<Batch, ApiError> {
    let batch_id = BatchId::from_uuid(id);
    state
        .store
        .batch(batch_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Batch {batch_id} not found")))
}
