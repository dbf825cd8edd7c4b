//! Payment handlers
//!
//! Covers the money trail after closure: reimbursements released to
//! TPAs, per-batch payment summaries, and the scheme-wide disbursement
//! ledger.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{Actor, BatchId, DocumentRef, Money, ReimbursementId, TpaId};
use domain_batch::Batch;
use domain_payment::Reimbursement;

use crate::dto::payments::{
    AdvanceReimbursementRequest, AttachDocumentRequest, CreateReimbursementRequest,
    DocumentResponse, LedgerResponse, PaymentSummaryResponse, ReimbursementResponse,
};
use crate::error::ApiError;
use crate::AppState;

/// Creates a reimbursement covering one or more closed batches
pub async fn create_reimbursement(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateReimbursementRequest>,
) -> Result<Json<ReimbursementResponse>, ApiError> {
    let mut batches: Vec<Batch> = Vec::with_capacity(request.batch_ids.len());
    for id in &request.batch_ids {
        let batch_id = BatchId::from_uuid(*id);
        let batch = state
            .store
            .batch(batch_id)
            .await
            .ok_or_else(|| ApiError::NotFound(format!("Batch {batch_id} not found")))?;
        batches.push(batch);
    }
    let covered: Vec<&Batch> = batches.iter().collect();

    let amount = Money::new(request.amount, state.config.currency);
    let reimbursement = Reimbursement::create(
        TpaId::from_uuid(request.tpa_id),
        &covered,
        amount,
        request.purpose,
        &actor,
    )?;

    let response = ReimbursementResponse::from(&reimbursement);
    state.store.put_reimbursement(reimbursement).await;
    Ok(Json(response))
}

/// Lists reimbursements in creation order
pub async fn list_reimbursements(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReimbursementResponse>>, ApiError> {
    let reimbursements = state.store.reimbursements().await;
    Ok(Json(
        reimbursements
            .iter()
            .map(ReimbursementResponse::from)
            .collect(),
    ))
}

/// Gets one reimbursement
pub async fn get_reimbursement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReimbursementResponse>, ApiError> {
    let reimbursement = load_reimbursement(&state, id).await?;
    Ok(Json(ReimbursementResponse::from(&reimbursement)))
}

/// Moves a reimbursement along its workflow
pub async fn advance_reimbursement(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdvanceReimbursementRequest>,
) -> Result<Json<ReimbursementResponse>, ApiError> {
    let mut reimbursement = load_reimbursement(&state, id).await?;

    match request.action.as_str() {
        "process" => reimbursement.mark_processed(&actor)?,
        "complete" => reimbursement.mark_completed(&actor)?,
        "dispute" => reimbursement.dispute(request.note.unwrap_or_default(), &actor)?,
        "cancel" => reimbursement.cancel(request.note, &actor)?,
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unknown reimbursement action: {other}"
            )))
        }
    }

    let response = ReimbursementResponse::from(&reimbursement);
    state.store.put_reimbursement(reimbursement).await;
    Ok(Json(response))
}

/// Attaches a supporting document, such as a transfer receipt
pub async fn attach_document(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<AttachDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let mut reimbursement = load_reimbursement(&state, id).await?;

    let document = DocumentRef::new(request.file_name, request.label, actor.id())?;
    let attached = reimbursement.attach_document(document, &actor)?;

    let response = DocumentResponse::from(attached);
    state.store.put_reimbursement(reimbursement).await;
    Ok(Json(response))
}

/// Gets the payment summary recorded when a batch closed
pub async fn get_payment_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentSummaryResponse>, ApiError> {
    let batch_id = BatchId::from_uuid(id);
    let summary = state
        .store
        .summary_for_batch(batch_id)
        .await
        .ok_or_else(|| {
            ApiError::NotFound(format!("No payment summary recorded for batch {batch_id}"))
        })?;
    Ok(Json(PaymentSummaryResponse::from(&summary)))
}

/// Gets the scheme-wide disbursement ledger with its totals
pub async fn get_ledger(State(state): State<AppState>) -> Result<Json<LedgerResponse>, ApiError> {
    let ledger = state.store.ledger().await;
    Ok(Json(LedgerResponse::try_from_ledger(&ledger)?))
}

async fn load_reimbursement(state: &AppState, id: Uuid) -> Result<Reimbursement, ApiError> {
    let reimbursement_id = ReimbursementId::from_uuid(id);
    state
        .store
        .reimbursement(reimbursement_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Reimbursement {reimbursement_id} not found")))
}
