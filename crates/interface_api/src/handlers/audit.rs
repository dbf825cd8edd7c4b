//! Audit handlers
//!
//! An audit run is pure: it snapshots the requested batches, scans
//! them, and returns the report. Findings only reach the error log when
//! the caller asks for them to be stored.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{Actor, BatchId, ClaimId, ErrorLogId};
use domain_audit::{ClaimSnapshot, ErrorLogEntry};

use crate::dto::audit::{
    AuditRunResponse, ErrorLogEntryResponse, IgnoreEntryRequest, ResolveEntryRequest,
    RunAuditRequest,
};
use crate::error::ApiError;
use crate::AppState;

/// Runs the audit engine over the claims of the named batches
pub async fn run_audit(
    State(state): State<AppState>,
    Json(request): Json<RunAuditRequest>,
) -> Result<Json<AuditRunResponse>, ApiError> {
    if request.batch_ids.is_empty() {
        return Err(ApiError::Validation(
            "At least one batch id is required".to_string(),
        ));
    }

    let mut snapshots = Vec::new();
    let mut batch_of: HashMap<ClaimId, BatchId> = HashMap::new();
    for id in &request.batch_ids {
        let batch_id = BatchId::from_uuid(*id);
        let batch = state
            .store
            .batch(batch_id)
            .await
            .ok_or_else(|| ApiError::NotFound(format!("Batch {batch_id} not found")))?;
        for claim in batch.claims() {
            batch_of.insert(claim.id, batch_id);
            snapshots.push(ClaimSnapshot::from(claim));
        }
    }

    let report = state.audit.run(&snapshots);

    let findings_stored = if request.store_findings && !report.flags.is_empty() {
        let entries: Vec<ErrorLogEntry> = report
            .flags
            .iter()
            .map(|flag| ErrorLogEntry::from_flag(flag, batch_of.get(&flag.claim_id).copied()))
            .collect();
        state.store.add_log_entries(entries).await
    } else {
        0
    };

    tracing::info!(
        claims_audited = report.claims_audited,
        flags_raised = report.flags.len(),
        findings_stored,
        "audit run complete"
    );
    Ok(Json(AuditRunResponse::new(&report, findings_stored)))
}

/// Lists the error log, newest first
pub async fn list_log_entries(
    State(state): State<AppState>,
) -> Result<Json<Vec<ErrorLogEntryResponse>>, ApiError> {
    let entries = state.store.log_entries().await;
    Ok(Json(
        entries.iter().map(ErrorLogEntryResponse::from).collect(),
    ))
}

/// Gets one error-log entry
pub async fn get_log_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ErrorLogEntryResponse>, ApiError> {
    let entry = load_entry(&state, id).await?;
    Ok(Json(ErrorLogEntryResponse::from(&entry)))
}

/// Moves an open entry under review
pub async fn begin_entry_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ErrorLogEntryResponse>, ApiError> {
    let mut entry = load_entry(&state, id).await?;
    entry.begin_review()?;

    let response = ErrorLogEntryResponse::from(&entry);
    state.store.put_log_entry(entry).await;
    Ok(Json(response))
}

/// Closes an entry with a written conclusion
pub async fn resolve_entry(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveEntryRequest>,
) -> Result<Json<ErrorLogEntryResponse>, ApiError> {
    let mut entry = load_entry(&state, id).await?;
    entry.resolve(request.note, &actor)?;

    let response = ErrorLogEntryResponse::from(&entry);
    state.store.put_log_entry(entry).await;
    Ok(Json(response))
}

/// Dismisses an entry as not worth pursuing
pub async fn ignore_entry(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<IgnoreEntryRequest>,
) -> Result<Json<ErrorLogEntryResponse>, ApiError> {
    let mut entry = load_entry(&state, id).await?;
    entry.ignore(request.note, &actor)?;

    let response = ErrorLogEntryResponse::from(&entry);
    state.store.put_log_entry(entry).await;
    Ok(Json(response))
}

async fn load_entry(state: &AppState, id: Uuid) -> Result<ErrorLogEntry, ApiError> {
    let entry_id = ErrorLogId::from_uuid(id);
    state
        .store
        .log_entry(entry_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Error-log entry {entry_id} not found")))
}
