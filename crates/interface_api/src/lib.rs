//! HTTP API Layer
//!
//! This crate provides the REST API for the claims portal core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each domain
//! - **Middleware**: Actor resolution, tracing, request logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Store**: In-memory persistence shared across handlers
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{config::ApiConfig, create_router};
//!
//! let app = create_router(ApiConfig::default());
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_audit::AuditEngine;
use domain_batch::ClosureService;

use crate::config::ApiConfig;
use crate::handlers::{audit, batches, health, payments};
use crate::middleware::{actor_middleware, request_log_middleware};
use crate::store::{LoggingNotificationSender, PortalStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PortalStore>,
    pub audit: Arc<AuditEngine>,
    pub closure: Arc<ClosureService>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(config: ApiConfig) -> Router {
    let store = Arc::new(PortalStore::new(config.currency));
    let audit_engine = Arc::new(AuditEngine::new(config.load_audit_config()));
    let closure = Arc::new(ClosureService::new(Arc::new(LoggingNotificationSender)));
    let state = AppState {
        store,
        audit: audit_engine,
        closure,
        config,
    };

    // Public routes (no actor required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Batch routes, claims and items are reached through their batch
    let batch_routes = Router::new()
        .route("/", post(batches::create_batch))
        .route("/", get(batches::list_batches))
        .route("/:id", get(batches::get_batch))
        .route("/:id/open", post(batches::open_batch))
        .route("/:id/claims", post(batches::add_claim))
        .route("/:id/claims/:claim_id/items", post(batches::add_claim_item))
        .route("/:id/submit", post(batches::submit_batch))
        .route("/:id/review", post(batches::begin_review))
        .route("/:id/claims/:claim_id/review", put(batches::review_claim))
        .route(
            "/:id/claims/:claim_id/items/:item_id/review",
            put(batches::review_claim_item),
        )
        .route("/:id/review/complete", post(batches::complete_review))
        .route("/:id/close", post(batches::close_batch))
        .route("/:id/disbursement", post(batches::confirm_disbursement))
        .route("/:id/payment-summary", get(payments::get_payment_summary));

    // Audit routes
    let audit_routes = Router::new()
        .route("/run", post(audit::run_audit))
        .route("/log", get(audit::list_log_entries))
        .route("/log/:id", get(audit::get_log_entry))
        .route("/log/:id/review", post(audit::begin_entry_review))
        .route("/log/:id/resolve", post(audit::resolve_entry))
        .route("/log/:id/ignore", post(audit::ignore_entry));

    // Reimbursement routes
    let reimbursement_routes = Router::new()
        .route("/", post(payments::create_reimbursement))
        .route("/", get(payments::list_reimbursements))
        .route("/:id", get(payments::get_reimbursement))
        .route("/:id/advance", post(payments::advance_reimbursement))
        .route("/:id/documents", post(payments::attach_document));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/batches", batch_routes)
        .nest("/audit", audit_routes)
        .nest("/reimbursements", reimbursement_routes)
        .route("/ledger", get(payments::get_ledger))
        .layer(axum_middleware::from_fn(request_log_middleware))
        .layer(axum_middleware::from_fn(actor_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
