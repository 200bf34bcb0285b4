use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{DiscoverRequest, DiscoveryError, DiscoveryOrchestrator};
use crate::models::{DiscoverHttpRequest, DiscoverResponse, ErrorResponse, HealthResponse};
use crate::services::CoreApiClient;

/// The orchestrator as wired in production: all four collaborators reached
/// through the core app gateway.
pub type Engine =
    DiscoveryOrchestrator<CoreApiClient, CoreApiClient, CoreApiClient, CoreApiClient>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    /// Applied when the caller does not supply a deadline of its own.
    pub default_deadline: Option<Duration>,
}

/// Configure all discovery routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/discover", web::post().to(discover_json))
        .route("/discover/form", web::post().to(discover_form));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Discover endpoint, JSON body
///
/// POST /api/v1/discover
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 20,
///   "offset": 0,
///   "sort": "compatibility",
///   "deadlineMs": 2000
/// }
/// ```
async fn discover_json(
    state: web::Data<AppState>,
    req: web::Json<DiscoverHttpRequest>,
) -> impl Responder {
    run_discover(&state, req.into_inner()).await
}

/// Discover endpoint, form-encoded body. Legacy clients post the same
/// fields form-encoded; both transports converge on one typed request.
///
/// POST /api/v1/discover/form
async fn discover_form(
    state: web::Data<AppState>,
    req: web::Form<DiscoverHttpRequest>,
) -> impl Responder {
    run_discover(&state, req.into_inner()).await
}

async fn run_discover(state: &AppState, req: DiscoverHttpRequest) -> HttpResponse {
    if let Err(errors) = req.validate() {
        tracing::info!(
            "Validation failed for discover request: userId={:?}, limit={}, errors={:?}",
            req.user_id,
            req.limit,
            errors
        );
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
            retryable: false,
        });
    }

    let deadline = req
        .deadline_ms
        .map(Duration::from_millis)
        .or(state.default_deadline);

    let request = DiscoverRequest {
        user_id: req.user_id,
        limit: req.limit as usize,
        offset: req.offset as usize,
        sort: req.sort,
        deadline,
    };

    tracing::info!(
        "Discovering for user {}: limit={}, offset={}, sort={:?}",
        request.user_id,
        request.limit,
        request.offset,
        request.sort
    );

    match state.engine.discover(&request).await {
        Ok(page) => {
            tracing::info!(
                "Returning {} of {} candidates for user {} (empty_reason={:?})",
                page.items.len(),
                page.total,
                request.user_id,
                page.empty_reason
            );
            HttpResponse::Ok().json(DiscoverResponse {
                items: page.items,
                total: page.total,
                empty_reason: page.empty_reason,
            })
        }
        Err(DiscoveryError::InvalidRequest(message)) => {
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_request".to_string(),
                message,
                status_code: 400,
                retryable: false,
            })
        }
        Err(DiscoveryError::DeadlineExceeded) => {
            tracing::warn!("Discovery deadline exceeded for user {}", request.user_id);
            HttpResponse::GatewayTimeout().json(ErrorResponse {
                error: "deadline_exceeded".to_string(),
                message: "collaborator reads did not complete in time".to_string(),
                status_code: 504,
                retryable: true,
            })
        }
        Err(DiscoveryError::Upstream(e)) => {
            tracing::error!("Upstream failure discovering for {}: {}", request.user_id, e);
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "upstream_failure".to_string(),
                message: e.to_string(),
                status_code: 502,
                retryable: true,
            })
        }
    }
}
