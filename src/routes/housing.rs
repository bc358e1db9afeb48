use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{validate_suitability, ListingFilter, RankingEngine, Summarizer};
use crate::models::{
    ErrorResponse, FilterListingsRequest, FilterListingsResponse, HealthResponse, RankResponsesRequest,
    RankResponsesResponse, RegionRequest, RequestersResponse,
};
use crate::services::RankingStore;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub listing_filter: ListingFilter,
    pub ranking: RankingEngine,
    pub summarizer: Summarizer,
    /// Roster and ranking persistence, when a database is configured
    pub store: Option<Arc<RankingStore>>,
}

/// Configure all accommodation search routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/region", web::post().to(compute_region))
        .route("/listings/filter", web::post().to(filter_listings))
        .route("/responses/rank", web::post().to(rank_responses))
        .route("/requesters", web::get().to(list_requesters))
        .route("/rankings/{requester}", web::get().to(latest_ranking));
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: field_errors={:?}", errors);
    error_response(
        actix_web::http::StatusCode::BAD_REQUEST,
        "Validation failed",
        errors.to_string(),
    )
}

fn store_unavailable() -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
        "Storage not configured",
        "No database URL is configured".to_string(),
    )
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database = match &state.store {
        Some(store) => Some(store.health_check().await.unwrap_or(false)),
        None => None,
    };

    let status = if database == Some(false) { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        database,
        enhanced_summaries: state.summarizer.is_enhanced(),
    })
}

/// Search region endpoint
///
/// POST /api/v1/region
///
/// Request body:
/// ```json
/// {
///   "zipCode": "10115",
///   "city": "Berlin",
///   "state": "Berlin",
///   "minRadiusKm": 20,
///   "maxRadiusKm": 35
/// }
/// ```
async fn compute_region(state: web::Data<AppState>, req: web::Json<RegionRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let region = state
        .listing_filter
        .region_calculator()
        .compute_search_region(
            &req.zip_code,
            &req.city,
            req.state.as_deref(),
            req.min_radius_km,
            req.max_radius_km,
        )
        .await;

    HttpResponse::Ok().json(region)
}

/// Listing screening endpoint
///
/// POST /api/v1/listings/filter
///
/// Runs region, deduplication and filtering for one requester. Accepted
/// listings that look unsuitable for shared accommodation are reported
/// alongside but not removed.
async fn filter_listings(
    state: web::Data<AppState>,
    req: web::Json<FilterListingsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let FilterListingsRequest { requester, listings } = req.into_inner();

    tracing::info!(requester = %requester.name, "Screening {} listings", listings.len());

    let report = state.listing_filter.screen(&requester, listings).await;

    let unsuitable = report
        .valid
        .iter()
        .filter(|candidate| !validate_suitability(candidate))
        .map(|candidate| candidate.url.clone())
        .collect();

    HttpResponse::Ok().json(FilterListingsResponse { report, unsuitable })
}

/// Response ranking endpoint
///
/// POST /api/v1/responses/rank
///
/// Ranks the extracted landlord responses, writes the summary and, when
/// `persist` is set and a database is configured, stores the result.
async fn rank_responses(
    state: web::Data<AppState>,
    req: web::Json<RankResponsesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let RankResponsesRequest { requester, responses, persist } = req.into_inner();

    let outcome = state.ranking.rank_results(responses, &requester);
    let summary = state.summarizer.summarize(&outcome.results, &requester).await;

    let ranking_id = match (&state.store, persist) {
        (Some(store), true) => match store.save_ranking(&requester, &outcome.results, &summary).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(requester = %requester.name, "Failed to persist ranking: {}", e);
                return error_response(
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to persist ranking",
                    e.to_string(),
                );
            }
        },
        (None, true) => {
            tracing::warn!(requester = %requester.name, "Persist requested without a database, skipping");
            None
        }
        _ => None,
    };

    HttpResponse::Ok().json(RankResponsesResponse::new(outcome, summary, ranking_id))
}

/// Active roster endpoint
///
/// GET /api/v1/requesters
async fn list_requesters(state: web::Data<AppState>) -> impl Responder {
    let Some(store) = &state.store else {
        return store_unavailable();
    };

    match store.fetch_requesters().await {
        Ok(requesters) => {
            let total = requesters.len();
            HttpResponse::Ok().json(RequestersResponse { requesters, total })
        }
        Err(e) => {
            tracing::error!("Failed to fetch requesters: {}", e);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch requesters",
                e.to_string(),
            )
        }
    }
}

/// Latest stored ranking endpoint
///
/// GET /api/v1/rankings/{requester}
async fn latest_ranking(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let Some(store) = &state.store else {
        return store_unavailable();
    };

    let requester_name = path.into_inner();

    match store.latest_ranking(&requester_name).await {
        Ok(Some(ranking)) => HttpResponse::Ok().json(ranking),
        Ok(None) => error_response(
            actix_web::http::StatusCode::NOT_FOUND,
            "Not found",
            format!("No ranking stored for {}", requester_name),
        ),
        Err(e) => {
            tracing::error!(requester = %requester_name, "Failed to fetch ranking: {}", e);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch ranking",
                e.to_string(),
            )
        }
    }
}
