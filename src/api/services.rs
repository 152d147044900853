use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{debug, info};

use super::{error::ApiError, state::AppState, validation::parse_package};
use crate::carriers::{CarriersError, DeliveryOption};

/// Delivery options endpoint (GET /delivery-options)
///
/// ## Flow:
/// 1. Decode the query string and parse width, height, depth and weight
/// 2. Reject the request with 400 if any is missing or not an integer
/// 3. Ask every registered carrier for options
/// 4. Return the merged options, or 404 when no carrier offered any
pub async fn delivery_options(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<DeliveryOption>>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::MalformedQuery(e.body_text()))?;

    let package = parse_package(&params).map_err(|errors| {
        debug!(
            missing = ?errors.missing,
            malformed = ?errors.malformed,
            "Rejecting delivery options request"
        );
        ApiError::BadParameters(errors)
    })?;

    let options = state.carriers.query(&package).await.map_err(|e| match e {
        CarriersError::NoOffersFound => ApiError::NoOptions {
            carriers: state.carriers.len(),
        },
        other => ApiError::Internal(other.to_string()),
    })?;

    info!(
        width = package.width,
        height = package.height,
        depth = package.depth,
        weight = package.weight,
        options = options.len(),
        "Delivery options quoted"
    );

    Ok(Json(options))
}

/// Liveness check (GET /healthz)
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Prometheus scrape endpoint (GET /metrics)
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .metrics
        .encode()
        .map_err(|e| ApiError::Internal(format!("failed to encode metrics: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
