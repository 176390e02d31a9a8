use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    middleware::cors::{is_preflight, ALLOWED_METHODS},
    models::clock::{ClockQuery, PostClockResponse},
    services::clocks::{ClockError, ClockService},
    AppState,
};

/// GET /?clock_id=<id>
pub async fn get_clock(
    State(state): State<AppState>,
    Query(query): Query<ClockQuery>,
) -> Result<Json<serde_json::Value>, ClockError> {
    ClockService::fetch(
        state.store.as_ref(),
        &state.config.key_prefix,
        query.clock_id.as_deref(),
    )
    .await
    .map(Json)
}

/// POST / with a JSON body. The body is read raw so that every malformed
/// payload maps to the same 400.
pub async fn post_clock(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PostClockResponse>, ClockError> {
    ClockService::save(
        state.store.as_ref(),
        &state.config.key_prefix,
        &body,
        chrono::Utc::now(),
    )
    .await
    .map(Json)
}

pub async fn options_clock(headers: HeaderMap) -> Response {
    if is_preflight(&headers) {
        StatusCode::OK.into_response()
    } else {
        (StatusCode::OK, [(header::ALLOW, ALLOWED_METHODS)]).into_response()
    }
}

pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
