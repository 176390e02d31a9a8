pub mod clocks;
pub mod health;
pub mod metrics;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{middleware::cors::apply_cors, AppState};

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route(
            "/",
            get(clocks::get_clock)
                .post(clocks::post_clock)
                .options(clocks::options_clock)
                .head(clocks::method_not_allowed)
                .fallback(clocks::method_not_allowed),
        )
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .layer(middleware::from_fn_with_state(state.clone(), apply_cors))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
