use std::{sync::Arc, time::Duration};

use axum::{Router, http::StatusCode, middleware};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{error::AppError, state::AppState};

use super::{
    middleware::{catch_panic_layer, plain_error_middleware},
    todo,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().merge(todo::router(state)).fallback(not_found)
}

/// The router with the full per-request middleware stack. Dropping the
/// handler future on timeout or client disconnect cancels any in-flight
/// store call with it.
pub fn app(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.general.request_timeout_secs);
    router(state)
        .layer(catch_panic_layer())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(middleware::from_fn(plain_error_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> AppError {
    AppError::not_found("404 page not found")
}
