use axum::{
    body::{Body, HttpBody},
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, response::log_app_error};

/// Gives framework-generated error responses (404 for unknown paths, 405,
/// 408 on timeout) a plain-text body naming the status. Responses that
/// already carry a body pass through untouched.
pub async fn plain_error_middleware(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let status = response.status();

    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    if response.body().size_hint().exact() != Some(0) {
        return response;
    }

    let message = default_message(status);
    if status.is_server_error() {
        log_app_error(&AppError::internal(message.clone()), status);
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    Response::from_parts(parts, Body::from(message))
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
