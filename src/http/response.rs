//! Error responses produced by the dispatcher.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::routing::verb::HttpVerb;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

/// Plain-text 404.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// `{"error":"404","message":"Not Found"}`, used under the API prefix.
pub fn json_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "404",
            message: "Not Found",
        }),
    )
        .into_response()
}

/// 405 with an `Allow` header listing `allowed`.
pub fn method_not_allowed(allowed: &[HttpVerb]) -> Response {
    let allow = allowed
        .iter()
        .map(HttpVerb::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let mut response = (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}
