//! Restricted-access middleware.
//! Admits only script-initiated requests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};

use super::RouteMiddleware;

pub const X_REQUESTED_WITH: &str = "x-requested-with";
pub const X_PJAX: &str = "x-pjax";
const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

/// Rejects with 405 unless the request is XHR (`X-Requested-With: XMLHttpRequest`)
/// or PJAX (`X-PJAX` set to anything but empty or `0`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RestrictedMiddleware;

impl RouteMiddleware for RestrictedMiddleware {
    fn check(&self, request: &Request<Body>) -> Result<(), Response> {
        let is_xhr = header(request, X_REQUESTED_WITH)
            .is_some_and(|v| v.eq_ignore_ascii_case(XML_HTTP_REQUEST));
        let is_pjax = header(request, X_PJAX).is_some_and(|v| !v.is_empty() && v != "0");

        if is_xhr || is_pjax {
            Ok(())
        } else {
            tracing::debug!(path = %request.uri().path(), "Restricted route called without XHR or PJAX header");
            Err((StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response())
        }
    }
}

fn header<'r>(request: &'r Request<Body>, name: &str) -> Option<&'r str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_header() {
        let plain = Request::new(Body::empty());
        let rejected = RestrictedMiddleware.check(&plain).unwrap_err();
        assert_eq!(rejected.status(), StatusCode::METHOD_NOT_ALLOWED);

        let xhr = Request::builder()
            .header("X-Requested-With", "XMLHttpRequest")
            .body(Body::empty())
            .unwrap();
        assert!(RestrictedMiddleware.check(&xhr).is_ok());
    }

    #[test]
    fn test_admits_pjax() {
        let pjax = Request::builder()
            .header("X-PJAX", "true")
            .body(Body::empty())
            .unwrap();
        assert!(RestrictedMiddleware.check(&pjax).is_ok());

        let off = Request::builder()
            .header("X-PJAX", "0")
            .body(Body::empty())
            .unwrap();
        assert!(RestrictedMiddleware.check(&off).is_err());
    }
}
