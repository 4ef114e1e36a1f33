//! Response construction.
//!
//! # Design Decisions
//! - Clients only ever see a redirect, a 404 or a 400
//! - Error bodies are fixed plain-text strings; details stay in the logs
//! - Redirects have an empty body

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

pub const NOT_FOUND_BODY: &str = "404 Not found.\n";
pub const MALFORMED_DESTINATION_BODY: &str = "400 Malformed destination.\n";

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

pub fn malformed_destination() -> Response {
    (StatusCode::BAD_REQUEST, MALFORMED_DESTINATION_BODY).into_response()
}

/// Redirect to `location` with the rule's status.
///
/// Falls back to a malformed destination response if `location` can't be a
/// header value, which a resolved destination never is.
pub fn redirect(status: u16, location: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::FOUND);
    let Ok(location) = HeaderValue::from_str(location) else {
        return malformed_destination();
    };

    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response.headers_mut().insert(header::LOCATION, location);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect() {
        let response = redirect(308, "https://x.com/");

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "https://x.com/");
    }

    #[test]
    fn test_redirect_with_unusable_location() {
        let response = redirect(302, "https://x.com/\r\n");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(malformed_destination().status(), StatusCode::BAD_REQUEST);
    }
}
