use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, middleware::Next};
use serde_json::json;

use crate::api::AppState;

/// Paths that don't require authentication. Logout is public so a client
/// holding an expired token can still clear its cookie.
const PUBLIC_PATHS: &[&str] = &[
    "/accounts/users/register",
    "/accounts/users/login",
    "/accounts/users/logout",
];

/// Cookie set by login; checked when no Authorization header is present.
pub(crate) const ACCESS_COOKIE: &str = "access_token";

/// JWT authentication middleware.
///
/// Accepts a Bearer token in the Authorization header or the HTTP-only
/// `access_token` cookie, in that order. If valid, stores Claims as an
/// Extension for handlers; authorization itself happens per-handler via
/// the guard.
pub async fn auth_middleware(
    State(svc): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    if is_public_path(&path) {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers())
        .or_else(|| extract_cookie(req.headers(), ACCESS_COOKIE))
    {
        Some(t) => t.to_string(),
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "missing credentials"})),
            )
                .into_response();
        }
    };

    // Role-bearing access tokens only; refresh tokens don't pass here.
    match svc.verify_token_with_role(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Extract the Bearer token from Authorization header.
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Extract a named cookie value from the Cookie header.
fn extract_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (k, v) = pair.trim().split_once('=')?;
                (k == name).then_some(v)
            })
        })
}

/// Check if a path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|p| path == *p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));

        headers.insert("authorization", "Basic xyz".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            "sid=1; access_token=abc.def.ghi; theme=dark".parse().unwrap(),
        );
        assert_eq!(extract_cookie(&headers, ACCESS_COOKIE), Some("abc.def.ghi"));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/accounts/users/login"));
        assert!(is_public_path("/accounts/users/register"));
        assert!(is_public_path("/accounts/users/logout"));
        assert!(!is_public_path("/accounts/users/me"));
        assert!(!is_public_path("/accounts/users"));
    }
}
