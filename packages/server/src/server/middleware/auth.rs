//! Bearer identity middleware.
//!
//! The deployment fronts this service with a gateway that authenticates the
//! caller and forwards the resolved user id as the bearer token. This
//! middleware turns that resolved identity into an `AuthUser` request
//! extension; the core trusts it. No credentials are verified here.

use axum::extract::Request;
use axum::http::{request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{middleware::Next, Json};
use serde_json::json;
use tracing::debug;

use crate::common::UserId;

/// Resolved actor identity for the current request.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Rejection for handlers that require an identity.
pub struct AuthRequired;

impl IntoResponse for AuthRequired {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "authentication_required",
                "message": "missing or invalid bearer identity",
            })),
        )
            .into_response()
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or(AuthRequired)
    }
}

/// Identity middleware
///
/// Reads the Authorization header and adds AuthUser to request extensions.
/// Without a resolvable identity the request continues unauthenticated;
/// handlers that extract `AuthUser` reject it with 401.
pub async fn bearer_identity_middleware(mut request: Request, next: Next) -> Response {
    if let Some(user) = resolve_identity(&request) {
        debug!(user_id = %user.user_id, "resolved request identity");
        request.extensions_mut().insert(user);
    } else {
        debug!("no resolvable identity on request");
    }

    next.run(request).await
}

fn resolve_identity(request: &Request) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Handle both "Bearer <token>" and raw token
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let user_id = UserId::parse(token).ok()?;
    Some(AuthUser { user_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn resolves_bearer_token() {
        let user_id = UserId::new();
        let request = axum::http::Request::builder()
            .header("authorization", format!("Bearer {}", user_id))
            .body(Body::empty())
            .unwrap();
        let auth = resolve_identity(&request).unwrap();
        assert_eq!(auth.user_id, user_id);
    }

    #[test]
    fn resolves_raw_token() {
        let user_id = UserId::new();
        let request = axum::http::Request::builder()
            .header("authorization", user_id.to_string())
            .body(Body::empty())
            .unwrap();
        assert!(resolve_identity(&request).is_some());
    }

    #[test]
    fn rejects_garbage_token() {
        let request = axum::http::Request::builder()
            .header("authorization", "Bearer not-a-user-id")
            .body(Body::empty())
            .unwrap();
        assert!(resolve_identity(&request).is_none());
    }
}
