//! Bearer-token authentication middleware.

use crate::error::ApiError;
use crate::state::GatewayState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Identity of the authenticated caller, inserted into request extensions
/// by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub public_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// The session the request authenticated with. The token lets logout
/// revoke exactly this session; the expiry is reported by `verify`.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
    pub expires_at: String,
}

pub async fn require_auth(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::AuthenticationFailed("missing bearer token".to_string()))?;

    let (user, session) = state.authenticator.authenticate_token(&token).await?;
    debug!(user = %user.public_id, "authenticated request");

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        public_id: user.public_id,
        email: user.email,
        display_name: user.display_name,
    });
    request.extensions_mut().insert(CurrentSession {
        token: session.token,
        expires_at: session.expires_at.to_rfc3339(),
    });

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("Bearer abc123");
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert!(bearer_token(&headers_with("Basic abc123")).is_none());
        assert!(bearer_token(&headers_with("Bearer ")).is_none());
        assert!(bearer_token(&HeaderMap::new()).is_none());
    }
}
