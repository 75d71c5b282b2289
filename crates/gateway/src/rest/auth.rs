//! Registration, login, and session endpoints.

use crate::error::ApiResult;
use crate::middleware::{CurrentSession, CurrentUser};
use crate::state::GatewayState;
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSummary {
    pub expires_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub user: UserResponse,
    pub session: SessionSummary,
}

impl From<tasklane_auth::User> for UserResponse {
    fn from(user: tasklane_auth::User) -> Self {
        Self {
            id: user.public_id,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid email, weak password, or duplicate account")
    )
)]
pub async fn register(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .authenticator
        .register_with_password(&request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state
        .authenticator
        .login_with_password(&request.email, &request.password)
        .await?;

    Ok(Json(SessionResponse {
        token: session.token,
        expires_at: session.expires_at.to_rfc3339(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Missing, unknown, or expired token")
    ),
    security(("bearer_token" = []))
)]
pub async fn verify(
    Extension(user): Extension<CurrentUser>,
    Extension(session): Extension<CurrentSession>,
) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        user: UserResponse {
            id: user.public_id,
            email: user.email,
            display_name: user.display_name,
        },
        session: SessionSummary {
            expires_at: session.expires_at,
        },
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_token" = []))
)]
pub async fn logout(
    State(state): State<Arc<GatewayState>>,
    Extension(session): Extension<CurrentSession>,
) -> ApiResult<StatusCode> {
    state.authenticator.logout(&session.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
