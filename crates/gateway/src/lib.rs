//! HTTP surface: REST routes, authentication middleware, and the
//! JSON-normalizing proxy.

pub mod error;
pub mod middleware;
pub mod proxy;
pub mod rest;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::GatewayState;

use axum::{
    http::{header, Method},
    middleware as axum_middleware,
    routing::{any, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        rest::health::health,
        rest::auth::register,
        rest::auth::login,
        rest::auth::verify,
        rest::auth::logout,
        rest::todos::create,
        rest::todos::list,
        rest::todos::show,
        rest::todos::update,
        rest::todos::complete,
        rest::todos::remove,
        rest::chat::send,
        rest::chat::conversations,
        rest::chat::messages,
    ),
    components(schemas(
        rest::health::HealthResponse,
        rest::auth::CredentialsRequest,
        rest::auth::UserResponse,
        rest::auth::SessionResponse,
        rest::auth::SessionSummary,
        rest::auth::VerifyResponse,
        rest::todos::CreateTodoRequest,
        rest::todos::UpdateTodoRequest,
        rest::todos::TodoResponse,
        rest::chat::ChatRequest,
        rest::chat::ChatResponse,
        rest::chat::ActionResponse,
        rest::chat::ConversationResponse,
        rest::chat::MessageResponse,
    )),
    modifiers(&BearerAuth),
    info(title = "Tasklane API", description = "Todo backend with a chat assistant")
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .build(),
                ),
            );
        }
    }
}

/// Assemble the full application router.
pub fn create_router(state: Arc<GatewayState>) -> Router {
    let public = Router::new()
        .route("/api/health", get(rest::health::health))
        .route("/api/auth/register", post(rest::auth::register))
        .route("/api/auth/login", post(rest::auth::login))
        .route("/api-docs/openapi.json", get(openapi_spec))
        .route("/proxy/*path", any(proxy::forward));

    let protected = Router::new()
        .route("/api/auth/verify", get(rest::auth::verify))
        .route("/api/auth/logout", post(rest::auth::logout))
        .route(
            "/api/todos",
            get(rest::todos::list).post(rest::todos::create),
        )
        .route(
            "/api/todos/:id",
            get(rest::todos::show)
                .put(rest::todos::update)
                .delete(rest::todos::remove),
        )
        .route("/api/todos/:id/complete", post(rest::todos::complete))
        .route("/api/chat", post(rest::chat::send))
        .route("/api/conversations", get(rest::chat::conversations))
        .route(
            "/api/conversations/:id/messages",
            get(rest::chat::messages),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
