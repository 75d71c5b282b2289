//! Thin typed client for the Tasklane REST API.

use anyhow::{anyhow, bail, Context};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionDto {
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyDto {
    pub user: UserDto,
    pub session: SessionSummaryDto,
}

#[derive(Debug, Deserialize)]
pub struct SessionSummaryDto {
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
pub struct TodoDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub due_date: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatDto {
    pub conversation_id: String,
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct ConversationDto {
    pub id: String,
    pub title: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageDto {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            http: Client::builder()
                .build()
                .context("building HTTP client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub async fn register(&self, email: &str, password: &str) -> anyhow::Result<UserDto> {
        self.request(
            Method::POST,
            "/api/auth/register",
            Some(json!({"email": email, "password": password})),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<SessionDto> {
        self.request(
            Method::POST,
            "/api/auth/login",
            Some(json!({"email": email, "password": password})),
        )
        .await
    }

    pub async fn logout(&self) -> anyhow::Result<()> {
        self.request_no_body(Method::POST, "/api/auth/logout").await
    }

    pub async fn whoami(&self) -> anyhow::Result<VerifyDto> {
        self.request(Method::GET, "/api/auth/verify", None).await
    }

    pub async fn create_todo(&self, body: Value) -> anyhow::Result<TodoDto> {
        self.request(Method::POST, "/api/todos", Some(body)).await
    }

    pub async fn list_todos(
        &self,
        status: Option<&str>,
        priority: Option<&str>,
    ) -> anyhow::Result<Vec<TodoDto>> {
        let mut path = "/api/todos".to_string();
        let mut params = Vec::new();
        if let Some(status) = status {
            params.push(format!("status={status}"));
        }
        if let Some(priority) = priority {
            params.push(format!("priority={priority}"));
        }
        if !params.is_empty() {
            path = format!("{path}?{}", params.join("&"));
        }
        self.request(Method::GET, &path, None).await
    }

    pub async fn get_todo(&self, id: &str) -> anyhow::Result<TodoDto> {
        self.request(Method::GET, &format!("/api/todos/{id}"), None)
            .await
    }

    pub async fn update_todo(&self, id: &str, body: Value) -> anyhow::Result<TodoDto> {
        self.request(Method::PUT, &format!("/api/todos/{id}"), Some(body))
            .await
    }

    pub async fn complete_todo(&self, id: &str) -> anyhow::Result<TodoDto> {
        self.request(Method::POST, &format!("/api/todos/{id}/complete"), None)
            .await
    }

    pub async fn delete_todo(&self, id: &str) -> anyhow::Result<()> {
        self.request_no_body(Method::DELETE, &format!("/api/todos/{id}"))
            .await
    }

    pub async fn chat(
        &self,
        conversation_id: Option<&str>,
        message: &str,
    ) -> anyhow::Result<ChatDto> {
        self.request(
            Method::POST,
            "/api/chat",
            Some(json!({"conversation_id": conversation_id, "message": message})),
        )
        .await
    }

    pub async fn conversations(&self) -> anyhow::Result<Vec<ConversationDto>> {
        self.request(Method::GET, "/api/conversations", None).await
    }

    pub async fn messages(&self, conversation_id: &str) -> anyhow::Result<Vec<MessageDto>> {
        self.request(
            Method::GET,
            &format!("/api/conversations/{conversation_id}/messages"),
            None,
        )
        .await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<T> {
        let response = self.send(method, path, body).await?;
        let response = Self::check(response).await?;
        response.json().await.context("decoding server response")
    }

    async fn request_no_body(&self, method: Method, path: &str) -> anyhow::Result<()> {
        let response = self.send(method, path, None).await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<Response> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        request
            .send()
            .await
            .with_context(|| format!("could not reach {url}; is the server running?"))
    }

    async fn check(response: Response) -> anyhow::Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            bail!("not logged in, or the session has expired; run `tasklane login`");
        }

        let body: ApiErrorBody = response
            .json()
            .await
            .unwrap_or(ApiErrorBody {
                message: None,
                error: None,
            });
        let message = body
            .message
            .or(body.error)
            .unwrap_or_else(|| status.to_string());
        Err(anyhow!("{message}"))
    }
}
