use reqwest::Client;
use sqlx::SqlitePool;
use std::time::Duration;
use tasklane_assistant::Assistant;
use tasklane_auth::Authenticator;
use tasklane_chat::ChatService;
use tasklane_config::AppConfig;
use tasklane_todos::TodoService;

/// Shared state handed to every handler.
pub struct GatewayState {
    pub pool: SqlitePool,
    pub authenticator: Authenticator,
    pub todos: TodoService,
    pub chat: ChatService,
    pub proxy: ProxyUpstream,
}

/// HTTP client and base URL for the JSON proxy route.
pub struct ProxyUpstream {
    pub http: Client,
    pub base_url: String,
}

impl GatewayState {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> anyhow::Result<Self> {
        let authenticator = Authenticator::new(pool.clone(), config.auth.clone());
        let todos = TodoService::new(pool.clone());
        let assistant = Assistant::new(&config.assistant, todos.clone())?;
        let chat = ChatService::new(pool.clone(), assistant);

        let http = Client::builder()
            .timeout(Duration::from_secs(config.proxy.request_timeout_seconds))
            .build()?;
        let proxy = ProxyUpstream {
            http,
            base_url: config.proxy.upstream_base_url.trim_end_matches('/').to_string(),
        };

        Ok(Self {
            pool,
            authenticator,
            todos,
            chat,
            proxy,
        })
    }
}
