use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "tasklane.toml",
    "config/tasklane.toml",
    "crates/config/tasklane.toml",
    "../tasklane.toml",
    "../config/tasklane.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub assistant: AssistantConfig,
    pub proxy: ProxyConfig,
    pub launcher: LauncherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://tasklane.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
        }
    }
}

impl AuthConfig {
    const fn default_session_ttl() -> u64 {
        86_400
    }
}

/// Settings for the natural-language assistant. When `api_key` is absent the
/// assistant falls back to its built-in keyword router, so a fresh checkout
/// works without any provider account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "AssistantConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "AssistantConfig::default_model")]
    pub model: String,
    #[serde(default = "AssistantConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl AssistantConfig {
    fn default_base_url() -> String {
        "https://openrouter.ai/api/v1".to_string()
    }

    fn default_model() -> String {
        "openai/gpt-4.1-mini".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub upstream_base_url: String,
    #[serde(default = "ProxyConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ProxyConfig {
    const fn default_request_timeout() -> u64 {
        15
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Commands for the dev launcher. Each command is split on whitespace, so
/// arguments with embedded spaces are not supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    pub backend_command: String,
    pub frontend_command: String,
    #[serde(default = "LauncherConfig::default_startup_delay")]
    pub startup_delay_seconds: u64,
}

impl LauncherConfig {
    const fn default_startup_delay() -> u64 {
        3
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            backend_command: "cargo run -p tasklane-server".to_string(),
            frontend_command: "npm run dev".to_string(),
            startup_delay_seconds: Self::default_startup_delay(),
        }
    }
}

/// Load the application configuration by combining defaults, an optional
/// `tasklane.toml`, and `TASKLANE`-prefixed environment overrides.
///
/// ```
/// std::env::remove_var("TASKLANE_CONFIG");
///
/// let config = tasklane_config::load().expect("defaults should load");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    load_from(std::env::var("TASKLANE_CONFIG").ok().map(PathBuf::from))
}

/// Load configuration with an explicit file path taking precedence over the
/// search list. Used by the server's `--config` flag.
pub fn load_from(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap()
        .set_default(
            "auth.session_ttl_seconds",
            clamp_to_i64(defaults.auth.session_ttl_seconds),
        )
        .unwrap()
        .set_default("assistant.base_url", defaults.assistant.base_url.clone())
        .unwrap()
        .set_default("assistant.model", defaults.assistant.model.clone())
        .unwrap()
        .set_default(
            "assistant.request_timeout_seconds",
            clamp_to_i64(defaults.assistant.request_timeout_seconds),
        )
        .unwrap()
        .set_default(
            "proxy.upstream_base_url",
            defaults.proxy.upstream_base_url.clone(),
        )
        .unwrap()
        .set_default(
            "proxy.request_timeout_seconds",
            clamp_to_i64(defaults.proxy.request_timeout_seconds),
        )
        .unwrap()
        .set_default(
            "launcher.backend_command",
            defaults.launcher.backend_command.clone(),
        )
        .unwrap()
        .set_default(
            "launcher.frontend_command",
            defaults.launcher.frontend_command.clone(),
        )
        .unwrap()
        .set_default(
            "launcher.startup_delay_seconds",
            clamp_to_i64(defaults.launcher.startup_delay_seconds),
        )
        .unwrap();

    let mut config_file_attached = false;

    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading configuration from explicit path");
        builder = builder.add_source(config::File::from(path));
        config_file_attached = true;
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(config::Environment::with_prefix("TASKLANE").separator("__"));

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }

    debug!(?config, "loaded tasklane configuration");
    Ok(config)
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
