use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ResearchConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
    pub browser: BrowserConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Shared secret every request to the worker must present as a bearer token.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub account_id: String,
    pub gateway_id: String,
    pub token: String,
    pub default_provider: String,
}

/// Browser-render credential. Provisioned alongside the worker but not used by
/// any route yet.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BrowserConfig {
    pub render_token: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub state_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8787,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_research_dir()
            .join("research.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gateway.ai.cloudflare.com/v1".into(),
            account_id: String::new(),
            gateway_id: "research".into(),
            token: String::new(),
            default_provider: crate::gateway::DEFAULT_PROVIDER.into(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787".into(),
            state_dir: default_research_dir().to_string_lossy().into_owned(),
        }
    }
}

/// Returns `~/.deep-research/`
pub fn default_research_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".deep-research")
}

/// Returns the default config file path: `~/.deep-research/config.toml`
pub fn default_config_path() -> PathBuf {
    default_research_dir().join("config.toml")
}

impl ResearchConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            ResearchConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides. The worker bindings keep their
    /// deployment names (`WORKER_API_KEY`, `AI_GATEWAY_TOKEN`, ...).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("WORKER_API_KEY") {
            self.auth.api_key = val;
        }
        if let Ok(val) = std::env::var("AI_GATEWAY_TOKEN") {
            self.gateway.token = val;
        }
        if let Ok(val) = std::env::var("CLOUDFLARE_ACCOUNT_ID") {
            self.gateway.account_id = val;
        }
        if let Ok(val) = std::env::var("CF_BROWSER_RENDER_TOKEN") {
            self.browser.render_token = val;
        }
        if let Ok(val) = std::env::var("RESEARCH_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("RESEARCH_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("RESEARCH_API_URL") {
            self.client.base_url = val;
        }
        if let Ok(val) = std::env::var("RESEARCH_STATE_DIR") {
            self.client.state_dir = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Resolve the client state directory (cookies, settings).
    pub fn resolved_state_dir(&self) -> PathBuf {
        expand_tilde(&self.client.state_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ResearchConfig::default();
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.gateway.gateway_id, "research");
        assert_eq!(config.gateway.default_provider, "google-ai-studio");
        assert!(config.auth.api_key.is_empty());
        assert!(config.storage.db_path.ends_with("research.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
port = 9000

[storage]
db_path = "/tmp/research.db"

[gateway]
account_id = "acct-123"
"#;
        let config: ResearchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.db_path, "/tmp/research.db");
        assert_eq!(config.gateway.account_id, "acct-123");
        // defaults still apply for unset fields
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.gateway.gateway_id, "research");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = ResearchConfig::default();
        std::env::set_var("WORKER_API_KEY", "shared-secret");
        std::env::set_var("AI_GATEWAY_TOKEN", "gw-token");
        std::env::set_var("RESEARCH_DB", "/tmp/override.db");

        config.apply_env_overrides();

        assert_eq!(config.auth.api_key, "shared-secret");
        assert_eq!(config.gateway.token, "gw-token");
        assert_eq!(config.storage.db_path, "/tmp/override.db");

        std::env::remove_var("WORKER_API_KEY");
        std::env::remove_var("AI_GATEWAY_TOKEN");
        std::env::remove_var("RESEARCH_DB");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/db.sqlite"), PathBuf::from("/var/db.sqlite"));
    }
}
