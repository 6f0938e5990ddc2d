use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

/// Legacy credential variable shared with the agent front-end.
pub const API_KEY_ENV: &str = "NVIDIA_API_KEY";
/// Legacy safety toggle; only the literal `true` (any case) enables.
pub const ENABLE_SAFETY_ENV: &str = "ENABLE_SAFETY";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub retriever: RetrieverConfig,
    pub safety: SafetyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Separate port for the Prometheus exporter. Unset disables it.
    pub metrics_port: Option<u16>,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrieverConfig {
    pub base_url: String,
    pub api_key: Option<Secret<String>>,
    pub rerank_model: String,
    pub rerank_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SafetyConfig {
    pub enabled: bool,
    pub blocked_phrases: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            metrics_port: None,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            base_url: "https://integrate.api.nvidia.com/v1".into(),
            api_key: None,
            rerank_model: "nvidia/nv-rerankqa-mistral-4b-v3".into(),
            rerank_timeout_ms: 5000,
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            blocked_phrases: vec!["ignore all instructions".into()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/bridge.*`, `BRIDGE__*` variables, and
    /// finally the legacy `NVIDIA_API_KEY` / `ENABLE_SAFETY` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config/bridge").required(false))
            // Map BRIDGE__SERVER__PORT=9000 to server.port
            .add_source(
                Environment::with_prefix("BRIDGE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("safety.blocked_phrases"),
            )
            .build()?;

        let mut cfg: Self = s.try_deserialize()?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Apply the legacy variables on top of the layered configuration.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.retriever.api_key = Some(Secret::new(key));
        }
        if let Some(flag) = lookup(ENABLE_SAFETY_ENV) {
            self.safety.enabled = parse_flag(&flag);
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.to_lowercase() == "true"
}
