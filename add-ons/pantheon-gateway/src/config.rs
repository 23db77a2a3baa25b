//! Gateway configuration: defaults, optional TOML file, then `PANTHEON__*` environment.

use serde::{Deserialize, Serialize};

/// Precedence: environment > file (`PANTHEON_CONFIG`, default `config/gateway[.toml]`) > defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub app_name: String,
    pub host: String,
    pub port: u16,
    /// Extra CORS origins beyond localhost.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("PANTHEON_CONFIG").unwrap_or_else(|_| "config/gateway".to_string());
        Self::load_from(&path)
    }

    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("app_name", "Pantheon Gateway")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8002_i64)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("PANTHEON").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
