//! Companion configuration loaded from `.env`.
//!
//! Generator endpoint, sampling parameters, and reply toggles. Change behavior without code edits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "chat-mistral-v0.1";

/// Whether the generator is called at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    /// Never call out; every reply comes from the fallback table.
    #[default]
    Mock,
    Live,
}

impl LlmMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmMode::Mock => "mock",
            LlmMode::Live => "live",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim() {
            s if s.eq_ignore_ascii_case("live") => LlmMode::Live,
            _ => LlmMode::Mock,
        }
    }
}

/// Companion configuration loaded from environment.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | PANTHEON_LLM_MODE | mock | "mock" \| "live". Mock never reaches the network. |
/// | PANTHEON_LLM_API_URL | http://localhost:8080/v1/chat/completions | OpenAI-compatible endpoint. |
/// | PANTHEON_LLM_MODEL | chat-mistral-v0.1 | Model name sent with each request. |
/// | PANTHEON_LLM_API_KEY | (none) | Bearer token, if the endpoint needs one. |
/// | PANTHEON_LLM_TIMEOUT_SECS | 20 | Hard cap on one generator call. |
/// | PANTHEON_TEMPERATURE | 0.8 | Sampling temperature. |
/// | PANTHEON_MAX_TOKENS | 512 | Completion length cap. |
/// | PANTHEON_HISTORY_WINDOW | 6 | Prior turns forwarded to the generator. |
/// | PANTHEON_INSIGHT_NOTES | false | Append "Cycle Insight" and tracking-offer notes to replies. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionConfig {
    #[serde(default)]
    pub llm_mode: LlmMode,
    pub api_url: String,
    pub model: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub history_window: usize,
    #[serde(default)]
    pub insight_notes: bool,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            llm_mode: LlmMode::Mock,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 20,
            temperature: 0.8,
            max_tokens: 512,
            history_window: 6,
            insight_notes: false,
        }
    }
}

impl CompanionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            llm_mode: env_opt_string("PANTHEON_LLM_MODE")
                .map(|s| LlmMode::from_str(&s))
                .unwrap_or_default(),
            api_url: env_opt_string("PANTHEON_LLM_API_URL").unwrap_or(defaults.api_url),
            model: env_opt_string("PANTHEON_LLM_MODEL").unwrap_or(defaults.model),
            api_key: env_opt_string("PANTHEON_LLM_API_KEY"),
            timeout_secs: env_parse("PANTHEON_LLM_TIMEOUT_SECS", defaults.timeout_secs).max(1),
            temperature: env_parse("PANTHEON_TEMPERATURE", defaults.temperature),
            max_tokens: env_parse("PANTHEON_MAX_TOKENS", defaults.max_tokens),
            history_window: env_parse("PANTHEON_HISTORY_WINDOW", defaults.history_window),
            insight_notes: env_bool("PANTHEON_INSIGHT_NOTES", defaults.insight_notes),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_live(&self) -> bool {
        self.llm_mode == LlmMode::Live
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => v.trim().eq_ignore_ascii_case("true") || (v.trim().is_empty() && default),
        Err(_) => default,
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Unparseable values fall back to the default.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env_opt_string(name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
