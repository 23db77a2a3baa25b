//! Text generator bridge: the single external call in a turn.
//!
//! [`TextGenerator`] is the seam. [`ChatCompletionsGenerator`] speaks the OpenAI-compatible
//! chat-completions wire format over reqwest; [`OfflineGenerator`] never answers, so the
//! service always takes the fallback path. Timeouts and fallback live in the service, not here.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CompanionConfig;
use crate::error::GeneratorError;
use crate::shared::Role;

/// One earlier turn forwarded for context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorTurn {
    pub role: Role,
    pub content: String,
}

/// Everything the generator needs for one completion.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    /// Oldest first, already trimmed to the history window.
    pub prior_turns: Vec<PriorTurn>,
    pub user_turn: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

// OpenAI-compatible request/response
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for a local or hosted OpenAI-compatible server.
pub struct ChatCompletionsGenerator {
    api_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ChatCompletionsGenerator {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_url: api_url.into(),
            model: model.into(),
            api_key: None,
            client,
        }
    }

    pub fn from_config(config: &CompanionConfig) -> Self {
        let mut generator = Self::new(&config.api_url, &config.model, config.timeout());
        generator.api_key = config.api_key.clone();
        generator
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn build_body<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(request.prior_turns.len() + 2);
        messages.push(ChatMessage {
            role: "system",
            content: &request.system_prompt,
        });
        messages.extend(request.prior_turns.iter().map(|t| ChatMessage {
            role: t.role.as_str(),
            content: &t.content,
        }));
        messages.push(ChatMessage {
            role: "user",
            content: &request.user_turn,
        });
        ChatRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        let body = self.build_body(request);
        let mut req = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let text = res.text().await.unwrap_or_default();
            return Err(GeneratorError::Status(status, text));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| GeneratorError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(GeneratorError::EmptyReply)
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }
}

/// Always fails with [`GeneratorError::Disabled`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
        Err(GeneratorError::Disabled)
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_prompt: "You are Hestia.".into(),
            prior_turns: vec![
                PriorTurn { role: Role::User, content: "hi".into() },
                PriorTurn { role: Role::Assistant, content: "welcome".into() },
            ],
            user_turn: "I feel stress".into(),
            temperature: 0.8,
            max_tokens: 512,
        }
    }

    #[test]
    fn wire_body_is_openai_compatible() {
        let generator = ChatCompletionsGenerator::new(
            "http://localhost:8080/v1/chat/completions",
            "chat-mistral-v0.1",
            Duration::from_secs(5),
        );
        let req = request();
        let json = serde_json::to_value(generator.build_body(&req)).unwrap();
        assert_eq!(json["model"], "chat-mistral-v0.1");
        assert_eq!(json["max_tokens"], 512);
        let roles: Vec<&str> = json["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(json["messages"][3]["content"], "I feel stress");
    }

    #[test]
    fn response_parse_tolerates_null_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
        let parsed: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[tokio::test]
    async fn offline_generator_is_disabled() {
        let err = OfflineGenerator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GeneratorError::Disabled));
    }
}
