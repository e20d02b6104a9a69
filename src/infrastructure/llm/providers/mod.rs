//! # LLM Providers
//!
//! Contains implementations for specific LLM providers:
//! - OpenAI-compatible API (OpenAI, Groq, XAI)
//! - Anthropic (Claude) messages API
//!
//! Both speak tool calling; the agent loop does not care which one it talks to.

mod anthropic;
mod openai;

use crate::domain::config::AgentConfig;
use crate::infrastructure::llm::{ChatRequest, ChatResponse, Error, Provider};

/// Configuration for a provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key
    pub api_key: String,
    /// Base URL (for non-default endpoints)
    pub base_url: Option<String>,
    /// Default model
    pub default_model: String,
    /// Timeout in seconds
    pub timeout: Option<u64>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Build from a profile, resolving the API key from `api_key`, then
    /// `api_key_env`, then the provider's conventional variable.
    pub fn from_agent_config(config: &AgentConfig, provider: Provider) -> Result<Self, Error> {
        let api_key = resolve_api_key(config, provider, |name| std::env::var(name).ok())?;

        let default_model = if config.model.is_empty() {
            provider.default_model().to_string()
        } else {
            config.model.clone()
        };

        Ok(Self {
            api_key,
            base_url: config.endpoint.clone(),
            default_model,
            timeout: config.timeout,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

fn resolve_api_key(
    config: &AgentConfig,
    provider: Provider,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, Error> {
    if let Some(key) = config.api_key.as_ref().filter(|k| !k.is_empty()) {
        return Ok(key.clone());
    }

    let env_var = config
        .api_key_env
        .as_deref()
        .unwrap_or_else(|| provider.api_key_env());

    lookup(env_var).filter(|k| !k.is_empty()).ok_or_else(|| {
        Error::new(
            provider.as_str(),
            format!("No API key provided - set {} or api_key in the profile", env_var),
        )
    })
}

/// Execute a chat request with the specified provider
pub async fn chat(
    provider: Provider,
    config: &ProviderConfig,
    request: ChatRequest,
) -> Result<ChatResponse, Error> {
    match provider {
        Provider::OpenAI => openai::chat(provider, config, request).await,
        Provider::Groq => {
            // Groq uses OpenAI-compatible API
            let config_with_url = ProviderConfig {
                base_url: Some(
                    config
                        .base_url
                        .clone()
                        .unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
                ),
                ..config.clone()
            };
            openai::chat(provider, &config_with_url, request).await
        }
        Provider::XAI => {
            // xAI uses OpenAI-compatible API
            let config_with_url = ProviderConfig {
                base_url: Some(
                    config
                        .base_url
                        .clone()
                        .unwrap_or_else(|| "https://api.x.ai/v1".to_string()),
                ),
                ..config.clone()
            };
            openai::chat(provider, &config_with_url, request).await
        }
        Provider::Anthropic => anthropic::chat(config, request).await,
    }
}

/// Pull a readable message out of an error body, falling back to status + body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(error) = json.get("error")
    {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| error.as_str());
        if let Some(message) = message {
            return match error.get("type").and_then(|t| t.as_str()) {
                Some(kind) => format!("{}: {}", kind, message),
                None => message.to_string(),
            };
        }
    }
    format!("HTTP {}: {}", status, body)
}

/// HTTP client reused across requests
fn http_client() -> &'static reqwest::Client {
    use std::sync::OnceLock;
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client")
    })
}
