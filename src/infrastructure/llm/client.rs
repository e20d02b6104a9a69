//! # LLM Client
//!
//! Provides the `Client` struct, the entry point for LLM interactions.
//! It resolves a named profile from the configuration and routes requests to the
//! matching provider.

use crate::domain::config::AppConfig;
use crate::domain::traits::LlmProvider;
use crate::infrastructure::llm::providers::{self, ProviderConfig};
use crate::infrastructure::llm::{ChatRequest, ChatResponse, Error, Provider};
use async_trait::async_trait;

/// LLM client bound to one profile
#[derive(Debug)]
pub struct Client {
    profile: String,
    provider: Provider,
    config: ProviderConfig,
}

impl Client {
    /// Create a client for the profile `agent_name` (e.g. "claude", "openai").
    ///
    /// `model` overrides the profile's model.
    pub fn from_config(
        app_config: &AppConfig,
        agent_name: &str,
        model: Option<&str>,
    ) -> Result<Self, Error> {
        // Look up agent configuration by agent name
        let agent_config = app_config
            .agents
            .get(agent_name)
            .ok_or_else(|| Error::new(agent_name, "Agent profile not found"))?;

        let provider = Provider::from_str(&agent_config.provider)
            .ok_or_else(|| Error::new(&agent_config.provider, "Unknown provider"))?;

        let mut config = ProviderConfig::from_agent_config(agent_config, provider)?;
        if let Some(model) = model {
            config.default_model = model.to_string();
        }

        Ok(Self {
            profile: agent_name.to_string(),
            provider,
            config,
        })
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn model(&self) -> &str {
        &self.config.default_model
    }
}

#[async_trait]
impl LlmProvider for Client {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, Error> {
        providers::chat(self.provider, &self.config, request).await
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.provider.as_str(), self.config.default_model)
    }
}
