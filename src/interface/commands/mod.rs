//! # Command Handlers
//!
//! One handler per subcommand (`tools`, `react`, `crew`), plus the plumbing
//! they share: connecting the MCP servers, building LLM clients and making
//! sure the servers are shut down whatever the outcome.

pub mod crew;
pub mod react;
pub mod tools;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::config::AppConfig;
use crate::domain::traits::{LlmProvider, ToolProvider};
use crate::domain::types::ToolSpec;
use crate::infrastructure::llm::Client as LlmClient;
use crate::infrastructure::mcp::McpManager;
use crate::strings::messages;

/// Settings resolved from the command line on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// LLM profile chosen with `--agent`.
    pub agent: Option<String>,
    pub model: Option<String>,
    pub max_iterations: usize,
    pub verbose: bool,
}

impl RunOptions {
    pub fn resolve(
        config: &AppConfig,
        agent: Option<String>,
        model: Option<String>,
        max_iterations: Option<usize>,
        quiet: bool,
    ) -> Self {
        Self {
            agent,
            model,
            max_iterations: max_iterations.unwrap_or(config.runtime.max_iterations),
            verbose: config.runtime.verbose && !quiet,
        }
    }
}

/// Build the client for an LLM profile.
pub fn build_llm(
    config: &AppConfig,
    profile: &str,
    model: Option<&str>,
) -> Result<Arc<dyn LlmProvider>> {
    config.agent(profile)?;
    let client = LlmClient::from_config(config, profile, model)
        .with_context(|| format!("Failed to set up LLM profile '{}'", profile))?;
    tracing::info!(profile = client.profile(), model = client.model(), "LLM client ready");
    Ok(Arc::new(client))
}

pub async fn connect_tools(config: &AppConfig) -> Result<Arc<McpManager>> {
    let manager = McpManager::connect(&config.mcp.servers)
        .await
        .context("Failed to connect to MCP servers")?;
    Ok(Arc::new(manager))
}

/// Shut the servers down once every agent holding the manager is gone.
pub async fn release(manager: Arc<McpManager>) {
    match Arc::try_unwrap(manager) {
        Ok(manager) => manager.shutdown().await,
        Err(_) => tracing::warn!("MCP manager still in use, servers will be killed on exit"),
    }
}

pub fn format_tool_listing(tools: &[ToolSpec]) -> String {
    let mut lines = vec![messages::tools_loaded(tools.len())];
    lines.extend(tools.iter().map(|tool| messages::tool_line(&tool.name)));
    lines.join("\n")
}

pub fn print_tool_listing(tools: &dyn ToolProvider) {
    println!("{}", format_tool_listing(tools.tools()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_listing() {
        let tools = vec![
            ToolSpec::new("ayni_identify", "Register", json!({"type": "object"})),
            ToolSpec::new("ayni_agora", "Read the agora", json!({"type": "object"})),
        ];
        assert_eq!(
            format_tool_listing(&tools),
            "Loaded 2 Ayni tools:\n  - ayni_identify\n  - ayni_agora"
        );
        assert_eq!(format_tool_listing(&[]), "Loaded 0 Ayni tools:");
    }

    #[test]
    fn test_run_options() {
        let config = AppConfig::default();

        let opts = RunOptions::resolve(&config, None, None, None, false);
        assert_eq!(opts.max_iterations, config.runtime.max_iterations);
        assert!(opts.verbose);

        let opts = RunOptions::resolve(&config, Some("openai".into()), None, Some(3), true);
        assert_eq!(opts.agent.as_deref(), Some("openai"));
        assert_eq!(opts.max_iterations, 3);
        assert!(!opts.verbose);
    }

    #[test]
    fn test_build_llm_unknown_profile() {
        let err = build_llm(&AppConfig::default(), "mistral", None)
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("Agent profile 'mistral' not found"));
    }
}
