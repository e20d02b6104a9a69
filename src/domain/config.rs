//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Every section is optional; anything left out falls back to the built-in Ayni setup.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";
pub const AYNI_SERVER_NAME: &str = "ayni";
pub const AYNI_SERVER_URL_ENV: &str = "AYNI_SERVER_URL";
pub const DEFAULT_AYNI_SERVER_URL: &str = "https://ay-ni.org";
pub const AYNI_MCP_PACKAGE: &str = "@ayni-protocol/mcp";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub mcp: McpConfig,
    #[serde(default = "default_agents")]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mcp: McpConfig::default(),
            agents: default_agents(),
            runtime: RuntimeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// MCP servers to spawn for a run.
#[derive(Debug, Deserialize, Clone)]
pub struct McpConfig {
    #[serde(default = "default_servers")]
    pub servers: Vec<McpServerConfig>,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            servers: default_servers(),
        }
    }
}

/// How to launch and reach a single MCP server.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct McpServerConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub transport: Transport,
}

impl McpServerConfig {
    /// The descriptor for `npx -y @ayni-protocol/mcp` pointed at the public Ayni server.
    pub fn ayni() -> Self {
        Self {
            name: AYNI_SERVER_NAME.to_string(),
            command: "npx".to_string(),
            args: vec!["-y".to_string(), AYNI_MCP_PACKAGE.to_string()],
            env: HashMap::from([(
                AYNI_SERVER_URL_ENV.to_string(),
                DEFAULT_AYNI_SERVER_URL.to_string(),
            )]),
            transport: Transport::Stdio,
        }
    }

    /// Human readable command line, used in logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Only stdio framing is supported; other transports are rejected at parse time.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
}

pub type AgentsConfig = HashMap<String, AgentConfig>;

/// An LLM profile: which provider and model an agent talks to.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AgentConfig {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>, // e.g. "ANTHROPIC_API_KEY"
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl AgentConfig {
    fn new(provider: &str, model: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// Profile used by `react` (and by `crew` agents when no crew profile is set).
    #[serde(default = "default_agent")]
    pub default_agent: String,
    /// Profile used by the crew's agents. CrewAI talks to OpenAI out of the box.
    #[serde(default = "default_crew_agent")]
    pub crew_agent: String,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_agent: default_agent(),
            crew_agent: default_crew_agent(),
            max_iterations: default_max_iterations(),
            verbose: default_verbose(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Session log, cleared at startup. `None` disables the file sink.
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    /// Fallback filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

fn default_servers() -> Vec<McpServerConfig> {
    vec![McpServerConfig::ayni()]
}

fn default_agents() -> AgentsConfig {
    HashMap::from([
        (
            "claude".to_string(),
            AgentConfig::new("anthropic", "claude-sonnet-4-5-20250929"),
        ),
        ("openai".to_string(), AgentConfig::new("openai", "gpt-4o-mini")),
    ])
}

fn default_agent() -> String {
    "claude".to_string()
}

fn default_crew_agent() -> String {
    "openai".to_string()
}

fn default_max_iterations() -> usize {
    20
}

fn default_verbose() -> bool {
    true
}

fn default_log_file() -> Option<String> {
    Some("data/session.log".to_string())
}

fn default_log_filter() -> String {
    "warn,ayni_agents=info".to_string()
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `data/config.yaml` and then the
    /// user config directory are tried, and the built-in defaults are used if
    /// neither exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in candidate_paths() {
            if candidate.exists() {
                return Self::from_file(&candidate);
            }
        }

        tracing::debug!("No config file found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file is a valid "use every default" config.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Look up an LLM profile by name.
    pub fn agent(&self, name: &str) -> Result<&AgentConfig> {
        self.agents.get(name).ok_or_else(|| {
            let mut known: Vec<&str> = self.agents.keys().map(String::as_str).collect();
            known.sort_unstable();
            anyhow!(
                "Agent profile '{}' not found in configuration (known: {})",
                name,
                known.join(", ")
            )
        })
    }

    /// Point the Ayni server at a different base URL.
    ///
    /// Applies to the server named `ayni` and to any server that already sets
    /// `AYNI_SERVER_URL`.
    pub fn override_server_url(&mut self, url: &str) {
        for server in &mut self.mcp.servers {
            if server.name == AYNI_SERVER_NAME || server.env.contains_key(AYNI_SERVER_URL_ENV) {
                server
                    .env
                    .insert(AYNI_SERVER_URL_ENV.to_string(), url.to_string());
            }
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_PATH)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("ayni-agents").join("config.yaml"));
    }
    paths
}
