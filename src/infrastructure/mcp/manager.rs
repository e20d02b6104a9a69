use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use crate::domain::config::McpServerConfig;
use crate::domain::traits::ToolProvider;
use crate::domain::types::{ToolOutput, ToolSpec};
use crate::infrastructure::mcp::client::McpClient;
use crate::strings::logs;

/// Manages the MCP clients for a run
///
/// Connects to every configured server, merges their tools into one list and
/// routes each call to the server that owns the tool.
///
/// # Example
/// ```no_run
/// let manager = McpManager::connect(&config.mcp.servers).await?;
/// for tool in manager.tools() {
///     println!("{}", tool.name);
/// }
/// manager.shutdown().await;
/// ```
pub struct McpManager {
    clients: Vec<McpClient>,
    index: ToolIndex,
}

impl McpManager {
    /// Connect to every server in order
    ///
    /// # Errors
    /// Fails on the first server that cannot be started or listed; servers
    /// already started are shut down before returning.
    pub async fn connect(servers: &[McpServerConfig]) -> Result<Self> {
        if servers.is_empty() {
            bail!("No MCP servers configured");
        }

        let mut clients = Vec::with_capacity(servers.len());
        let mut listings = Vec::with_capacity(servers.len());

        for server in servers {
            let client = match McpClient::connect(server).await {
                Ok(client) => client,
                Err(e) => {
                    shutdown_all(clients).await;
                    return Err(e);
                }
            };

            let tools = match client.list_tools().await {
                Ok(tools) => tools,
                Err(e) => {
                    clients.push(client);
                    shutdown_all(clients).await;
                    return Err(e);
                }
            };

            tracing::info!(server = %server.name, tools = tools.len(), "MCP server ready");
            listings.push((client.name().to_string(), tools));
            clients.push(client);
        }

        let index = ToolIndex::build(listings);
        if index.tools().is_empty() {
            tracing::warn!("{}", logs::NO_TOOLS_WARN);
        }

        Ok(Self { clients, index })
    }

    /// Shut every server down, logging (not returning) individual failures
    pub async fn shutdown(self) {
        shutdown_all(self.clients).await;
    }
}

async fn shutdown_all(clients: Vec<McpClient>) {
    for client in clients {
        let name = client.name().to_string();
        if let Err(e) = client.shutdown().await {
            tracing::warn!(server = %name, "{:#}", e);
        }
    }
}

#[async_trait]
impl ToolProvider for McpManager {
    fn tools(&self) -> &[ToolSpec] {
        self.index.tools()
    }

    async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> Result<ToolOutput> {
        let server = self.index.resolve(name)?;
        self.clients[server].call_tool(name, arguments).await
    }
}

/// Merged tool list plus the owning server of each tool
///
/// The first server to expose a name wins; later duplicates are skipped.
#[derive(Debug, Default)]
pub struct ToolIndex {
    tools: Vec<ToolSpec>,
    routes: HashMap<String, usize>,
}

impl ToolIndex {
    /// `listings` are `(server name, tools)` in server order.
    pub fn build(listings: Vec<(String, Vec<ToolSpec>)>) -> Self {
        let mut index = Self::default();

        for (server, (server_name, tools)) in listings.into_iter().enumerate() {
            for tool in tools {
                if index.routes.contains_key(&tool.name) {
                    tracing::warn!(server = %server_name, tool = %tool.name, "{}", logs::DUPLICATE_TOOL_WARN);
                    continue;
                }
                index.routes.insert(tool.name.clone(), server);
                index.tools.push(tool);
            }
        }

        index
    }

    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Position of the server that owns `name`.
    pub fn route(&self, name: &str) -> Option<usize> {
        self.routes.get(name).copied()
    }

    /// Like [`ToolIndex::route`], but an unknown name is an error.
    pub fn resolve(&self, name: &str) -> Result<usize> {
        self.route(name)
            .ok_or_else(|| anyhow!("Unknown tool '{}'", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str, description: &str) -> ToolSpec {
        ToolSpec::new(name, description, json!({"type": "object"}))
    }

    #[test]
    fn test_index_keeps_server_order() {
        let index = ToolIndex::build(vec![
            (
                "ayni".to_string(),
                vec![tool("ayni_identify", ""), tool("ayni_agora", "")],
            ),
            ("local".to_string(), vec![tool("echo", "")]),
        ]);

        let names: Vec<&str> = index.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ayni_identify", "ayni_agora", "echo"]);
        assert_eq!(index.route("ayni_agora"), Some(0));
        assert_eq!(index.route("echo"), Some(1));
        assert_eq!(index.route("missing"), None);
    }

    #[test]
    fn test_index_first_server_wins() {
        let index = ToolIndex::build(vec![
            ("ayni".to_string(), vec![tool("ayni_agora", "public")]),
            ("mirror".to_string(), vec![tool("ayni_agora", "mirror")]),
        ]);

        assert_eq!(index.tools().len(), 1);
        assert_eq!(index.tools()[0].description, "public");
        assert_eq!(index.route("ayni_agora"), Some(0));
    }

    #[test]
    fn test_empty_index() {
        let index = ToolIndex::build(vec![("ayni".to_string(), vec![])]);
        assert!(index.tools().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error() {
        let manager = McpManager {
            clients: Vec::new(),
            index: ToolIndex::build(vec![("ayni".to_string(), vec![tool("ayni_agora", "")])]),
        };

        assert_eq!(manager.index.resolve("ayni_agora").unwrap(), 0);

        let err = manager
            .call_tool("ayni_teleport", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool 'ayni_teleport'");
    }

    #[tokio::test]
    async fn test_connect_requires_servers() {
        let err = McpManager::connect(&[]).await.err().unwrap();
        assert_eq!(err.to_string(), "No MCP servers configured");
    }

    #[tokio::test]
    async fn test_connect_fails_for_missing_command() {
        let server = McpServerConfig {
            name: "broken".to_string(),
            command: "definitely-not-a-real-mcp-server-binary".to_string(),
            ..McpServerConfig::ayni()
        };
        let err = McpManager::connect(&[server]).await.err().unwrap();
        assert!(format!("{:#}", err).contains("broken"));
    }
}
