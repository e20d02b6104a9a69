use anyhow::{Context, Result, bail};
use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParam, CallToolResult, RawContent, Tool},
    service::RunningService,
    transport::TokioChildProcess,
};
use serde_json::Value;
use tokio::process::Command;

use crate::domain::config::McpServerConfig;
use crate::domain::types::{ToolOutput, ToolSpec};
use crate::strings::logs;

/// MCP client for a single stdio server
///
/// Owns the child process: it is spawned by [`McpClient::connect`] and reaped by
/// [`McpClient::shutdown`].
pub struct McpClient {
    name: String,
    service: RunningService<RoleClient, ()>,
}

impl McpClient {
    /// Spawn the server process and complete the MCP handshake
    ///
    /// # Arguments
    /// * `config` - Command, arguments and extra environment for the server
    ///
    /// # Errors
    /// Returns an error if:
    /// - The command cannot be found or executed
    /// - The server does not answer the initialize request
    pub async fn connect(config: &McpServerConfig) -> Result<Self> {
        tracing::info!(
            server = %config.name,
            command = %config.command_line(),
            transport = ?config.transport,
            "{}",
            logs::MCP_SPAWNING
        );

        let mut command = Command::new(&config.command);
        command.args(&config.args).envs(&config.env);

        let transport = TokioChildProcess::new(command)
            .with_context(|| logs::mcp_spawn_fail(&config.name, &config.command_line()))?;

        let service = ()
            .serve(transport)
            .await
            .with_context(|| logs::mcp_handshake_fail(&config.name))?;

        if let Some(info) = service.peer_info() {
            tracing::info!(
                server = %config.name,
                remote = %info.server_info.name,
                version = %info.server_info.version,
                "MCP handshake complete"
            );
        }

        Ok(Self {
            name: config.name.clone(),
            service,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// List every tool the server exposes, following pagination
    pub async fn list_tools(&self) -> Result<Vec<ToolSpec>> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .with_context(|| format!("Failed to list tools from MCP server '{}'", self.name))?;

        Ok(tools.into_iter().map(tool_spec).collect())
    }

    /// Invoke a tool
    ///
    /// # Arguments
    /// * `name` - Tool name as listed by the server
    /// * `arguments` - A JSON object, or null for no arguments
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolOutput> {
        let arguments = object_arguments(name, arguments)?;

        tracing::debug!(server = %self.name, tool = name, "Calling MCP tool");

        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
            })
            .await
            .with_context(|| format!("MCP call to '{}' on server '{}' failed", name, self.name))?;

        Ok(tool_output(result))
    }

    /// Close the connection and wait for the server process to exit
    pub async fn shutdown(self) -> Result<()> {
        tracing::debug!(server = %self.name, "Shutting down MCP server");
        self.service
            .cancel()
            .await
            .with_context(|| format!("Failed to shut down MCP server '{}'", self.name))?;
        Ok(())
    }
}

fn tool_spec(tool: Tool) -> ToolSpec {
    ToolSpec::new(
        tool.name.to_string(),
        tool.description.map(|d| d.to_string()).unwrap_or_default(),
        Value::Object((*tool.input_schema).clone()),
    )
}

fn tool_output(result: CallToolResult) -> ToolOutput {
    let parts: Vec<String> = result
        .content
        .iter()
        .map(|content| match &content.raw {
            RawContent::Text(text) => text.text.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        })
        .collect();

    // Servers that only return structured content still deserve a readable answer.
    let content = match (parts.is_empty(), &result.structured_content) {
        (true, Some(structured)) => structured.to_string(),
        _ => parts.join("\n"),
    };

    ToolOutput {
        content,
        is_error: result.is_error.unwrap_or(false),
    }
}

/// MCP arguments are a JSON object; null means "no arguments".
fn object_arguments(name: &str, arguments: Value) -> Result<Option<serde_json::Map<String, Value>>> {
    match arguments {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => bail!(
            "Arguments for tool '{}' must be a JSON object, got {}",
            name,
            other
        ),
    }
}
