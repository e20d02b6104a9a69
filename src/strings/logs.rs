pub const STARTING: &str = "Starting ayni-agents...";
pub const MCP_SPAWNING: &str = "Spawning MCP server";
pub const NO_TOOLS_WARN: &str = "MCP servers exposed no tools - the agent will not be able to act";
pub const DUPLICATE_TOOL_WARN: &str = "Tool already provided by an earlier server, skipping";

pub fn mcp_spawn_fail(server: &str, command: &str) -> String {
    format!("Failed to spawn MCP server '{server}' ({command})")
}

pub fn mcp_handshake_fail(server: &str) -> String {
    format!("MCP handshake with server '{server}' failed")
}

pub fn session_start(timestamp: &str) -> String {
    format!("--- [{timestamp}] Session started ---")
}

pub fn llm_fail(agent: &str) -> String {
    format!("LLM call failed for agent '{agent}'")
}

pub fn tool_fail(tool: &str, err: &str) -> String {
    format!("Tool '{tool}' failed: {err}")
}

pub fn invalid_arguments(reason: &str) -> String {
    format!("arguments are not valid JSON ({reason}); send a JSON object")
}

pub fn iteration_limit(agent: &str, limit: usize) -> String {
    format!("Agent '{agent}' reached the iteration limit ({limit}) without a final answer")
}
