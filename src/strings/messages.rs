//! # Messages
//!
//! Console output templates. Everything here goes to stdout.

pub const CREW_RESULT_HEADER: &str = "\n=== Crew Result ===";

pub fn tools_loaded(count: usize) -> String {
    format!("Loaded {count} Ayni tools:")
}

pub fn tool_line(name: &str) -> String {
    format!("  - {name}")
}

pub fn transcript_line(kind: &str, content: &str) -> String {
    format!("\n[{kind}]: {content}")
}

pub fn agent_header(role: &str) -> String {
    format!("\n# Agent: {role}")
}

pub fn task_header(description: &str) -> String {
    format!("## Task: {description}")
}

pub fn tool_call_line(tool: &str, arguments: &str) -> String {
    format!("## Using tool: {tool}\n## Tool Input: {arguments}")
}

pub fn tool_result_line(tool: &str, output: &str) -> String {
    format!("## Tool Output ({tool}):\n{output}")
}

pub fn final_answer(answer: &str) -> String {
    format!("## Final Answer:\n{answer}")
}
