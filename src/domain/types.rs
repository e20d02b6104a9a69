//! # Domain Types
//!
//! Common data structures shared by the MCP, LLM and agent layers.

use serde::{Deserialize, Serialize};

/// A remote procedure exposed by an MCP server, in the shape LLM APIs expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool's arguments. Always an object.
    pub input_schema: serde_json::Value,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
    /// Set when the model's arguments could not be parsed; `arguments` then
    /// holds the raw text as a JSON string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_arguments: Option<String>,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            invalid_arguments: None,
        }
    }

    /// A call whose raw argument text is not valid JSON.
    pub fn invalid(
        id: impl Into<String>,
        name: impl Into<String>,
        raw: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            invalid_arguments: Some(reason.into()),
            ..Self::new(id, name, serde_json::Value::String(raw.into()))
        }
    }
}

/// What a tool returned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// A role-playing agent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentDefinition {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub backstory: String,
    /// LLM profile from `agents:`; falls back to the crew-wide profile.
    #[serde(default)]
    pub llm: Option<String>,
    #[serde(default)]
    pub max_iterations: Option<usize>,
    /// Echo this agent's steps; falls back to the crew-wide setting.
    #[serde(default)]
    pub verbose: Option<bool>,
}

/// One unit of work for a crew.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDefinition {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub expected_output: String,
    /// Name of the agent that performs the task.
    pub agent: String,
    /// Earlier tasks whose outputs are handed to this one.
    #[serde(default)]
    pub context: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    #[default]
    Sequential,
}

/// Agents plus the ordered tasks they perform.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrewDefinition {
    pub agents: Vec<AgentDefinition>,
    pub tasks: Vec<TaskDefinition>,
    #[serde(default)]
    pub process: Process,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    System,
    Human,
    Ai,
    Tool,
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::System => "system",
            EntryKind::Human => "human",
            EntryKind::Ai => "ai",
            EntryKind::Tool => "tool",
        }
    }
}

/// One line of a run's transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub content: String,
    /// Set on tool entries: which tool produced the content.
    pub tool_name: Option<String>,
    /// Set on ai entries that asked for tools.
    pub tool_calls: Vec<ToolCall>,
}

impl TranscriptEntry {
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(EntryKind::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(EntryKind::Human, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(EntryKind::Ai, content)
    }

    pub fn ai_with_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(EntryKind::Ai, content)
        }
    }

    pub fn tool(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_name: Some(name.into()),
            ..Self::new(EntryKind::Tool, content)
        }
    }

    fn new(kind: EntryKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            tool_name: None,
            tool_calls: Vec::new(),
        }
    }
}

/// Output of a single crew task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutput {
    pub task: String,
    pub agent: String,
    pub raw: String,
}

/// Output of a whole crew run, in task order.
#[derive(Debug, Clone, Default)]
pub struct CrewOutput {
    pub tasks: Vec<TaskOutput>,
}

impl CrewOutput {
    /// The crew's result is the last task's output.
    pub fn raw(&self) -> &str {
        self.tasks.last().map(|t| t.raw.as_str()).unwrap_or_default()
    }
}

impl std::fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.raw())
    }
}
