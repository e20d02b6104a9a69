//! Anthropic (Claude) provider
//!
//! Speaks the messages API with tool use. Tool results go back as `tool_result`
//! blocks inside a user turn; consecutive results for one assistant turn share
//! a single user message.

use serde::{Deserialize, Serialize};

use super::{ProviderConfig, error_message, http_client};
use crate::domain::types::{ToolCall, ToolSpec};
use crate::infrastructure::llm::{
    ChatRequest, ChatResponse, Error, Message, MessageRole, TokenUsage,
};

const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic API request format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool>,
}

/// Anthropic message format
#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<ContentBlock>,
}

/// Anthropic content block
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "std::ops::Not::not", default)]
        is_error: bool,
    },
}

#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

/// Response blocks; anything besides text and tool use (e.g. thinking) is skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

/// Anthropic usage information
#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Execute a chat request using Anthropic's API
pub async fn chat(config: &ProviderConfig, request: ChatRequest) -> Result<ChatResponse, Error> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| "https://api.anthropic.com".to_string());
    let url = format!("{}/v1/messages", base_url.trim_end_matches('/'));

    let body = build_request(config, request);

    let mut request_builder = http_client()
        .post(&url)
        .header("x-api-key", &config.api_key)
        .header("anthropic-version", API_VERSION)
        .header("Content-Type", "application/json")
        .json(&body);

    if let Some(timeout_secs) = config.timeout {
        request_builder = request_builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }

    tracing::debug!(model = %body.model, messages = body.messages.len(), tools = body.tools.len(), "Sending Anthropic request");

    let response = request_builder
        .send()
        .await
        .map_err(|e| Error::new("anthropic", format!("HTTP request failed: {}", e)))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(Error::new("anthropic", error_message(status, &error_text)));
    }

    let anthropic_response: AnthropicResponse = response
        .json()
        .await
        .map_err(|e| Error::new("anthropic", format!("Failed to parse response: {}", e)))?;

    Ok(parse_response(anthropic_response))
}

fn build_request(config: &ProviderConfig, request: ChatRequest) -> AnthropicRequest {
    let model = request
        .model
        .clone()
        .unwrap_or_else(|| config.default_model.clone());

    AnthropicRequest {
        model,
        max_tokens: request
            .max_tokens
            .or(config.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS),
        messages: convert_messages(&request.messages),
        system: request.system.filter(|s| !s.is_empty()),
        temperature: request.temperature.or(config.temperature),
        tools: request.tools.iter().map(convert_tool).collect(),
    }
}

fn convert_messages(messages: &[Message]) -> Vec<AnthropicMessage> {
    let mut converted: Vec<AnthropicMessage> = Vec::new();

    for msg in messages {
        match msg.role {
            MessageRole::User => converted.push(AnthropicMessage {
                role: "user".to_string(),
                content: vec![ContentBlock::Text {
                    text: msg.content.clone(),
                }],
            }),
            MessageRole::Assistant => {
                let mut content = Vec::new();
                if !msg.content.is_empty() {
                    content.push(ContentBlock::Text {
                        text: msg.content.clone(),
                    });
                }
                content.extend(msg.tool_calls.iter().map(|call| ContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.arguments.clone(),
                }));
                converted.push(AnthropicMessage {
                    role: "assistant".to_string(),
                    content,
                });
            }
            MessageRole::Tool => {
                let block = ContentBlock::ToolResult {
                    tool_use_id: msg.tool_call_id.clone().unwrap_or_default(),
                    content: msg.content.clone(),
                    is_error: msg.is_error,
                };

                let extends_previous = converted.last().is_some_and(|last| {
                    last.role == "user"
                        && last
                            .content
                            .iter()
                            .all(|b| matches!(b, ContentBlock::ToolResult { .. }))
                });

                match converted.last_mut() {
                    Some(last) if extends_previous => last.content.push(block),
                    _ => converted.push(AnthropicMessage {
                        role: "user".to_string(),
                        content: vec![block],
                    }),
                }
            }
        }
    }

    converted
}

fn convert_tool(tool: &ToolSpec) -> AnthropicTool {
    AnthropicTool {
        name: tool.name.clone(),
        description: tool.description.clone(),
        input_schema: tool.input_schema.clone(),
    }
}

fn parse_response(response: AnthropicResponse) -> ChatResponse {
    let mut text = Vec::new();
    let mut tool_calls = Vec::new();

    for block in response.content {
        match block {
            ResponseBlock::Text { text: t } => text.push(t),
            ResponseBlock::ToolUse { id, name, input } => {
                tool_calls.push(ToolCall::new(id, name, input))
            }
            ResponseBlock::Other => {}
        }
    }

    let content = if text.is_empty() {
        None
    } else {
        Some(text.join("\n"))
    };

    ChatResponse {
        content,
        tool_calls,
        stop_reason: response.stop_reason,
        model: response.model,
        usage: TokenUsage {
            prompt_tokens: response.usage.input_tokens,
            completion_tokens: response.usage.output_tokens,
            total_tokens: response.usage.input_tokens + response.usage.output_tokens,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ToolOutput;
    use serde_json::json;

    fn config() -> ProviderConfig {
        ProviderConfig {
            api_key: "sk-test".to_string(),
            base_url: None,
            default_model: "claude-sonnet-4-5-20250929".to_string(),
            timeout: None,
            max_tokens: None,
            temperature: None,
        }
    }

    #[test]
    fn test_request_encodes_tools_and_system() {
        let request = ChatRequest::new(vec![Message::user("Read the agora")])
            .with_system(Some("You are an Agora Monitor.".to_string()))
            .with_tools(vec![ToolSpec::new(
                "ayni_agora",
                "Read the agora timeline",
                json!({"type": "object", "properties": {}}),
            )]);

        let body = serde_json::to_value(build_request(&config(), request)).unwrap();

        assert_eq!(body["model"], "claude-sonnet-4-5-20250929");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["system"], "You are an Agora Monitor.");
        assert_eq!(body["tools"][0]["name"], "ayni_agora");
        assert_eq!(body["tools"][0]["input_schema"]["type"], "object");
        assert_eq!(body["messages"][0]["content"][0]["type"], "text");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_tool_round_is_encoded_as_blocks() {
        let calls = vec![
            ToolCall::new("toolu_1", "ayni_identify", json!({"name": "LangChainExplorer"})),
            ToolCall::new("toolu_2", "ayni_agora", json!({})),
        ];
        let messages = vec![
            Message::user("Join the agora"),
            Message::assistant_with_tools("", calls),
            Message::tool_result("toolu_1", &ToolOutput::text("registered")),
            Message::tool_result("toolu_2", &ToolOutput::error("timeline unavailable")),
        ];

        let converted = convert_messages(&messages);
        assert_eq!(converted.len(), 3);

        // Empty assistant text is dropped, only tool_use blocks remain.
        assert_eq!(converted[1].role, "assistant");
        assert_eq!(converted[1].content.len(), 2);

        // Both results share one user turn.
        assert_eq!(converted[2].role, "user");
        assert_eq!(
            converted[2].content,
            vec![
                ContentBlock::ToolResult {
                    tool_use_id: "toolu_1".to_string(),
                    content: "registered".to_string(),
                    is_error: false,
                },
                ContentBlock::ToolResult {
                    tool_use_id: "toolu_2".to_string(),
                    content: "timeline unavailable".to_string(),
                    is_error: true,
                },
            ]
        );

        let encoded = serde_json::to_value(&converted[2].content).unwrap();
        assert!(encoded[0].get("is_error").is_none());
        assert_eq!(encoded[1]["is_error"], true);
    }

    #[test]
    fn test_parse_tool_use_response() {
        let raw = json!({
            "id": "msg_1",
            "model": "claude-sonnet-4-5-20250929",
            "role": "assistant",
            "content": [
                {"type": "thinking", "thinking": "hmm", "signature": "x"},
                {"type": "text", "text": "Registering first."},
                {"type": "tool_use", "id": "toolu_9", "name": "ayni_identify", "input": {"name": "CrewAI-Monitor"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 120, "output_tokens": 30}
        });

        let response: AnthropicResponse = serde_json::from_value(raw).unwrap();
        let parsed = parse_response(response);

        assert_eq!(parsed.text(), "Registering first.");
        assert_eq!(parsed.stop_reason.as_deref(), Some("tool_use"));
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.tool_calls[0].name, "ayni_identify");
        assert_eq!(parsed.tool_calls[0].arguments["name"], "CrewAI-Monitor");
        assert_eq!(parsed.usage.total_tokens, 150);
    }
}
