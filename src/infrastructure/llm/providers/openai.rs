//! OpenAI-compatible API provider
//!
//! Supports OpenAI, Groq, XAI and other OpenAI-compatible chat completion APIs,
//! including function calling.

use serde::{Deserialize, Serialize};

use super::{ProviderConfig, error_message, http_client};
use crate::domain::types::{ToolCall, ToolSpec};
use crate::infrastructure::llm::{
    ChatRequest, ChatResponse, Error, Message, MessageRole, Provider, TokenUsage,
};

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAITool>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    /// Null for assistant turns that only call tools.
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OpenAIToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    /// JSON-encoded arguments.
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn function_type() -> String {
    "function".to_string()
}

/// Execute a chat request using OpenAI-compatible API
pub async fn chat(
    provider: Provider,
    config: &ProviderConfig,
    request: ChatRequest,
) -> Result<ChatResponse, Error> {
    let name = provider.as_str();
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

    let body = build_request(config, request);

    let mut request_builder = http_client()
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .header("Content-Type", "application/json")
        .json(&body);

    if let Some(timeout_secs) = config.timeout {
        request_builder = request_builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }

    tracing::debug!(provider = name, model = %body.model, messages = body.messages.len(), tools = body.tools.len(), "Sending chat completion request");

    let response = request_builder
        .send()
        .await
        .map_err(|e| Error::new(name, format!("HTTP request failed: {}", e)))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(Error::new(name, error_message(status, &error_text)));
    }

    let openai_response: OpenAIResponse = response
        .json()
        .await
        .map_err(|e| Error::new(name, format!("Failed to parse response: {}", e)))?;

    parse_response(name, openai_response)
}

fn build_request(config: &ProviderConfig, request: ChatRequest) -> OpenAIRequest {
    let model = request
        .model
        .clone()
        .unwrap_or_else(|| config.default_model.clone());

    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = request.system.filter(|s| !s.is_empty()) {
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: Some(system),
            tool_calls: Vec::new(),
            tool_call_id: None,
        });
    }
    messages.extend(request.messages.iter().map(convert_message));

    OpenAIRequest {
        model,
        messages,
        temperature: request.temperature.or(config.temperature),
        max_tokens: request.max_tokens.or(config.max_tokens),
        tools: request.tools.iter().map(convert_tool).collect(),
    }
}

fn convert_message(msg: &Message) -> OpenAIMessage {
    let content = match msg.role {
        MessageRole::Assistant if msg.content.is_empty() && !msg.tool_calls.is_empty() => None,
        // Some OpenAI-compatible servers ignore tool error flags; make failures visible in the text.
        MessageRole::Tool if msg.is_error => Some(format!("Error: {}", msg.content)),
        _ => Some(msg.content.clone()),
    };

    OpenAIMessage {
        role: msg.role.as_str().to_string(),
        content,
        tool_calls: msg
            .tool_calls
            .iter()
            .map(|call| OpenAIToolCall {
                id: call.id.clone(),
                call_type: function_type(),
                function: OpenAIFunctionCall {
                    name: call.name.clone(),
                    arguments: encode_arguments(call),
                },
            })
            .collect(),
        tool_call_id: msg.tool_call_id.clone(),
    }
}

fn convert_tool(tool: &ToolSpec) -> OpenAITool {
    OpenAITool {
        tool_type: function_type(),
        function: OpenAIFunction {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.input_schema.clone(),
        },
    }
}

fn parse_response(name: &str, response: OpenAIResponse) -> Result<ChatResponse, Error> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::new(name, "No choices in response"))?;

    let calls = choice.message.tool_calls.unwrap_or_default();
    let mut tool_calls = Vec::with_capacity(calls.len());
    for call in calls {
        let tool_call = match parse_arguments(&call.function.arguments) {
            Ok(arguments) => ToolCall::new(call.id, call.function.name, arguments),
            Err(e) => {
                tracing::warn!(
                    provider = name,
                    tool = %call.function.name,
                    "Tool call arguments are not valid JSON: {}",
                    e
                );
                ToolCall::invalid(
                    call.id,
                    call.function.name,
                    call.function.arguments,
                    e.to_string(),
                )
            }
        };
        tool_calls.push(tool_call);
    }

    let usage = response
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(ChatResponse {
        content: choice.message.content.filter(|c| !c.is_empty()),
        tool_calls,
        stop_reason: choice.finish_reason,
        model: response.model,
        usage,
    })
}

/// Unparseable arguments go back to the API exactly as the model sent them.
fn encode_arguments(call: &ToolCall) -> String {
    match (&call.invalid_arguments, &call.arguments) {
        (Some(_), serde_json::Value::String(raw)) => raw.clone(),
        _ => call.arguments.to_string(),
    }
}

/// Models sometimes send an empty string for "no arguments".
fn parse_arguments(raw: &str) -> Result<serde_json::Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(serde_json::Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}
