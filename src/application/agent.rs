//! # Tool Agent
//!
//! The reason-act loop: ask the model, run the tools it asks for, feed the
//! results back, and stop when it answers without calling a tool.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};

use crate::application::thought_cleaner::clean_answer;
use crate::application::transcript::Transcript;
use crate::domain::traits::{LlmProvider, ToolProvider};
use crate::domain::types::{AgentDefinition, ToolOutput, TranscriptEntry};
use crate::infrastructure::llm::{ChatRequest, Message, TokenUsage};
use crate::strings::{logs, prompts};

/// Result of one agent run.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub answer: String,
    /// Number of LLM calls made.
    pub iterations: usize,
    pub tool_calls: usize,
    pub usage: TokenUsage,
}

pub struct ToolAgent {
    definition: AgentDefinition,
    llm: Arc<dyn LlmProvider>,
    tools: Arc<dyn ToolProvider>,
    max_iterations: usize,
}

impl ToolAgent {
    pub fn new(
        definition: AgentDefinition,
        llm: Arc<dyn LlmProvider>,
        tools: Arc<dyn ToolProvider>,
        max_iterations: usize,
    ) -> Self {
        let max_iterations = definition.max_iterations.unwrap_or(max_iterations).max(1);
        Self {
            definition,
            llm,
            tools,
            max_iterations,
        }
    }

    /// Run `prompt` to a final answer, recording every step in `transcript`.
    pub async fn run(&self, prompt: &str, transcript: &mut Transcript) -> Result<AgentRun> {
        let name = self.definition.name.as_str();
        let system = prompts::agent_system_prompt(&self.definition);
        let tools = self.tools.tools().to_vec();

        tracing::info!(
            agent = name,
            llm = %self.llm.describe(),
            tools = tools.len(),
            max_iterations = self.max_iterations,
            "Agent run started"
        );

        let mut messages = vec![Message::user(prompt)];
        transcript.push(TranscriptEntry::human(prompt));

        let mut usage = TokenUsage::default();
        let mut tool_calls = 0;

        for iteration in 1..=self.max_iterations {
            let request = ChatRequest::new(messages.clone())
                .with_system(system.clone())
                .with_tools(tools.clone());

            let response = self
                .llm
                .chat(request)
                .await
                .with_context(|| logs::llm_fail(name))?;
            usage.add(&response.usage);

            tracing::debug!(
                agent = name,
                iteration,
                model = %response.model,
                stop_reason = ?response.stop_reason,
                tool_calls = response.tool_calls.len(),
                "LLM responded"
            );

            if response.tool_calls.is_empty() {
                let answer = clean_answer(response.text());
                transcript.push(TranscriptEntry::ai(answer.clone()));
                tracing::info!(agent = name, iteration, tool_calls, total_tokens = usage.total_tokens, "Agent finished");
                return Ok(AgentRun {
                    answer,
                    iterations: iteration,
                    tool_calls,
                    usage,
                });
            }

            let text = response.text().to_string();
            transcript.push(TranscriptEntry::ai_with_calls(
                text.clone(),
                response.tool_calls.clone(),
            ));
            messages.push(Message::assistant_with_tools(
                text,
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                tool_calls += 1;
                let result = match &call.invalid_arguments {
                    Some(reason) => Err(anyhow!(logs::invalid_arguments(reason))),
                    None => self.tools.call_tool(&call.name, call.arguments.clone()).await,
                };
                let output = match result {
                    Ok(output) => output,
                    Err(e) => {
                        let message = logs::tool_fail(&call.name, &format!("{:#}", e));
                        tracing::warn!(agent = name, tool = %call.name, "{}", message);
                        ToolOutput::error(message)
                    }
                };

                transcript.push(TranscriptEntry::tool(&call.name, &output.content));
                messages.push(Message::tool_result(&call.id, &output));
            }
        }

        bail!(logs::iteration_limit(name, self.max_iterations))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::types::{EntryKind, ToolCall, ToolSpec};
    use crate::infrastructure::llm::{ChatResponse, Error, MessageRole};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and remembers every request.
    pub(crate) struct ScriptedLlm {
        responses: Mutex<VecDeque<ChatResponse>>,
        pub(crate) requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedLlm {
        pub(crate) fn new(responses: Vec<ChatResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, Error> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::new("scripted", "no more responses"))
        }

        fn describe(&self) -> String {
            "scripted/test".to_string()
        }
    }

    /// Echoes arguments back; `fail_on` names a tool that always errors.
    pub(crate) struct FakeTools {
        specs: Vec<ToolSpec>,
        fail_on: Option<String>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl FakeTools {
        pub(crate) fn new(names: &[&str]) -> Self {
            Self {
                specs: names
                    .iter()
                    .map(|n| ToolSpec::new(*n, format!("{} tool", n), json!({"type": "object"})))
                    .collect(),
                fail_on: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(mut self, name: &str) -> Self {
            self.fail_on = Some(name.to_string());
            self
        }
    }

    #[async_trait]
    impl ToolProvider for FakeTools {
        fn tools(&self) -> &[ToolSpec] {
            &self.specs
        }

        async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> Result<ToolOutput> {
            self.calls.lock().unwrap().push(name.to_string());
            if self.fail_on.as_deref() == Some(name) {
                bail!("server closed the connection");
            }
            Ok(ToolOutput::text(format!("{} ok {}", name, arguments)))
        }
    }

    pub(crate) fn answer(text: &str) -> ChatResponse {
        ChatResponse {
            content: Some(text.to_string()),
            stop_reason: Some("end_turn".to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn call(id: &str, name: &str, arguments: serde_json::Value) -> ChatResponse {
        ChatResponse {
            tool_calls: vec![ToolCall::new(id, name, arguments)],
            stop_reason: Some("tool_use".to_string()),
            ..Default::default()
        }
    }

    fn explorer() -> AgentDefinition {
        AgentDefinition {
            name: "explorer".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_answer_without_tools() -> Result<()> {
        let llm = Arc::new(ScriptedLlm::new(vec![answer("  Nothing to do.  ")]));
        let tools = Arc::new(FakeTools::new(&["ayni_agora"]));
        let agent = ToolAgent::new(explorer(), llm.clone(), tools.clone(), 5);

        let mut transcript = Transcript::new(false);
        let run = agent.run("Say hi", &mut transcript).await?;

        assert_eq!(run.answer, "Nothing to do.");
        assert_eq!(run.iterations, 1);
        assert_eq!(run.tool_calls, 0);
        assert!(tools.calls.lock().unwrap().is_empty());

        let requests = llm.requests.lock().unwrap();
        assert!(requests[0].system.is_none());
        assert_eq!(requests[0].tools.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_call_then_answer() -> Result<()> {
        let llm = Arc::new(ScriptedLlm::new(vec![
            call("c1", "ayni_identify", json!({"name": "LangChainExplorer"})),
            answer("Registered and read the agora."),
        ]));
        let tools = Arc::new(FakeTools::new(&["ayni_identify", "ayni_agora"]));
        let agent = ToolAgent::new(explorer(), llm.clone(), tools.clone(), 5);

        let mut transcript = Transcript::new(false);
        let run = agent.run("Join the agora", &mut transcript).await?;

        assert_eq!(run.answer, "Registered and read the agora.");
        assert_eq!(run.iterations, 2);
        assert_eq!(run.tool_calls, 1);
        assert_eq!(*tools.calls.lock().unwrap(), vec!["ayni_identify"]);

        // The second request carries the assistant turn and the tool result.
        let requests = llm.requests.lock().unwrap();
        let second = &requests[1].messages;
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].role, MessageRole::Assistant);
        assert_eq!(second[1].tool_calls[0].name, "ayni_identify");
        assert_eq!(second[2].role, MessageRole::Tool);
        assert_eq!(second[2].tool_call_id.as_deref(), Some("c1"));
        assert!(second[2].content.starts_with("ayni_identify ok"));

        let kinds: Vec<EntryKind> = transcript.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EntryKind::Human, EntryKind::Ai, EntryKind::Tool, EntryKind::Ai]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_failure_is_fed_back() -> Result<()> {
        let llm = Arc::new(ScriptedLlm::new(vec![
            call("c1", "ayni_encode", json!({"text": "summarize data"})),
            answer("Encoding failed, proposing a glyph instead."),
        ]));
        let tools = Arc::new(FakeTools::new(&["ayni_encode"]).failing("ayni_encode"));
        let agent = ToolAgent::new(explorer(), llm.clone(), tools, 5);

        let mut transcript = Transcript::new(false);
        let run = agent.run("Encode", &mut transcript).await?;
        assert_eq!(run.answer, "Encoding failed, proposing a glyph instead.");

        let requests = llm.requests.lock().unwrap();
        let result = &requests[1].messages[2];
        assert!(result.is_error);
        assert!(result.content.contains("server closed the connection"));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_fed_back() -> Result<()> {
        let llm = Arc::new(ScriptedLlm::new(vec![
            ChatResponse {
                tool_calls: vec![ToolCall::invalid(
                    "c1",
                    "ayni_identify",
                    "{\"name\": ",
                    "EOF while parsing an object",
                )],
                ..Default::default()
            },
            answer("Retried without the tool."),
        ]));
        let tools = Arc::new(FakeTools::new(&["ayni_identify"]));
        let agent = ToolAgent::new(explorer(), llm.clone(), tools.clone(), 5);

        let mut transcript = Transcript::new(false);
        let run = agent.run("Register", &mut transcript).await?;
        assert_eq!(run.answer, "Retried without the tool.");

        // The tool itself is never invoked.
        assert!(tools.calls.lock().unwrap().is_empty());

        let requests = llm.requests.lock().unwrap();
        let result = &requests[1].messages[2];
        assert_eq!(result.role, MessageRole::Tool);
        assert!(result.is_error);
        assert!(result.content.contains("not valid JSON"));
        assert!(result.content.contains("EOF while parsing"));
        Ok(())
    }

    #[tokio::test]
    async fn test_final_answer_is_cleaned_in_transcript() -> Result<()> {
        let llm = Arc::new(ScriptedLlm::new(vec![answer(
            "<thinking>secret plan</thinking>\nRegistered.",
        )]));
        let tools = Arc::new(FakeTools::new(&[]));
        let agent = ToolAgent::new(explorer(), llm, tools, 3);

        let mut transcript = Transcript::new(false);
        let run = agent.run("go", &mut transcript).await?;

        assert_eq!(run.answer, "Registered.");
        assert_eq!(transcript.entries()[1].content, "Registered.");
        Ok(())
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            call("c1", "ayni_agora", json!({})),
            call("c2", "ayni_agora", json!({})),
            call("c3", "ayni_agora", json!({})),
        ]));
        let tools = Arc::new(FakeTools::new(&["ayni_agora"]));
        let agent = ToolAgent::new(explorer(), llm, tools.clone(), 2);

        let mut transcript = Transcript::new(false);
        let err = agent.run("Loop forever", &mut transcript).await.unwrap_err();

        assert!(err.to_string().contains("iteration limit (2)"));
        assert_eq!(tools.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_definition_limit_overrides_default() {
        let llm = Arc::new(ScriptedLlm::new(vec![call("c1", "ayni_agora", json!({}))]));
        let tools = Arc::new(FakeTools::new(&["ayni_agora"]));
        let definition = AgentDefinition {
            max_iterations: Some(1),
            ..explorer()
        };
        let agent = ToolAgent::new(definition, llm, tools, 10);

        let mut transcript = Transcript::new(false);
        let err = agent.run("Go", &mut transcript).await.unwrap_err();
        assert!(err.to_string().contains("iteration limit (1)"));
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let tools = Arc::new(FakeTools::new(&[]));
        let agent = ToolAgent::new(explorer(), llm, tools, 3);

        let mut transcript = Transcript::new(false);
        let err = agent.run("Go", &mut transcript).await.unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("LLM call failed for agent 'explorer'"));
        assert!(chain.contains("no more responses"));
    }
}
