//! # Crew
//!
//! Sequential multi-agent runner. Each task is handed to its agent as a
//! prompt; outputs of the tasks it lists as `context` are appended to it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::agent::ToolAgent;
use crate::application::transcript::Transcript;
use crate::domain::traits::{LlmProvider, ToolProvider};
use crate::domain::types::{
    AgentDefinition, CrewDefinition, CrewOutput, TaskOutput, TranscriptEntry,
};
use crate::strings::{messages, prompts};

/// Problems found in a crew definition before anything is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrewError {
    NoTasks,
    DuplicateAgent(String),
    DuplicateTask(String),
    UnknownAgent { task: String, agent: String },
    /// A context entry that does not name an earlier task.
    UnknownContext { task: String, context: String },
}

impl std::fmt::Display for CrewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrewError::NoTasks => write!(f, "Crew has no tasks"),
            CrewError::DuplicateAgent(name) => write!(f, "Agent '{}' is defined twice", name),
            CrewError::DuplicateTask(name) => write!(f, "Task '{}' is defined twice", name),
            CrewError::UnknownAgent { task, agent } => {
                write!(f, "Task '{}' is assigned to unknown agent '{}'", task, agent)
            }
            CrewError::UnknownContext { task, context } => write!(
                f,
                "Task '{}' uses '{}' as context, which is not an earlier task",
                task, context
            ),
        }
    }
}

impl std::error::Error for CrewError {}

/// Check a crew definition. Context may only point backwards.
pub fn validate(definition: &CrewDefinition) -> Result<(), CrewError> {
    if definition.tasks.is_empty() {
        return Err(CrewError::NoTasks);
    }

    let mut agents = HashSet::new();
    for agent in &definition.agents {
        if !agents.insert(agent.name.as_str()) {
            return Err(CrewError::DuplicateAgent(agent.name.clone()));
        }
    }

    let mut seen = HashSet::new();
    for task in &definition.tasks {
        if seen.contains(task.name.as_str()) {
            return Err(CrewError::DuplicateTask(task.name.clone()));
        }
        if !agents.contains(task.agent.as_str()) {
            return Err(CrewError::UnknownAgent {
                task: task.name.clone(),
                agent: task.agent.clone(),
            });
        }
        if let Some(missing) = task.context.iter().find(|c| !seen.contains(c.as_str())) {
            return Err(CrewError::UnknownContext {
                task: task.name.clone(),
                context: missing.clone(),
            });
        }
        seen.insert(task.name.as_str());
    }

    Ok(())
}

pub struct Crew {
    definition: CrewDefinition,
    tools: Arc<dyn ToolProvider>,
    default_llm: Arc<dyn LlmProvider>,
    agent_llms: HashMap<String, Arc<dyn LlmProvider>>,
    max_iterations: usize,
    verbose: bool,
}

impl Crew {
    pub fn new(
        definition: CrewDefinition,
        tools: Arc<dyn ToolProvider>,
        default_llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            definition,
            tools,
            default_llm,
            agent_llms: HashMap::new(),
            max_iterations: 20,
            verbose: true,
        }
    }

    /// Use a dedicated model for one agent.
    pub fn with_agent_llm(mut self, agent: impl Into<String>, llm: Arc<dyn LlmProvider>) -> Self {
        self.agent_llms.insert(agent.into(), llm);
        self
    }

    pub fn with_options(mut self, max_iterations: usize, verbose: bool) -> Self {
        self.max_iterations = max_iterations;
        self.verbose = verbose;
        self
    }

    fn agent(&self, name: &str) -> Option<&AgentDefinition> {
        self.definition.agents.iter().find(|a| a.name == name)
    }

    /// Run every task in order. The first failing task aborts the crew.
    pub async fn kickoff(&self) -> Result<CrewOutput> {
        validate(&self.definition).context("Invalid crew definition")?;

        tracing::info!(
            agents = self.definition.agents.len(),
            tasks = self.definition.tasks.len(),
            process = ?self.definition.process,
            "Crew kickoff"
        );

        let mut output = CrewOutput::default();

        for task in &self.definition.tasks {
            // Validation guarantees the agent exists.
            let Some(definition) = self.agent(&task.agent) else {
                continue;
            };

            let context: Vec<&TaskOutput> = task
                .context
                .iter()
                .filter_map(|name| output.tasks.iter().find(|t| &t.task == name))
                .collect();
            let prompt = prompts::task_prompt(task, &context);

            let verbose = definition.verbose.unwrap_or(self.verbose);
            let mut transcript = Transcript::new(verbose);
            let role = if definition.role.is_empty() {
                definition.name.as_str()
            } else {
                definition.role.as_str()
            };
            transcript.push(TranscriptEntry::system(messages::agent_header(role)));
            transcript.push(TranscriptEntry::system(messages::task_header(
                task.description.trim(),
            )));

            let llm = self
                .agent_llms
                .get(&definition.name)
                .cloned()
                .unwrap_or_else(|| self.default_llm.clone());
            let agent = ToolAgent::new(
                definition.clone(),
                llm,
                self.tools.clone(),
                self.max_iterations,
            );

            tracing::info!(task = %task.name, agent = %definition.name, context = context.len(), "Task started");
            let run = agent
                .run(&prompt, &mut transcript)
                .await
                .with_context(|| format!("Task '{}' failed", task.name))?;
            tracing::info!(
                task = %task.name,
                iterations = run.iterations,
                tool_calls = run.tool_calls,
                steps = transcript.entries().len(),
                total_tokens = run.usage.total_tokens,
                "Task completed"
            );

            output.tasks.push(TaskOutput {
                task: task.name.clone(),
                agent: definition.name.clone(),
                raw: run.answer,
            });
        }

        Ok(output)
    }
}
