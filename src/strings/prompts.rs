use crate::domain::types::{AgentDefinition, TaskDefinition, TaskOutput};

/// A builder for rendering prompts with context.
pub struct PromptRenderer<'a> {
    template: &'a str,
    replacements: Vec<(&'a str, String)>,
}

impl<'a> PromptRenderer<'a> {
    pub fn new(template: &'a str) -> Self {
        Self {
            template,
            replacements: Vec::new(),
        }
    }

    pub fn set(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.replacements.push((key, value.into()));
        self
    }

    pub fn render(self) -> String {
        let mut result = self.template.to_string();
        for (key, value) in self.replacements {
            result = result.replace(key, &value);
        }

        if let Some(start) = result.find("{{")
            && let Some(end) = result[start..].find("}}")
        {
            let placeholder = &result[start..start + end + 2];
            tracing::error!("Unreplaced placeholder in rendered prompt: {}", placeholder);
        }

        result
    }
}

pub const AGENT_SYSTEM_TEMPLATE: &str = include_str!("../../prompts/agent_system.md");
pub const TASK_TEMPLATE: &str = include_str!("../../prompts/task.md");
pub const TASK_CONTEXT_TEMPLATE: &str = include_str!("../../prompts/task_context.md");

/// Separator between the outputs of several context tasks.
const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// System prompt for a role-playing agent.
///
/// An agent with no role, goal or backstory gets no system prompt at all.
pub fn agent_system_prompt(agent: &AgentDefinition) -> Option<String> {
    if agent.role.is_empty() && agent.goal.is_empty() && agent.backstory.is_empty() {
        return None;
    }

    let role = if agent.role.is_empty() {
        agent.name.as_str()
    } else {
        agent.role.as_str()
    };

    Some(
        PromptRenderer::new(AGENT_SYSTEM_TEMPLATE)
            .set("{{ROLE}}", role)
            .set("{{BACKSTORY}}", agent.backstory.trim())
            .set("{{GOAL}}", agent.goal.trim())
            .render()
            .trim()
            .to_string(),
    )
}

/// User prompt for a crew task, with the outputs of its context tasks appended.
pub fn task_prompt(task: &TaskDefinition, context: &[&TaskOutput]) -> String {
    let expected = if task.expected_output.trim().is_empty() {
        "A complete answer to the task."
    } else {
        task.expected_output.trim()
    };

    let mut prompt = PromptRenderer::new(TASK_TEMPLATE)
        .set("{{DESCRIPTION}}", task.description.trim())
        .set("{{EXPECTED_OUTPUT}}", expected)
        .render();

    if !context.is_empty() {
        let joined = context
            .iter()
            .map(|output| format!("### {}\n{}", output.task, output.raw.trim()))
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);
        prompt.push_str(
            &PromptRenderer::new(TASK_CONTEXT_TEMPLATE)
                .set("{{CONTEXT}}", joined)
                .render(),
        );
    }

    prompt.trim().to_string()
}
