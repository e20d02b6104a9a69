//! # ReAct Command
//!
//! One agent, one message. The agent has no persona; the prompt itself tells
//! it who it is. The full transcript is printed once the run ends.

use std::sync::Arc;

use anyhow::Result;

use crate::application::agent::ToolAgent;
use crate::application::transcript::Transcript;
use crate::domain::config::AppConfig;
use crate::domain::traits::{LlmProvider, ToolProvider};
use crate::domain::types::AgentDefinition;
use crate::interface::commands::{RunOptions, build_llm, connect_tools, print_tool_listing, release};
use crate::strings::ayni;

pub async fn handle_react(config: &AppConfig, opts: &RunOptions, prompt: Option<&str>) -> Result<()> {
    let profile = opts
        .agent
        .clone()
        .unwrap_or_else(|| config.runtime.default_agent.clone());
    let llm = build_llm(config, &profile, opts.model.as_deref())?;
    let prompt = prompt.unwrap_or(ayni::EXPLORER_PROMPT);

    let manager = connect_tools(config).await?;
    print_tool_listing(manager.as_ref());

    let result = run_explorer(llm, manager.clone(), opts.max_iterations, prompt).await;
    release(manager).await;

    let transcript = result?;
    println!("{}", transcript.render());
    Ok(())
}

/// Run the explorer agent and hand back everything it said and did.
async fn run_explorer(
    llm: Arc<dyn LlmProvider>,
    tools: Arc<dyn ToolProvider>,
    max_iterations: usize,
    prompt: &str,
) -> Result<Transcript> {
    let definition = AgentDefinition {
        name: ayni::EXPLORER_NAME.to_string(),
        ..Default::default()
    };
    let agent = ToolAgent::new(definition, llm, tools, max_iterations);

    // Printed in one piece afterwards, not step by step.
    let mut transcript = Transcript::new(false);
    agent.run(prompt, &mut transcript).await?;
    Ok(transcript)
}
