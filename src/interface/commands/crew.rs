//! # Crew Command
//!
//! Runs the built-in Ayni crew (monitor, then proposer) or one read from a
//! YAML file, and prints the last task's output.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::crew::{self, Crew};
use crate::domain::config::AppConfig;
use crate::domain::traits::LlmProvider;
use crate::domain::types::{AgentDefinition, CrewDefinition, CrewOutput, Process, TaskDefinition};
use crate::interface::commands::{RunOptions, build_llm, connect_tools, print_tool_listing, release};
use crate::strings::{ayni, messages};

pub async fn handle_crew(config: &AppConfig, opts: &RunOptions, file: Option<&Path>) -> Result<()> {
    let definition = match file {
        Some(path) => load_crew_file(path)?,
        None => default_crew(),
    };
    crew::validate(&definition).context("Invalid crew definition")?;

    let profile = opts
        .agent
        .clone()
        .unwrap_or_else(|| config.runtime.crew_agent.clone());
    let default_llm = build_llm(config, &profile, opts.model.as_deref())?;

    // Agents that name their own profile get a dedicated client.
    let mut agent_llms: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();
    for agent in &definition.agents {
        if let Some(agent_profile) = &agent.llm
            && *agent_profile != profile
        {
            agent_llms.insert(agent.name.clone(), build_llm(config, agent_profile, None)?);
        }
    }

    let manager = connect_tools(config).await?;
    if opts.verbose {
        print_tool_listing(manager.as_ref());
    }

    let mut crew = Crew::new(definition, manager.clone(), default_llm)
        .with_options(opts.max_iterations, opts.verbose);
    for (agent, llm) in agent_llms {
        crew = crew.with_agent_llm(agent, llm);
    }

    let result = crew.kickoff().await;
    drop(crew);
    release(manager).await;

    let output = result?;
    print_result(&output);
    Ok(())
}

fn print_result(output: &CrewOutput) {
    println!("{}", messages::CREW_RESULT_HEADER);
    println!("{}", output);
}

pub fn load_crew_file(path: &Path) -> Result<CrewDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read crew file {}", path.display()))?;
    let definition: CrewDefinition = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse crew file {}", path.display()))?;
    Ok(definition)
}

/// Monitor reads the Agora; proposer fills a vocabulary gap using that report.
pub fn default_crew() -> CrewDefinition {
    CrewDefinition {
        agents: vec![
            AgentDefinition {
                name: ayni::MONITOR_NAME.to_string(),
                role: ayni::MONITOR_ROLE.to_string(),
                goal: ayni::MONITOR_GOAL.to_string(),
                backstory: ayni::MONITOR_BACKSTORY.to_string(),
                ..Default::default()
            },
            AgentDefinition {
                name: ayni::PROPOSER_NAME.to_string(),
                role: ayni::PROPOSER_ROLE.to_string(),
                goal: ayni::PROPOSER_GOAL.to_string(),
                backstory: ayni::PROPOSER_BACKSTORY.to_string(),
                ..Default::default()
            },
        ],
        tasks: vec![
            TaskDefinition {
                name: ayni::MONITOR_TASK_NAME.to_string(),
                description: ayni::MONITOR_TASK.to_string(),
                expected_output: ayni::MONITOR_EXPECTED.to_string(),
                agent: ayni::MONITOR_NAME.to_string(),
                context: vec![],
            },
            TaskDefinition {
                name: ayni::PROPOSE_TASK_NAME.to_string(),
                description: ayni::PROPOSE_TASK.to_string(),
                expected_output: ayni::PROPOSE_EXPECTED.to_string(),
                agent: ayni::PROPOSER_NAME.to_string(),
                context: vec![ayni::MONITOR_TASK_NAME.to_string()],
            },
        ],
        process: Process::Sequential,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_crew_is_valid() {
        let definition = default_crew();
        assert_eq!(crew::validate(&definition), Ok(()));
        assert_eq!(definition.tasks[1].context, vec!["monitor_agora"]);
        assert_eq!(definition.tasks[0].agent, "monitor");
    }

    #[test]
    fn test_load_crew_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            r#"
agents:
  - name: scout
    role: Scout
    llm: claude
tasks:
  - name: look
    description: Read the agora with ayni_agora
    agent: scout
"#
        )?;

        let definition = load_crew_file(file.path())?;
        assert_eq!(definition.agents[0].llm.as_deref(), Some("claude"));
        assert_eq!(definition.tasks[0].description, "Read the agora with ayni_agora");
        assert_eq!(crew::validate(&definition), Ok(()));
        Ok(())
    }

    #[test]
    fn test_load_crew_file_errors() {
        let err = load_crew_file(Path::new("/nonexistent/crew.yaml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read crew file"));
    }
}
