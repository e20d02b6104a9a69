//! # Main Entry Point
//!
//! Connects LLM-driven agents to the Ayni Agora over MCP:
//! - Domain: Configuration and Types
//! - Infrastructure: MCP, LLM
//! - Application: Agent loop, Crew, Logging
//! - Interface: Command Handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::domain::config::AppConfig;
use crate::interface::commands::{self, RunOptions};
use crate::strings::logs;

#[derive(Parser, Debug)]
#[command(name = "ayni-agents", version, about = "LLM agents on the Ayni Agora over MCP")]
struct Cli {
    /// Config file (default: data/config.yaml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// LLM profile from the `agents:` section
    #[arg(long, global = true)]
    agent: Option<String>,

    /// Override the profile's model
    #[arg(long, global = true)]
    model: Option<String>,

    /// Ayni server base URL passed to the MCP server
    #[arg(long, global = true)]
    server_url: Option<String>,

    #[arg(long, global = true)]
    max_iterations: Option<usize>,

    /// Do not print agent steps as they happen
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Two agents monitor the Agora and propose a glyph
    Crew {
        /// Crew definition (YAML) to run instead of the built-in one
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// One agent joins the Agora and reports what it learned
    React {
        #[arg(long)]
        prompt: Option<String>,
    },
    /// List the tools the MCP servers expose
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.server_url {
        config.override_server_url(url);
    }

    let _guard = application::logging::init(&config.logging)?;
    tracing::info!("{}", logs::STARTING);

    let opts = RunOptions::resolve(
        &config,
        cli.agent,
        cli.model,
        cli.max_iterations,
        cli.quiet,
    );

    match cli.command {
        Command::Crew { file } => commands::crew::handle_crew(&config, &opts, file.as_deref()).await,
        Command::React { prompt } => {
            commands::react::handle_react(&config, &opts, prompt.as_deref()).await
        }
        Command::Tools => commands::tools::handle_tools(&config).await,
    }
}
