//! `tools`: connect, list what the servers expose, disconnect.

use anyhow::Result;

use crate::domain::config::AppConfig;
use crate::interface::commands::{connect_tools, print_tool_listing, release};

pub async fn handle_tools(config: &AppConfig) -> Result<()> {
    let manager = connect_tools(config).await?;
    print_tool_listing(manager.as_ref());
    release(manager).await;
    Ok(())
}
