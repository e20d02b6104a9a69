//! # MCP Module
//!
//! Model Context Protocol client side: one [`McpClient`] per server subprocess
//! and an [`McpManager`] that presents all of them as a single tool set.

pub mod client;
pub mod manager;

pub use client::McpClient;
pub use manager::McpManager;
