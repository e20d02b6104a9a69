//! # LLM Module
//!
//! A small chat-completion wrapper with tool calling for Anthropic and
//! OpenAI-compatible APIs.
//!
//! ```rust,no_run
//! let client = Client::from_config(&app_config, "claude", None)?;
//! let request = ChatRequest::new(vec![Message::user("Hello")]).with_tools(tools);
//! let response = client.chat(request).await?;
//! println!("{}", response.text());
//! ```

mod client;
pub mod providers;
mod types;

pub use client::Client;

pub use types::{
    ChatRequest, ChatResponse, Error, Message, MessageRole, Provider, TokenUsage,
};
