//! # Strings Module
//!
//! Centralizes user-facing strings, prompts, and the built-in Ayni task texts.
//! Ensures consistency in messaging and easier updates.

pub mod ayni;
pub mod logs;
pub mod messages;
pub mod prompts;
