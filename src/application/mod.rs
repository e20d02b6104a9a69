//! # Application Layer
//!
//! The agent runtime: the tool-calling loop, the sequential crew runner,
//! transcripts, answer cleanup and logging setup.

pub mod agent;
pub mod crew;
pub mod logging;
pub mod thought_cleaner;
pub mod transcript;
