//! # Interface Layer
//!
//! Entry points reached from the command line.

pub mod commands;
