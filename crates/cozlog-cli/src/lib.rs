//! Robot usage report CLI library.
//!
//! This crate provides the CLI interface for the usage log analyser.

mod cli;
pub mod commands;
mod config;

pub use cli::Cli;
pub use config::Config;
