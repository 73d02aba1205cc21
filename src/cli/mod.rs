//! CLI command handlers

pub mod commands;

pub use commands::{analyze, inspect, load_config, show_config};
