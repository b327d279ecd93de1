//! Presentation layer for council
//!
//! This crate contains CLI definitions, the live event-stream renderer,
//! and output formatters.

pub mod cli;
pub mod live;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use live::LiveRenderer;
pub use output::ConsoleFormatter;
