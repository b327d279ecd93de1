//! Infrastructure layer for council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openrouter;

// Re-export commonly used types
pub use config::{ConfigLoader, FileApiConfig, FileConfig, FileCouncilConfig};
pub use logging::JsonlEventLogger;
pub use openrouter::OpenRouterGateway;
