//! Application layer for council
//!
//! This crate contains the deliberation use cases and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    event_logger::{EventLogger, NoEventLogger},
    llm_gateway::{GatewayError, LlmGateway, StreamHandle},
};
pub use use_cases::{
    RunDeliberationError, RunDeliberationInput, RunDeliberationUseCase, SummarizeTitleUseCase,
};
