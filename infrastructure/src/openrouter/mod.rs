//! OpenRouter-compatible gateway adapter.

pub mod gateway;
mod protocol;

pub use gateway::OpenRouterGateway;
