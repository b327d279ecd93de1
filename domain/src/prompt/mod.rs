//! Prompt construction for all pipeline stages.

pub mod template;

pub use template::PromptTemplate;
