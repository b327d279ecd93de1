//! Use cases orchestrating the deliberation pipeline.

pub mod run_deliberation;
pub mod summarize_title;

pub use run_deliberation::{
    RunDeliberationError, RunDeliberationInput, RunDeliberationUseCase,
};
pub use summarize_title::SummarizeTitleUseCase;
