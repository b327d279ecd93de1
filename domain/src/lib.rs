//! Domain layer for council
//!
//! This crate contains the core business logic, entities, and value
//! objects of the deliberation pipeline. It has no dependencies on
//! infrastructure or presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Deliberation
//!
//! A user question is answered independently by several external models,
//! cross-evaluated by the same models acting as anonymous peer reviewers,
//! and synthesized into one authoritative answer by a fixed chairman.
//!
//! ## Event log
//!
//! The authoritative record of a run is an append-only sequence of
//! [`DeliberationEvent`]s; every structured result can be reconstructed
//! by replaying it through [`DeliberationView`].

pub mod core;
pub mod deliberation;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use crate::core::{error::DomainError, model::Model, question::Question};
pub use deliberation::{
    AggregateRanking, ChairmanResult, DeliberationEvent, DeliberationOutcome, DeliberationView,
    LabelMap, OutcomeMetadata, RunPhase, Stage, StageOneResult, StageTwoResult, StreamSlot,
    aggregate_rankings, parse_ranking,
};
pub use prompt::PromptTemplate;
pub use session::{Message, Role, StreamEvent};
