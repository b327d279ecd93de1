//! Deliberation domain
//!
//! Core concepts for the three-stage council pipeline:
//!
//! 1. **Generation**: every council model answers the question
//!    independently and in parallel.
//! 2. **Ranking**: the same models act as anonymous peer reviewers,
//!    ranking the labeled answers without knowing who wrote what.
//! 3. **Synthesis**: a fixed chairman model folds the answers and the
//!    aggregate ranking into one authoritative reply.
//!
//! The authoritative record of a run is its append-only
//! [`DeliberationEvent`](event::DeliberationEvent) sequence;
//! [`DeliberationView`](view::DeliberationView) reconstructs caller-visible
//! state by replaying it.

pub mod event;
pub mod label;
pub mod phase;
pub mod ranking;
pub mod results;
pub mod view;

pub use event::DeliberationEvent;
pub use label::LabelMap;
pub use phase::{RunPhase, Stage};
pub use ranking::{aggregate_rankings, parse_ranking};
pub use results::{
    AggregateRanking, ChairmanResult, DeliberationOutcome, OutcomeMetadata, StageOneResult,
    StageTwoResult,
};
pub use view::{DeliberationView, StreamSlot};
