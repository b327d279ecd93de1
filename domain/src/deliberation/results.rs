//! Deliberation result value objects - immutable outputs of each stage.
//!
//! These types represent the outputs of the three-stage pipeline:
//! - [`StageOneResult`] - one model's independent answer
//! - [`StageTwoResult`] - one judge's ranking of the anonymized answers
//! - [`AggregateRanking`] - cross-judge average position for one model
//! - [`ChairmanResult`] - the chairman's synthesized final answer
//! - [`DeliberationOutcome`] - complete result of a run, for persistence
//!
//! Each stage's results are append-only relative to the previous stage:
//! nothing here is mutated after its owning stage completes.

use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One model's answer from the independent generation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOneResult {
    /// The model that produced this answer
    pub model: Model,
    /// The answer text (empty on failure)
    pub content: String,
    /// Whether the model reached a successful terminal state
    pub success: bool,
    /// Human-readable cause if the call failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageOneResult {
    pub fn success(model: Model, content: impl Into<String>) -> Self {
        Self {
            model,
            content: content.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(model: Model, error: impl Into<String>) -> Self {
        Self {
            model,
            content: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }

    /// A result is usable for stage 2 only if it succeeded with actual text.
    /// Judges should never be asked to rank a non-answer.
    pub fn is_usable(&self) -> bool {
        self.success && !self.content.trim().is_empty()
    }
}

/// One judge's ranking from the peer evaluation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTwoResult {
    /// The judge model
    pub model: Model,
    /// Raw free-text ranking response (shown even when parsing fails)
    pub ranking: String,
    /// Parsed ordered labels, best first; empty if parsing failed
    #[serde(default)]
    pub parsed_ranking: Vec<String>,
    /// Whether the judge's call reached a successful terminal state
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageTwoResult {
    pub fn success(model: Model, ranking: impl Into<String>, parsed: Vec<String>) -> Self {
        Self {
            model,
            ranking: ranking.into(),
            parsed_ranking: parsed,
            success: true,
            error: None,
        }
    }

    pub fn failure(model: Model, error: impl Into<String>) -> Self {
        Self {
            model,
            ranking: String::new(),
            parsed_ranking: Vec::new(),
            success: false,
            error: Some(error.into()),
        }
    }

    /// Whether this judge contributes to the aggregate ranking
    pub fn contributes(&self) -> bool {
        self.success && !self.parsed_ranking.is_empty()
    }
}

/// Cross-judge aggregate position for one model
///
/// `average_position` is the mean of this model's 1-based index across
/// every judge whose parsed ranking mentions it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRanking {
    pub model: Model,
    /// Label the model carried during anonymized ranking
    pub label: String,
    pub average_position: f64,
    /// Number of judges whose parsed ranking included this model
    pub judge_count: usize,
}

/// The chairman's synthesized final answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChairmanResult {
    /// The fixed, configured chairman model
    pub model: Model,
    pub content: String,
}

impl ChairmanResult {
    pub fn new(model: Model, content: impl Into<String>) -> Self {
        Self {
            model,
            content: content.into(),
        }
    }
}

/// Run-level metadata exposed alongside the stage results
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutcomeMetadata {
    /// Anonymous label -> model, for the judging stage of this run
    #[serde(default)]
    pub label_to_model: BTreeMap<String, Model>,
    #[serde(default)]
    pub aggregate_rankings: Vec<AggregateRanking>,
    /// Conversation title from the auxiliary summarization task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Complete result of one deliberation run
///
/// This is the structured summary handed to the conversation-storage
/// collaborator once the run's terminal event has been observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationOutcome {
    /// The original question
    pub question: String,
    /// Stage 1: one entry per configured model, failures included
    pub stage1: Vec<StageOneResult>,
    /// Stage 2: one entry per judge
    pub stage2: Vec<StageTwoResult>,
    /// Stage 3: the chairman's synthesis
    pub stage3: ChairmanResult,
    pub metadata: OutcomeMetadata,
}

impl DeliberationOutcome {
    /// Iterate over only the usable stage-1 answers
    pub fn usable_answers(&self) -> impl Iterator<Item = &StageOneResult> {
        self.stage1.iter().filter(|r| r.is_usable())
    }

    /// Iterate over the stage-1 failures
    pub fn failed_answers(&self) -> impl Iterator<Item = &StageOneResult> {
        self.stage1.iter().filter(|r| !r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_one_constructors() {
        let ok = StageOneResult::success(Model::Gpt51, "An answer");
        assert!(ok.success);
        assert!(ok.is_usable());
        assert!(ok.error.is_none());

        let err = StageOneResult::failure(Model::Grok4, "timeout after 120s");
        assert!(!err.success);
        assert!(!err.is_usable());
        assert_eq!(err.error.as_deref(), Some("timeout after 120s"));
    }

    #[test]
    fn test_whitespace_answer_is_not_usable() {
        let blank = StageOneResult::success(Model::Gpt51, "   \n");
        assert!(blank.success);
        assert!(!blank.is_usable());
    }

    #[test]
    fn test_stage_two_contributes() {
        let parsed = StageTwoResult::success(
            Model::Gemini3Pro,
            "1. Response A\n2. Response B",
            vec!["Response A".into(), "Response B".into()],
        );
        assert!(parsed.contributes());

        // Parse failure: raw text survives for display, no aggregate input
        let unparsed = StageTwoResult::success(Model::Gemini3Pro, "They are all great!", vec![]);
        assert!(unparsed.success);
        assert!(!unparsed.contributes());

        let failed = StageTwoResult::failure(Model::Gemini3Pro, "429");
        assert!(!failed.contributes());
    }

    #[test]
    fn test_outcome_answer_filters() {
        let outcome = DeliberationOutcome {
            question: "q".into(),
            stage1: vec![
                StageOneResult::success(Model::Gpt51, "a"),
                StageOneResult::failure(Model::Grok4, "timeout"),
            ],
            stage2: vec![],
            stage3: ChairmanResult::new(Model::ClaudeOpus45, "final"),
            metadata: OutcomeMetadata::default(),
        };
        assert_eq!(outcome.usable_answers().count(), 1);
        assert_eq!(outcome.failed_answers().count(), 1);
    }
}
