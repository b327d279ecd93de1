//! The deliberation event protocol.
//!
//! [`DeliberationEvent`] is the wire contract between the stage
//! orchestrator and any consumer. A run is authoritatively described by
//! its ordered, append-only event sequence; the structured stage results
//! are reconstructions derived by replaying it.
//!
//! # Envelope ordering
//!
//! Producers emit exactly one stage-start event before any token of that
//! stage, exactly one terminal event per participant when it finishes,
//! one stage-complete event only after every participant is terminal,
//! and exactly one run-terminal event (`complete`, `error`, `cancelled`)
//! at the very end. Consumers can therefore build correct state with
//! forward-append logic alone, with no re-ordering or look-ahead.

use super::results::{AggregateRanking, ChairmanResult, StageOneResult, StageTwoResult};
use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One event in a deliberation run's append-only log.
///
/// Serializes with a `type` tag matching the SSE protocol consumed by
/// external clients (`stage1_start`, `stage2_model_complete`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliberationEvent {
    // === Stage 1: independent generation ===
    Stage1Start,
    Stage1Token {
        model: Model,
        content: String,
    },
    Stage1ModelComplete {
        model: Model,
        response: StageOneResult,
    },
    Stage1ModelError {
        model: Model,
        error: String,
    },
    Stage1Complete {
        results: Vec<StageOneResult>,
    },

    // === Stage 2: anonymized peer ranking ===
    Stage2Start,
    Stage2Token {
        model: Model,
        content: String,
    },
    Stage2ModelComplete {
        model: Model,
        response: StageTwoResult,
    },
    Stage2ModelError {
        model: Model,
        error: String,
    },
    Stage2Complete {
        results: Vec<StageTwoResult>,
        label_to_model: BTreeMap<String, Model>,
        aggregate_rankings: Vec<AggregateRanking>,
    },

    // === Stage 3: chairman synthesis ===
    Stage3Start {
        model: Model,
    },
    Stage3Token {
        model: Model,
        content: String,
    },
    Stage3Error {
        error: String,
    },
    Stage3Complete {
        result: ChairmanResult,
    },

    // === Auxiliary side-task ===
    TitleComplete {
        title: String,
    },

    // === Run terminal events ===
    Complete,
    Error {
        message: String,
    },
    Cancelled {
        message: String,
    },
}

impl DeliberationEvent {
    /// The wire tag for this event, as it appears in the serialized form.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Stage1Start => "stage1_start",
            Self::Stage1Token { .. } => "stage1_token",
            Self::Stage1ModelComplete { .. } => "stage1_model_complete",
            Self::Stage1ModelError { .. } => "stage1_model_error",
            Self::Stage1Complete { .. } => "stage1_complete",
            Self::Stage2Start => "stage2_start",
            Self::Stage2Token { .. } => "stage2_token",
            Self::Stage2ModelComplete { .. } => "stage2_model_complete",
            Self::Stage2ModelError { .. } => "stage2_model_error",
            Self::Stage2Complete { .. } => "stage2_complete",
            Self::Stage3Start { .. } => "stage3_start",
            Self::Stage3Token { .. } => "stage3_token",
            Self::Stage3Error { .. } => "stage3_error",
            Self::Stage3Complete { .. } => "stage3_complete",
            Self::TitleComplete { .. } => "title_complete",
            Self::Complete => "complete",
            Self::Error { .. } => "error",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// Whether this event ends the run.
    pub fn is_run_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete | Self::Error { .. } | Self::Cancelled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tags_match_serde() {
        let events = vec![
            DeliberationEvent::Stage1Start,
            DeliberationEvent::Stage1Token {
                model: Model::Gpt51,
                content: "chunk".into(),
            },
            DeliberationEvent::Stage2Start,
            DeliberationEvent::Stage3Start {
                model: Model::ClaudeOpus45,
            },
            DeliberationEvent::TitleComplete {
                title: "Rust ownership".into(),
            },
            DeliberationEvent::Complete,
            DeliberationEvent::Error {
                message: "boom".into(),
            },
            DeliberationEvent::Cancelled {
                message: "caller aborted".into(),
            },
        ];

        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.event_type(), "tag mismatch: {event:?}");
        }
    }

    #[test]
    fn test_event_roundtrip() {
        let event = DeliberationEvent::Stage1ModelComplete {
            model: Model::Gemini3Pro,
            response: StageOneResult::success(Model::Gemini3Pro, "an answer"),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: DeliberationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_stage2_complete_carries_metadata() {
        let event = DeliberationEvent::Stage2Complete {
            results: vec![],
            label_to_model: BTreeMap::from([("Response A".to_string(), Model::Gpt51)]),
            aggregate_rankings: vec![],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["label_to_model"]["Response A"], "openai/gpt-5.1");
    }

    #[test]
    fn test_run_terminal_detection() {
        assert!(DeliberationEvent::Complete.is_run_terminal());
        assert!(
            DeliberationEvent::Error {
                message: "x".into()
            }
            .is_run_terminal()
        );
        assert!(
            DeliberationEvent::Cancelled {
                message: "x".into()
            }
            .is_run_terminal()
        );
        assert!(!DeliberationEvent::Stage1Start.is_run_terminal());
        assert!(
            !DeliberationEvent::Stage3Error {
                error: "x".into()
            }
            .is_run_terminal()
        );
    }
}
