//! Client-side incremental view of a deliberation run.
//!
//! [`DeliberationView`] is a pure, order-sensitive fold over the event
//! log. Every [`apply`](DeliberationView::apply) returns a fresh value
//! (copy-on-write per affected key), so consumers relying on
//! reference-equality change detection observe every update. Nothing is
//! ever mutated in place through a shared handle.
//!
//! While a stage runs, per-model token buffers accumulate append-only
//! text; once that stage's `*_complete` event arrives, the buffers are
//! superseded by the verified structured results. A cancelled run keeps
//! all state applied so far, marked incomplete.

use super::event::DeliberationEvent;
use super::phase::RunPhase;
use super::results::{AggregateRanking, ChairmanResult, StageOneResult, StageTwoResult};
use crate::core::model::Model;
use std::collections::BTreeMap;

/// Live streaming state for one participant within a running stage
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamSlot {
    /// Partial output, appended token by token
    pub text: String,
    /// Whether this participant reached a terminal state
    pub done: bool,
    /// Terminal failure cause, if any
    pub error: Option<String>,
}

impl StreamSlot {
    fn appended(&self, chunk: &str) -> Self {
        let mut text = String::with_capacity(self.text.len() + chunk.len());
        text.push_str(&self.text);
        text.push_str(chunk);
        Self {
            text,
            done: self.done,
            error: self.error.clone(),
        }
    }
}

/// Immutable, partially-complete view of all three stages of a run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeliberationView {
    pub phase: RunPhase,
    /// Per-model partial buffers for stage 1, keyed by model id
    pub stage1_streams: BTreeMap<String, StreamSlot>,
    /// Verified stage-1 results, present once `stage1_complete` applies
    pub stage1: Option<Vec<StageOneResult>>,
    /// Per-judge partial buffers for stage 2
    pub stage2_streams: BTreeMap<String, StreamSlot>,
    pub stage2: Option<Vec<StageTwoResult>>,
    pub label_to_model: BTreeMap<String, Model>,
    pub aggregate_rankings: Vec<AggregateRanking>,
    /// The chairman's partial buffer
    pub stage3_stream: StreamSlot,
    pub stage3: Option<ChairmanResult>,
    pub title: Option<String>,
    /// Run-level failure message
    pub error: Option<String>,
    /// Cancellation message, when the caller aborted the run
    pub cancel_message: Option<String>,
}

impl DeliberationView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into a new view. The receiver is left untouched.
    pub fn apply(&self, event: &DeliberationEvent) -> Self {
        let mut next = self.clone();

        // A terminal view no longer changes; late events are dropped
        if next.phase.is_terminal() {
            return next;
        }

        match event {
            DeliberationEvent::Stage1Start => {
                next.phase = RunPhase::Stage1Running;
            }
            DeliberationEvent::Stage1Token { model, content } => {
                let slot = next
                    .stage1_streams
                    .get(model.as_str())
                    .cloned()
                    .unwrap_or_default();
                next.stage1_streams
                    .insert(model.as_str().to_string(), slot.appended(content));
            }
            DeliberationEvent::Stage1ModelComplete { model, response } => {
                next.stage1_streams.insert(
                    model.as_str().to_string(),
                    StreamSlot {
                        text: response.content.clone(),
                        done: true,
                        error: None,
                    },
                );
            }
            DeliberationEvent::Stage1ModelError { model, error } => {
                let slot = next
                    .stage1_streams
                    .get(model.as_str())
                    .cloned()
                    .unwrap_or_default();
                next.stage1_streams.insert(
                    model.as_str().to_string(),
                    StreamSlot {
                        done: true,
                        error: Some(error.clone()),
                        ..slot
                    },
                );
            }
            DeliberationEvent::Stage1Complete { results } => {
                next.stage1 = Some(results.clone());
                next.phase = RunPhase::Stage1Done;
            }

            DeliberationEvent::Stage2Start => {
                next.phase = RunPhase::Stage2Running;
            }
            DeliberationEvent::Stage2Token { model, content } => {
                let slot = next
                    .stage2_streams
                    .get(model.as_str())
                    .cloned()
                    .unwrap_or_default();
                next.stage2_streams
                    .insert(model.as_str().to_string(), slot.appended(content));
            }
            DeliberationEvent::Stage2ModelComplete { model, response } => {
                next.stage2_streams.insert(
                    model.as_str().to_string(),
                    StreamSlot {
                        text: response.ranking.clone(),
                        done: true,
                        error: None,
                    },
                );
            }
            DeliberationEvent::Stage2ModelError { model, error } => {
                let slot = next
                    .stage2_streams
                    .get(model.as_str())
                    .cloned()
                    .unwrap_or_default();
                next.stage2_streams.insert(
                    model.as_str().to_string(),
                    StreamSlot {
                        done: true,
                        error: Some(error.clone()),
                        ..slot
                    },
                );
            }
            DeliberationEvent::Stage2Complete {
                results,
                label_to_model,
                aggregate_rankings,
            } => {
                next.stage2 = Some(results.clone());
                next.label_to_model = label_to_model.clone();
                next.aggregate_rankings = aggregate_rankings.clone();
                next.phase = RunPhase::Stage2Done;
            }

            DeliberationEvent::Stage3Start { .. } => {
                next.phase = RunPhase::Stage3Running;
            }
            DeliberationEvent::Stage3Token { content, .. } => {
                next.stage3_stream = next.stage3_stream.appended(content);
            }
            DeliberationEvent::Stage3Error { error } => {
                next.stage3_stream = StreamSlot {
                    done: true,
                    error: Some(error.clone()),
                    ..next.stage3_stream
                };
            }
            DeliberationEvent::Stage3Complete { result } => {
                next.stage3_stream = StreamSlot {
                    text: result.content.clone(),
                    done: true,
                    error: None,
                };
                next.stage3 = Some(result.clone());
            }

            DeliberationEvent::TitleComplete { title } => {
                next.title = Some(title.clone());
            }

            DeliberationEvent::Complete => {
                next.phase = RunPhase::Complete;
            }
            DeliberationEvent::Error { message } => {
                next.error = Some(message.clone());
                next.phase = RunPhase::Failed;
            }
            DeliberationEvent::Cancelled { message } => {
                next.cancel_message = Some(message.clone());
                next.phase = RunPhase::Cancelled;
            }
        }

        next
    }

    /// Fold a whole event sequence, e.g. when replaying a stored log
    pub fn replay<'a>(events: impl IntoIterator<Item = &'a DeliberationEvent>) -> Self {
        events
            .into_iter()
            .fold(Self::new(), |view, event| view.apply(event))
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Whether the run ended without producing a full result set
    pub fn is_incomplete(&self) -> bool {
        matches!(self.phase, RunPhase::Cancelled | RunPhase::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(model: Model, content: &str) -> DeliberationEvent {
        DeliberationEvent::Stage1Token {
            model,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_apply_returns_fresh_value() {
        let view = DeliberationView::new();
        let next = view.apply(&DeliberationEvent::Stage1Start);

        // The original is untouched; the result is a distinct value
        assert_eq!(view.phase, RunPhase::Idle);
        assert_eq!(next.phase, RunPhase::Stage1Running);
        assert_ne!(view, next);
    }

    #[test]
    fn test_token_buffers_append_per_model() {
        let view = DeliberationView::new()
            .apply(&DeliberationEvent::Stage1Start)
            .apply(&token(Model::Gpt51, "Owner"))
            .apply(&token(Model::Gemini3Pro, "Borrow"))
            .apply(&token(Model::Gpt51, "ship"));

        assert_eq!(view.stage1_streams["openai/gpt-5.1"].text, "Ownership");
        assert_eq!(
            view.stage1_streams["google/gemini-3-pro-preview"].text,
            "Borrow"
        );
        assert!(!view.stage1_streams["openai/gpt-5.1"].done);
    }

    #[test]
    fn test_stage_complete_replaces_buffers_with_results() {
        let results = vec![StageOneResult::success(Model::Gpt51, "final text")];
        let view = DeliberationView::new()
            .apply(&DeliberationEvent::Stage1Start)
            .apply(&token(Model::Gpt51, "partial"))
            .apply(&DeliberationEvent::Stage1ModelComplete {
                model: Model::Gpt51,
                response: results[0].clone(),
            })
            .apply(&DeliberationEvent::Stage1Complete {
                results: results.clone(),
            });

        assert_eq!(view.phase, RunPhase::Stage1Done);
        assert_eq!(view.stage1, Some(results));
        // The buffer now holds the verified text, flagged terminal
        assert_eq!(view.stage1_streams["openai/gpt-5.1"].text, "final text");
        assert!(view.stage1_streams["openai/gpt-5.1"].done);
    }

    #[test]
    fn test_model_error_keeps_partial_text() {
        let view = DeliberationView::new()
            .apply(&DeliberationEvent::Stage1Start)
            .apply(&token(Model::Grok4, "half an ans"))
            .apply(&DeliberationEvent::Stage1ModelError {
                model: Model::Grok4,
                error: "connection reset".into(),
            });

        let slot = &view.stage1_streams["x-ai/grok-4"];
        assert_eq!(slot.text, "half an ans");
        assert!(slot.done);
        assert_eq!(slot.error.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_cancellation_freezes_state() {
        let view = DeliberationView::new()
            .apply(&DeliberationEvent::Stage1Start)
            .apply(&token(Model::Gpt51, "partial"))
            .apply(&DeliberationEvent::Cancelled {
                message: "caller aborted".into(),
            });

        assert_eq!(view.phase, RunPhase::Cancelled);
        assert!(view.is_incomplete());
        // Partial results remain visible
        assert_eq!(view.stage1_streams["openai/gpt-5.1"].text, "partial");

        // Events after the terminal one do not rewrite applied state
        let after = view.apply(&token(Model::Gpt51, " more"));
        assert_eq!(after, view);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let events = vec![
            DeliberationEvent::Stage1Start,
            token(Model::Gpt51, "a"),
            token(Model::Gpt51, "b"),
            DeliberationEvent::Cancelled {
                message: "stop".into(),
            },
        ];

        let once = DeliberationView::replay(&events);
        let twice = DeliberationView::replay(&events);
        assert_eq!(once, twice);
        assert_eq!(once.stage1_streams["openai/gpt-5.1"].text, "ab");
    }

    #[test]
    fn test_full_run_fold() {
        let s1 = vec![StageOneResult::success(Model::Gpt51, "answer")];
        let s2 = vec![StageTwoResult::success(
            Model::Gpt51,
            "1. Response A",
            vec!["Response A".into()],
        )];
        let chairman = ChairmanResult::new(Model::ClaudeOpus45, "the synthesis");

        let view = DeliberationView::replay(&[
            DeliberationEvent::Stage1Start,
            DeliberationEvent::Stage1Complete { results: s1.clone() },
            DeliberationEvent::Stage2Start,
            DeliberationEvent::Stage2Complete {
                results: s2.clone(),
                label_to_model: BTreeMap::from([("Response A".to_string(), Model::Gpt51)]),
                aggregate_rankings: vec![],
            },
            DeliberationEvent::Stage3Start {
                model: Model::ClaudeOpus45,
            },
            DeliberationEvent::Stage3Complete {
                result: chairman.clone(),
            },
            DeliberationEvent::TitleComplete {
                title: "A title".into(),
            },
            DeliberationEvent::Complete,
        ]);

        assert_eq!(view.phase, RunPhase::Complete);
        assert_eq!(view.stage1, Some(s1));
        assert_eq!(view.stage2, Some(s2));
        assert_eq!(view.stage3, Some(chairman));
        assert_eq!(view.title.as_deref(), Some("A title"));
        assert!(!view.is_incomplete());
    }
}
