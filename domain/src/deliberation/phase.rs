//! Run phases and the deliberation state machine.

use serde::{Deserialize, Serialize};

/// One of the three sequential stages of a deliberation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Independent generation - every council model answers in parallel
    Generation,
    /// Peer ranking - judges rank the anonymized answers
    Ranking,
    /// Synthesis - the chairman produces the final answer
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Generation => "generation",
            Stage::Ranking => "ranking",
            Stage::Synthesis => "synthesis",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Generation => "Stage 1: Independent Answers",
            Stage::Ranking => "Stage 2: Peer Ranking",
            Stage::Synthesis => "Stage 3: Chairman Synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Lifecycle of one deliberation run.
///
/// Linear progression `Idle → Stage1Running → Stage1Done → Stage2Running
/// → Stage2Done → Stage3Running → Complete`. `Cancelled` is reachable
/// from every non-terminal state; `Failed` is terminal and entered only
/// on irrecoverable conditions (all of stage 1 failed, or the chairman
/// call failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Stage1Running,
    Stage1Done,
    Stage2Running,
    Stage2Done,
    Stage3Running,
    Complete,
    Cancelled,
    Failed,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled | Self::Failed)
    }

    /// The stage currently running, if any
    pub fn running_stage(&self) -> Option<Stage> {
        match self {
            Self::Stage1Running => Some(Stage::Generation),
            Self::Stage2Running => Some(Stage::Ranking),
            Self::Stage3Running => Some(Stage::Synthesis),
            _ => None,
        }
    }

    /// Whether moving to `next` is a legal state-machine transition
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        use RunPhase::*;

        if self.is_terminal() {
            return false;
        }
        // Cancellation and failure are reachable from any live state
        if matches!(next, Cancelled | Failed) {
            return true;
        }

        matches!(
            (self, next),
            (Idle, Stage1Running)
                | (Stage1Running, Stage1Done)
                | (Stage1Done, Stage2Running)
                | (Stage2Running, Stage2Done)
                | (Stage2Done, Stage3Running)
                | (Stage3Running, Complete)
        )
    }
}
