//! Live rendering of a deliberation event stream.
//!
//! Consumes the orchestrator's event channel, folds every event through
//! the immutable [`DeliberationView`] reducer, and drives per-stage
//! progress bars. Returns the final view so the caller can render
//! partial results even after a failure or cancellation.

use colored::Colorize;
use council_domain::{DeliberationEvent, DeliberationView, Stage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Renders deliberation progress with per-stage progress bars
pub struct LiveRenderer {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl LiveRenderer {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
            quiet: false,
        }
    }

    /// Disable all progress output; the fold still runs
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::new()
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }

    /// Consume the event stream to completion and return the final view.
    pub async fn run(&self, mut events: mpsc::Receiver<DeliberationEvent>) -> DeliberationView {
        let mut view = DeliberationView::new();
        while let Some(event) = events.recv().await {
            view = view.apply(&event);
            if !self.quiet {
                self.render(&event, &view);
            }
        }
        view
    }

    fn render(&self, event: &DeliberationEvent, view: &DeliberationView) {
        match event {
            DeliberationEvent::Stage1Start => {
                // Length is learned from participant terminal events
                self.open_stage(Stage::Generation, None);
            }
            DeliberationEvent::Stage1ModelComplete { model, .. } => {
                self.mark_participant(&format!("{} {}", "v".green(), model.short_name()));
            }
            DeliberationEvent::Stage1ModelError { model, error } => {
                self.mark_participant(&format!(
                    "{} {} ({})",
                    "x".red(),
                    model.short_name(),
                    error
                ));
            }
            DeliberationEvent::Stage1Complete { results } => {
                let failed = results.iter().filter(|r| !r.success).count();
                let message = if failed == 0 {
                    "all answers in".to_string()
                } else {
                    format!("{failed} failed")
                };
                self.close_stage(Stage::Generation, &message);
            }

            DeliberationEvent::Stage2Start => {
                let judges = view
                    .stage1
                    .as_ref()
                    .map(|r| r.iter().filter(|s| s.is_usable()).count() as u64);
                self.open_stage(Stage::Ranking, judges);
            }
            DeliberationEvent::Stage2ModelComplete { model, response } => {
                let status = if response.contributes() {
                    format!("{} {}", "v".green(), model.short_name())
                } else {
                    format!("{} {} (unparseable ranking)", "?".yellow(), model.short_name())
                };
                self.mark_participant(&status);
            }
            DeliberationEvent::Stage2ModelError { model, error } => {
                self.mark_participant(&format!(
                    "{} {} ({})",
                    "x".red(),
                    model.short_name(),
                    error
                ));
            }
            DeliberationEvent::Stage2Complete {
                aggregate_rankings, ..
            } => {
                let message = aggregate_rankings
                    .first()
                    .map(|top| format!("top: {}", top.model.short_name()))
                    .unwrap_or_else(|| "no valid rankings".to_string());
                self.close_stage(Stage::Ranking, &message);
            }

            DeliberationEvent::Stage3Start { model } => {
                self.open_stage(Stage::Synthesis, Some(1));
                self.set_message(&model.short_name().to_string());
            }
            DeliberationEvent::Stage3Token { .. } => {
                if let Some(pb) = self.stage_bar.lock().unwrap().as_ref() {
                    pb.tick();
                }
            }
            DeliberationEvent::Stage3Complete { .. } => {
                self.mark_participant("");
                self.close_stage(Stage::Synthesis, "final answer ready");
            }
            DeliberationEvent::Stage3Error { error } => {
                self.close_stage(Stage::Synthesis, &format!("{} {}", "x".red(), error));
            }

            DeliberationEvent::TitleComplete { title } => {
                let _ = self.multi.println(format!(
                    "{} {}",
                    "Title:".cyan().bold(),
                    title
                ));
            }

            DeliberationEvent::Complete => {
                self.abandon_bar();
            }
            DeliberationEvent::Error { message } => {
                self.abandon_bar();
                let _ = self
                    .multi
                    .println(format!("{} {}", "Run failed:".red().bold(), message));
            }
            DeliberationEvent::Cancelled { message } => {
                self.abandon_bar();
                let _ = self
                    .multi
                    .println(format!("{} {}", "Cancelled:".yellow().bold(), message));
            }

            // Token traffic for stages 1-2 is reflected by bar spinners only
            DeliberationEvent::Stage1Token { .. } | DeliberationEvent::Stage2Token { .. } => {
                if let Some(pb) = self.stage_bar.lock().unwrap().as_ref() {
                    pb.tick();
                }
            }
        }
    }

    fn open_stage(&self, stage: Stage, participants: Option<u64>) {
        let pb = self.multi.add(ProgressBar::new(participants.unwrap_or(0)));
        pb.set_style(Self::stage_style());
        pb.set_prefix(stage.display_name());
        pb.set_message("waiting...");
        *self.stage_bar.lock().unwrap() = Some(pb);
    }

    fn mark_participant(&self, status: &str) {
        if let Some(pb) = self.stage_bar.lock().unwrap().as_ref() {
            if pb.length().unwrap_or(0) <= pb.position() {
                pb.set_length(pb.position() + 1);
            }
            pb.set_message(status.to_string());
            pb.inc(1);
        }
    }

    fn set_message(&self, message: &str) {
        if let Some(pb) = self.stage_bar.lock().unwrap().as_ref() {
            pb.set_message(message.to_string());
        }
    }

    fn close_stage(&self, stage: Stage, message: &str) {
        if let Some(pb) = self.stage_bar.lock().unwrap().take() {
            pb.finish_with_message(format!("{} - {}", stage.as_str().green(), message));
        }
    }

    fn abandon_bar(&self) {
        if let Some(pb) = self.stage_bar.lock().unwrap().take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for LiveRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{ChairmanResult, Model, RunPhase, StageOneResult};

    #[tokio::test]
    async fn test_run_folds_stream_into_final_view() {
        let (tx, rx) = mpsc::channel(16);
        let renderer = LiveRenderer::quiet();

        let producer = tokio::spawn(async move {
            let result = StageOneResult::success(Model::Gpt51, "answer");
            let events = vec![
                DeliberationEvent::Stage1Start,
                DeliberationEvent::Stage1ModelComplete {
                    model: Model::Gpt51,
                    response: result.clone(),
                },
                DeliberationEvent::Stage1Complete {
                    results: vec![result],
                },
                DeliberationEvent::Cancelled {
                    message: "stop".into(),
                },
            ];
            for event in events {
                tx.send(event).await.unwrap();
            }
        });

        let view = renderer.run(rx).await;
        producer.await.unwrap();

        assert_eq!(view.phase, RunPhase::Cancelled);
        assert!(view.stage1.is_some());
        assert!(view.is_incomplete());
    }

    #[tokio::test]
    async fn test_run_survives_terminal_only_stream() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(DeliberationEvent::Stage3Complete {
            result: ChairmanResult::new(Model::ClaudeOpus45, "late"),
        })
        .await
        .unwrap();
        drop(tx);

        let view = LiveRenderer::quiet().run(rx).await;
        assert_eq!(view.stage3.unwrap().content, "late");
    }
}
