//! Console output formatter for deliberation results

use colored::Colorize;
use council_domain::{DeliberationOutcome, DeliberationView, LabelMap, RunPhase};

/// Formats deliberation outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete outcome with all three stages
    pub fn format(outcome: &DeliberationOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');

        if let Some(title) = &outcome.metadata.title {
            output.push_str(&format!("{} {}\n", "Title:".cyan().bold(), title));
        }
        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            outcome.question
        ));

        // Stage 1
        output.push_str(&Self::section_header("Stage 1: Independent Answers"));
        for answer in &outcome.stage1 {
            if answer.success {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} ──", answer.model).yellow().bold(),
                    answer.content
                ));
            } else {
                output.push_str(&format!(
                    "\n{}\nError: {}\n",
                    format!("── {} ──", answer.model).red().bold(),
                    answer.error.as_deref().unwrap_or("Unknown")
                ));
            }
        }

        // Stage 2: labels are resolved back to model names for display
        // only; the judges themselves never saw the mapping
        let labels = LabelMap::from_wire(&outcome.metadata.label_to_model);
        output.push_str(&Self::section_header("Stage 2: Peer Rankings"));
        for ranking in &outcome.stage2 {
            if !ranking.success {
                output.push_str(&format!(
                    "\n{}\nError: {}\n",
                    format!("── {} ──", ranking.model).red().bold(),
                    ranking.error.as_deref().unwrap_or("Unknown")
                ));
            } else if ranking.parsed_ranking.is_empty() {
                output.push_str(&format!(
                    "\n{}\n(no parseable ranking)\n{}\n",
                    format!("── {} ──", ranking.model).yellow().bold(),
                    labels.deanonymize(&ranking.ranking)
                ));
            } else {
                let order = ranking
                    .parsed_ranking
                    .iter()
                    .map(|label| {
                        labels
                            .model_for(label)
                            .map(|m| m.short_name().to_string())
                            .unwrap_or_else(|| label.clone())
                    })
                    .collect::<Vec<_>>()
                    .join(" > ");
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} ──", ranking.model).yellow().bold(),
                    order
                ));
            }
        }

        if !outcome.metadata.aggregate_rankings.is_empty() {
            output.push_str(&format!("\n{}\n", "Aggregate Ranking:".cyan().bold()));
            for (i, entry) in outcome.metadata.aggregate_rankings.iter().enumerate() {
                output.push_str(&format!(
                    "  {}. {} (avg position {:.2}, {} judge{})\n",
                    i + 1,
                    entry.model,
                    entry.average_position,
                    entry.judge_count,
                    if entry.judge_count == 1 { "" } else { "s" }
                ));
            }
        }

        // Stage 3
        output.push_str(&Self::section_header("Stage 3: Chairman Synthesis"));
        output.push_str(&format!(
            "\n{}\n\n{}\n",
            format!("Chairman: {}", outcome.stage3.model).yellow().bold(),
            outcome.stage3.content
        ));

        output
    }

    /// Format only the chairman's final answer
    pub fn format_final_only(outcome: &DeliberationOutcome) -> String {
        outcome.stage3.content.clone()
    }

    /// Format as pretty-printed JSON for persistence by a collaborator
    pub fn format_json(outcome: &DeliberationOutcome) -> String {
        serde_json::to_string_pretty(outcome)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
    }

    /// Render whatever a failed or cancelled run produced.
    ///
    /// Partial results stay visible with explicit per-model markers; the
    /// whole block is tagged incomplete.
    pub fn format_partial(view: &DeliberationView) -> String {
        let mut output = String::new();

        let tag = match view.phase {
            RunPhase::Cancelled => "cancelled".yellow().bold(),
            RunPhase::Failed => "failed".red().bold(),
            _ => "incomplete".yellow().bold(),
        };
        output.push_str(&Self::header(&format!("Partial results ({tag})")));
        output.push('\n');

        if let Some(message) = view.error.as_deref().or(view.cancel_message.as_deref()) {
            output.push_str(&format!("{message}\n"));
        }

        if !view.stage1_streams.is_empty() {
            output.push_str(&Self::section_header("Stage 1: Independent Answers"));
            for (model, slot) in &view.stage1_streams {
                let marker = match (&slot.error, slot.done) {
                    (Some(error), _) => format!("error: {error}").red().to_string(),
                    (None, true) => "complete".green().to_string(),
                    (None, false) => "interrupted".yellow().to_string(),
                };
                output.push_str(&format!(
                    "\n{} [{}]\n{}\n",
                    format!("── {} ──", model).yellow().bold(),
                    marker,
                    slot.text
                ));
            }
        }

        if !view.stage2_streams.is_empty() {
            output.push_str(&Self::section_header("Stage 2: Peer Rankings"));
            for (model, slot) in &view.stage2_streams {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} ──", model).yellow().bold(),
                    slot.text
                ));
            }
        }

        if !view.stage3_stream.text.is_empty() {
            output.push_str(&Self::section_header("Stage 3: Chairman Synthesis"));
            output.push_str(&format!("\n{}\n", view.stage3_stream.text));
        }

        output
    }

    fn header(title: &str) -> String {
        format!(
            "{}\n{}\n{}\n",
            "=".repeat(60).cyan(),
            format!("  {title}").cyan().bold(),
            "=".repeat(60).cyan()
        )
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(60).cyan())
    }
}
