//! Ranking parsing and cross-judge aggregation.
//!
//! These functions extract structured orderings from free-form judge
//! responses and fold them into one aggregate ranking. They are pure
//! domain logic: no I/O, no session management, just text pattern
//! matching and arithmetic.
//!
//! # Functions
//!
//! | Function | Use Case |
//! |----------|----------|
//! | [`parse_ranking`] | Extract an ordered label list from a judge's reply |
//! | [`aggregate_rankings`] | Mean 1-based position per model across judges |

use super::label::LabelMap;
use super::results::{AggregateRanking, StageTwoResult};

/// Parse a judge's free-text response into an ordered list of labels.
///
/// Grammar: the first numbered list in the text (consecutive lines whose
/// first token is `N.` or `N)`, optionally bold-wrapped, separated by at
/// most blank lines), read top to bottom, taking the first known label
/// mentioned on each line. Duplicate labels keep their first position.
/// Labels mentioned outside that list (e.g. in prose discussion) are
/// ignored.
///
/// Returns an empty vector when no such list mentions a known label;
/// callers treat that as a parse failure and exclude the judge from the
/// aggregate while still displaying the raw text.
pub fn parse_ranking(text: &str, labels: &LabelMap) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // Blank lines inside a list are tolerated
            continue;
        }

        if !is_numbered_item(trimmed) {
            if in_list && !order.is_empty() {
                // First ordered list ended
                break;
            }
            continue;
        }

        in_list = true;
        if let Some(label) = first_label_in(trimmed, labels)
            && !order.iter().any(|l| l == label)
        {
            order.push(label.to_string());
        }
    }

    order
}

/// Whether a line starts a numbered list item, tolerating markdown bolding.
fn is_numbered_item(line: &str) -> bool {
    let stripped = line
        .trim_start_matches('*')
        .trim_start_matches('#')
        .trim_start();

    let digits: String = stripped.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }

    matches!(stripped[digits.len()..].chars().next(), Some('.') | Some(')'))
}

/// First known label appearing on the line, by byte offset.
fn first_label_in<'a>(line: &str, labels: &'a LabelMap) -> Option<&'a str> {
    labels
        .labels()
        .filter_map(|label| line.find(label).map(|pos| (pos, label)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, label)| label)
}

/// Compute the cross-judge aggregate ranking.
///
/// For each labeled model, `average_position` is the mean of its 1-based
/// index across every contributing judge (success and non-empty parse).
/// Models no valid judge ranked are omitted entirely.
///
/// Idempotent and order-independent with respect to judge arrival: the
/// mean does not depend on the order of `results`, and ties are broken
/// deterministically: more judgments first, then label assignment order
/// (which is stage-1 completion order).
pub fn aggregate_rankings(results: &[StageTwoResult], labels: &LabelMap) -> Vec<AggregateRanking> {
    let mut aggregates: Vec<AggregateRanking> = Vec::new();

    for (label, model) in labels.entries() {
        let positions: Vec<usize> = results
            .iter()
            .filter(|r| r.contributes())
            .filter_map(|r| r.parsed_ranking.iter().position(|l| l == label))
            .map(|idx| idx + 1)
            .collect();

        if positions.is_empty() {
            continue;
        }

        let average_position = positions.iter().sum::<usize>() as f64 / positions.len() as f64;
        aggregates.push(AggregateRanking {
            model: model.clone(),
            label: label.to_string(),
            average_position,
            judge_count: positions.len(),
        });
    }

    // Stable sort: assignment order survives full ties
    aggregates.sort_by(|a, b| {
        a.average_position
            .total_cmp(&b.average_position)
            .then(b.judge_count.cmp(&a.judge_count))
    });

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Model;

    fn map_for(n: usize) -> LabelMap {
        let models: Vec<Model> = (0..n).map(|i| Model::Custom(format!("model-{i}"))).collect();
        LabelMap::assign(&models).unwrap()
    }

    // ==================== parse_ranking Tests ====================

    #[test]
    fn test_parse_plain_numbered_list() {
        let labels = map_for(3);
        let text = "Here is my ranking:\n\n1. Response B\n2. Response A\n3. Response C\n";
        assert_eq!(
            parse_ranking(text, &labels),
            vec!["Response B", "Response A", "Response C"]
        );
    }

    #[test]
    fn test_parse_tolerates_bolding_and_parens() {
        let labels = map_for(2);
        let text = "**1.** **Response B**: strongest overall\n2) Response A: solid but thin";
        assert_eq!(parse_ranking(text, &labels), vec!["Response B", "Response A"]);
    }

    #[test]
    fn test_parse_takes_first_list_only() {
        let labels = map_for(2);
        let text = "\
1. Response A
2. Response B

On reflection, a different ordering is defensible:

1. Response B
2. Response A";
        assert_eq!(parse_ranking(text, &labels), vec!["Response A", "Response B"]);
    }

    #[test]
    fn test_parse_ignores_labels_in_prose() {
        let labels = map_for(2);
        let text = "Response B was weak in places. Response A is my favorite.\n\n1. Response A\n2. Response B";
        assert_eq!(parse_ranking(text, &labels), vec!["Response A", "Response B"]);
    }

    #[test]
    fn test_parse_dedupes_repeated_labels() {
        let labels = map_for(2);
        let text = "1. Response A\n2. Response A\n3. Response B";
        assert_eq!(parse_ranking(text, &labels), vec!["Response A", "Response B"]);
    }

    #[test]
    fn test_parse_failure_yields_empty() {
        let labels = map_for(2);
        assert!(parse_ranking("They were all excellent responses.", &labels).is_empty());
        assert!(parse_ranking("", &labels).is_empty());
        // Numbered list that never names a label
        assert!(parse_ranking("1. accuracy\n2. style", &labels).is_empty());
    }

    #[test]
    fn test_parse_skips_numbered_lines_without_labels() {
        let labels = map_for(2);
        let text = "1. Overall notes\n2. Response B\n3. Response A";
        assert_eq!(parse_ranking(text, &labels), vec!["Response B", "Response A"]);
    }

    // ==================== aggregate_rankings Tests ====================

    fn judge(labels: &[&str]) -> StageTwoResult {
        StageTwoResult::success(
            Model::Custom("judge".into()),
            "raw",
            labels.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_unanimous_first_place_is_exactly_one() {
        let labels = map_for(3);
        let results = vec![
            judge(&["Response A", "Response B", "Response C"]),
            judge(&["Response A", "Response C", "Response B"]),
            judge(&["Response A", "Response B", "Response C"]),
        ];

        let agg = aggregate_rankings(&results, &labels);
        assert_eq!(agg[0].label, "Response A");
        assert_eq!(agg[0].average_position, 1.0);
        assert_eq!(agg[0].judge_count, 3);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let labels = map_for(2);
        let a = judge(&["Response A", "Response B"]);
        let b = judge(&["Response B", "Response A"]);

        let forward = aggregate_rankings(&[a.clone(), b.clone()], &labels);
        let backward = aggregate_rankings(&[b, a], &labels);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_unranked_model_is_omitted() {
        let labels = map_for(3);
        let results = vec![judge(&["Response B", "Response A"])];

        let agg = aggregate_rankings(&results, &labels);
        assert_eq!(agg.len(), 2);
        assert!(agg.iter().all(|r| r.label != "Response C"));
    }

    #[test]
    fn test_non_contributing_judges_are_excluded() {
        let labels = map_for(2);
        let results = vec![
            judge(&["Response B", "Response A"]),
            // Parse failure: counted for display, not aggregation
            StageTwoResult::success(Model::Custom("j2".into()), "all good", vec![]),
            StageTwoResult::failure(Model::Custom("j3".into()), "timeout"),
        ];

        let agg = aggregate_rankings(&results, &labels);
        assert_eq!(agg[0].label, "Response B");
        assert_eq!(agg[0].judge_count, 1);
    }

    #[test]
    fn test_tie_broken_by_judge_count() {
        let labels = map_for(3);
        // A and B both average 2.0, but B is judged twice
        let results = vec![
            judge(&["Response C", "Response B"]),
            judge(&["Response C", "Response B"]),
            judge(&["Response C", "Response A"]),
        ];

        let agg = aggregate_rankings(&results, &labels);
        let order: Vec<&str> = agg.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(order, vec!["Response C", "Response B", "Response A"]);
        assert_eq!(agg[1].judge_count, 2);
        assert_eq!(agg[2].judge_count, 1);
    }

    #[test]
    fn test_full_tie_falls_back_to_assignment_order() {
        let labels = map_for(2);
        // Both labels average 1.5 over two judges; "Response A" was
        // assigned first, so it sorts first.
        let results = vec![
            judge(&["Response A", "Response B"]),
            judge(&["Response B", "Response A"]),
        ];

        let agg = aggregate_rankings(&results, &labels);
        let order: Vec<&str> = agg.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(order, vec!["Response A", "Response B"]);
    }

    #[test]
    fn test_empty_results_empty_aggregate() {
        let labels = map_for(2);
        assert!(aggregate_rankings(&[], &labels).is_empty());
    }
}
