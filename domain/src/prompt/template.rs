//! Prompt templates for the three deliberation stages.
//!
//! The optional business context string is injected verbatim into every
//! stage's prompt; the role identifier only changes prompt wording.
//! Neither affects control flow.

use crate::deliberation::results::{AggregateRanking, StageOneResult};

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the independent generation stage
    pub fn stage1_system(role: Option<&str>, context: Option<&str>) -> String {
        let base = "You are a knowledgeable expert answering a user's question as one \
voice on a council of independent advisors.\n\
Provide a thoughtful, well-reasoned response. Be concise but comprehensive, \
and support your points with reasoning and examples where appropriate.";
        Self::with_role_and_context(base, role, context)
    }

    /// User prompt for the independent generation stage
    pub fn stage1_query(question: &str) -> String {
        question.to_string()
    }

    /// System prompt for the anonymized peer-ranking stage
    pub fn stage2_system(role: Option<&str>, context: Option<&str>) -> String {
        let base = "You are an impartial evaluator ranking anonymized responses to a \
question. You do not know which system wrote which response, and you must \
judge purely on quality, accuracy, and usefulness.";
        Self::with_role_and_context(base, role, context)
    }

    /// User prompt for the peer-ranking stage.
    ///
    /// `answers` pairs each anonymous label with the answer text, in
    /// label assignment order. The closing instruction pins the output
    /// format the ranking parser expects.
    pub fn stage2_ranking(question: &str, answers: &[(String, String)]) -> String {
        let mut prompt = format!(
            "Original question: {question}\n\n\
The following responses were given to this question:\n"
        );

        for (label, content) in answers {
            prompt.push_str(&format!("\n--- {label} ---\n{content}\n"));
        }

        prompt.push_str(
            "\nEvaluate each response for accuracy, completeness, and clarity. \
Briefly discuss the strengths and weaknesses of each.\n\n\
Then rank all responses from best to worst. End your reply with a single \
numbered list containing every response label, one per line, best first, \
for example:\n\n1. Response B\n2. Response A\n3. Response C",
        );

        prompt
    }

    /// System prompt for the chairman synthesis stage
    pub fn stage3_system(role: Option<&str>, context: Option<&str>) -> String {
        let base = "You are the chairman of a council of AI advisors. Several advisors \
answered the user's question independently, then peer-ranked each other's \
answers. Your task is to synthesize everything into one final, authoritative \
answer. Incorporate the strongest elements of the individual answers, give \
weight to well-reasoned arguments, and resolve disagreements explicitly.";
        Self::with_role_and_context(base, role, context)
    }

    /// User prompt for the chairman.
    ///
    /// Answers are de-anonymized here: the chairman is a fixed, trusted
    /// role and sees real model names alongside the aggregate ranking.
    pub fn stage3_synthesis(
        question: &str,
        answers: &[StageOneResult],
        rankings: &[AggregateRanking],
    ) -> String {
        let mut prompt = format!("Original question: {question}\n\nCouncil answers:\n");

        for answer in answers {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", answer.model, answer.content));
        }

        if !rankings.is_empty() {
            prompt.push_str("\nPeer ranking (average position across judges, lower is better):\n");
            for r in rankings {
                prompt.push_str(&format!(
                    "- {}: {:.2} ({} judge{})\n",
                    r.model,
                    r.average_position,
                    r.judge_count,
                    if r.judge_count == 1 { "" } else { "s" }
                ));
            }
        }

        prompt.push_str(
            "\nWrite the final answer for the user. Respond with the answer itself - \
no meta-commentary about the council process.",
        );

        prompt
    }

    /// System prompt for the auxiliary title summarization task
    pub fn title_system() -> &'static str {
        "You generate short conversation titles. Reply with only the title: \
at most six words, no quotes, no trailing punctuation."
    }

    /// User prompt for the title task
    pub fn title_query(question: &str) -> String {
        format!("Generate a title for a conversation that starts with this message:\n\n{question}")
    }

    fn with_role_and_context(base: &str, role: Option<&str>, context: Option<&str>) -> String {
        let mut prompt = base.to_string();

        if let Some(role) = role {
            prompt.push_str(&format!(
                "\n\nAnswer from the perspective of the \"{role}\" department."
            ));
        }

        // Injected verbatim; the pipeline treats the context as opaque
        if let Some(context) = context {
            prompt.push_str(&format!("\n\nBusiness context:\n{context}"));
        }

        prompt
    }
}
