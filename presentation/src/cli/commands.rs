//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for deliberation results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Full formatted output with all three stages
    Full,
    /// Only the chairman's final answer
    Final,
    /// JSON output of the structured outcome
    Json,
}

/// CLI arguments for council
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(author, version, about = "LLM Council - independent answers, anonymous peer ranking, one synthesized reply")]
#[command(long_about = r#"
Council sends your question to several LLM backends at once, has the same
models rank each other's answers anonymously, and asks a fixed chairman
model to synthesize everything into one final reply.

The process has three stages:
1. Independent Answers: every council model answers in parallel
2. Peer Ranking: each model ranks the anonymized answers
3. Chairman Synthesis: the chairman writes the final answer

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./council.toml      Project-level config
3. ~/.config/council/config.toml   Global config

Example:
  council "What's the best way to handle errors in Rust?"
  council -m openai/gpt-5.1 -m x-ai/grok-4 "Compare async runtimes"
  council --role finance --context acme.md "Should we raise prices?"
"#)]
pub struct Cli {
    /// The question to put before the council
    pub question: Option<String>,

    /// Models on the council (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Model to use as chairman for the final synthesis
    #[arg(long, value_name = "MODEL")]
    pub chairman: Option<String>,

    /// File with business context to inject into every prompt
    #[arg(long, value_name = "PATH")]
    pub context: Option<PathBuf>,

    /// Department role the council answers from
    #[arg(long, value_name = "ROLE")]
    pub role: Option<String>,

    /// Skip the conversation title side-task
    #[arg(long)]
    pub no_title: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "final")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write a JSONL event transcript of the run to this path
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,
}
