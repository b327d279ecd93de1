//! CLI entrypoint for council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{RunDeliberationInput, RunDeliberationUseCase};
use council_domain::Model;
use council_infrastructure::{ConfigLoader, JsonlEventLogger, OpenRouterGateway};
use council_presentation::{Cli, ConsoleFormatter, LiveRenderer, OutputFormat};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting council");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?
    };

    let question = match cli.question {
        Some(q) if !q.trim().is_empty() => q,
        _ => bail!("Question is required."),
    };

    // CLI flags override file configuration
    let models: Vec<Model> = if cli.model.is_empty() {
        config.council.parse_models()
    } else {
        cli.model.iter().map(|s| s.parse().unwrap()).collect()
    };
    if models.is_empty() {
        bail!("No council models configured.");
    }

    let chairman: Model = match &cli.chairman {
        Some(s) => s.parse().unwrap(),
        None => config.council.parse_chairman(),
    };

    let context = match &cli.context {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read context file {}", path.display()))?,
        ),
        None => None,
    };

    // === Dependency Injection ===
    let gateway = Arc::new(OpenRouterGateway::from_env(
        &config.api.key_env,
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    )?);

    let mut use_case = RunDeliberationUseCase::new(gateway);

    if let Some(path) = &cli.transcript {
        match JsonlEventLogger::new(path) {
            Some(logger) => use_case = use_case.with_event_logger(Arc::new(logger)),
            None => warn!("Transcript disabled: cannot write {}", path.display()),
        }
    }

    // Ctrl-C cancels the run cooperatively; partial results stay visible
    let token = CancellationToken::new();
    use_case = use_case.with_cancellation(token.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let mut input = RunDeliberationInput::new(question.clone(), models.clone(), chairman);
    if let Some(context) = context {
        input = input.with_context(context);
    }
    if let Some(role) = &cli.role {
        input = input.with_role(role.clone());
    }
    if config.council.generate_title && !cli.no_title {
        input = input.with_title();
    }

    if !cli.quiet {
        println!();
        println!("Question: {}", question);
        println!(
            "Council: {}",
            models
                .iter()
                .map(|m| m.short_name().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("Chairman: {}", input.chairman.short_name());
        println!();
    }

    let renderer = if cli.quiet {
        LiveRenderer::quiet()
    } else {
        LiveRenderer::new()
    };

    let (tx, rx) = mpsc::channel(256);
    let run = tokio::spawn(async move { use_case.execute(input, tx).await });
    let view = renderer.run(rx).await;
    let result = run.await?;

    match result {
        Ok(outcome) => {
            let output = match cli.output {
                OutputFormat::Full => ConsoleFormatter::format(&outcome),
                OutputFormat::Final => ConsoleFormatter::format_final_only(&outcome),
                OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
            };
            println!("{}", output);
            Ok(())
        }
        Err(err) => {
            if !cli.quiet {
                println!("{}", ConsoleFormatter::format_partial(&view));
            }
            Err(err.into())
        }
    }
}
