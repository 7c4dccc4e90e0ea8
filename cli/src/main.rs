//! CLI entrypoint for llm-duel
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use duel_application::{
    CompositeProgress, ConversationProgressNotifier, RunConversationUseCase,
};
use duel_domain::{ConfigIssue, ConversationExport, RunStatus};
use duel_infrastructure::{ConfigLoader, FileConfig, JsonlConversationLogger, OpenAiCompatibleGateway};
use duel_presentation::{Cli, ConsoleFormatter, ExportWriter, ProgressReporter, TurnPrinter};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref())?;

    info!("Starting llm-duel");

    if cli.show_config {
        return show_config(&cli);
    }

    let file_config = load_config(&cli)?;
    if cli.no_color || !file_config.output.color {
        colored::control::set_override(false);
    }

    // === Configuration ===
    // File-level checks already cover the retry section
    let mut issues = file_config.validate();
    let (config, prompt_issues) = file_config.to_conversation_config();
    issues.extend(prompt_issues);
    let (retry_policy, _) = file_config.to_retry_policy();
    let (config, override_issues) = cli.apply_overrides(config);
    issues.extend(override_issues);
    issues.extend(config.validate());

    if !issues.is_empty() {
        eprint!("{}", ConsoleFormatter::format_issues(&issues));
    }
    if issues.iter().any(ConfigIssue::is_error) {
        bail!("Invalid configuration. Run with --show-config to see which files were loaded.");
    }

    // === Dependency Injection ===
    let gateway = Arc::new(OpenAiCompatibleGateway::new());
    let mut use_case = RunConversationUseCase::new(gateway).with_retry_policy(retry_policy);

    if let Some(path) = &cli.conversation_log {
        let logger = JsonlConversationLogger::open(path)
            .with_context(|| format!("cannot open conversation log {}", path.display()))?;
        info!("Logging conversation events to {}", logger.path().display());
        use_case = use_case.with_logger(Arc::new(logger));
    }

    if cli.check {
        let checks = use_case.check_connection(&config).await;
        println!("{}", ConsoleFormatter::format_connection_checks(&checks));
        if checks.iter().any(|check| check.result.is_err()) {
            bail!("Connection check failed");
        }
        return Ok(());
    }

    if !cli.quiet {
        println!("{}", ConsoleFormatter::header(&config));
    }

    let mut delegates: Vec<Arc<dyn ConversationProgressNotifier>> = Vec::new();
    if !cli.quiet {
        delegates.push(Arc::new(ProgressReporter::new()));
    }
    delegates.push(Arc::new(TurnPrinter::new(&config)));
    let progress = Arc::new(CompositeProgress::new(delegates));

    let cancel = CancellationToken::new();
    let handle = use_case.start(config, progress, cancel)?;

    let state = tokio::select! {
        state = handle.wait() => state,
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("\nStopping after the current turn...");
            handle.stop();
            handle.wait().await
        }
    };

    println!("{}", ConsoleFormatter::format_stats(handle.config(), &state));

    // === Export ===
    let formats = cli.export_formats(&file_config.output.export);
    if !formats.is_empty() {
        let writer = ExportWriter::new(cli.export_dir(file_config.output.export_dir.as_deref()));
        let export = ConversationExport::new(handle.config(), &state);
        let paths = writer
            .write_all(&export, &formats, chrono::Local::now())
            .with_context(|| format!("cannot write exports to {}", writer.dir().display()))?;
        for path in paths {
            println!("Saved {}", path.display());
        }
    }

    if state.status() == RunStatus::Failed {
        bail!("Conversation ended with an error");
    }

    Ok(())
}

/// Initialize tracing: stderr always, plus a daily-rolling file with `--log-dir`.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("llm-duel")
                .filename_suffix("log")
                .build(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")
}

fn show_config(cli: &Cli) -> Result<()> {
    println!("Configuration sources (highest priority first):");
    for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
        println!("{}", line);
    }

    match load_config(cli) {
        Ok(file_config) => {
            let mut issues = file_config.validate();
            let (config, prompt_issues) = file_config.to_conversation_config();
            issues.extend(prompt_issues);
            issues.extend(config.validate());
            println!();
            if issues.is_empty() {
                println!("Configuration is valid.");
            } else {
                print!("{}", ConsoleFormatter::format_issues(&issues));
            }
        }
        Err(e) => {
            warn!("{:#}", e);
            println!("\n{:#}", e);
        }
    }

    Ok(())
}
