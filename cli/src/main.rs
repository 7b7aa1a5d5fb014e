//! CLI entrypoint for refract
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use refract_application::{
    BatchCoordinator, ConsensusCritic, EditOrchestrator, NoProgress, ProgressNotifier,
};
use refract_domain::{ConfigIssue, RetryPolicy, has_errors};
use refract_infrastructure::{
    ConfigLoader, CriticRegistry, FileConfig, FsEntryStore, FsInbox, GeminiImageGenerator,
    ImageCrateProcessor, JsonSiteIndex, JsonlRunJournal,
};
use refract_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    info!("Starting refract");

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);

    let mut issues = config.validate();
    issues.extend(config.providers.credential_issues());
    report_issues(&issues)?;

    // === Dependency Injection ===
    let registry = CriticRegistry::from_config(&config.providers);
    for skipped in registry.skipped() {
        info!("Critic {} skipped: {}", skipped.name, skipped.reason);
    }
    let backend_names: Vec<String> = registry.names().into_iter().map(String::from).collect();
    let critic = Arc::new(ConsensusCritic::new(
        registry.into_backends(),
        RetryPolicy::default(),
    )?);

    let generator = GeminiImageGenerator::new(&config.providers.gemini())
        .context("Image editing uses Gemini; set GEMINI_API_KEY")?;
    let (editor_config, _) = config.editor.to_editor_config();
    let editor = Arc::new(EditOrchestrator::new(
        Arc::new(generator),
        Arc::new(ImageCrateProcessor::default()),
        editor_config,
        RetryPolicy::default(),
    ));

    let (batch_config, _) = config.batch.to_batch_config();
    let dry_run = batch_config.dry_run;
    let paths = &config.paths;

    let mut coordinator = BatchCoordinator::new(
        critic,
        editor.clone(),
        Arc::new(FsInbox::new(&paths.inbox)),
        Arc::new(FsEntryStore::new(&paths.processed)),
        Arc::new(JsonSiteIndex::new(&paths.processed, &paths.site)),
        batch_config,
    );
    if let Some(path) = &paths.journal {
        match JsonlRunJournal::new(path) {
            Some(journal) => {
                info!("Recording run journal to {}", journal.path().display());
                coordinator = coordinator.with_journal(Arc::new(journal));
            }
            None => warn!("Run journal disabled"),
        }
    }

    // Ctrl+C stops scheduling; in-flight images finish
    let token = coordinator.cancellation_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted, finishing in-flight images");
                token.cancel();
            }
            Err(e) => warn!("Could not listen for Ctrl+C: {}", e),
        }
    });

    let json = cli.output == OutputFormat::Json;
    if !cli.quiet && !json {
        let names: Vec<&str> = backend_names.iter().map(String::as_str).collect();
        println!();
        println!(
            "{}",
            ConsoleFormatter::banner(&paths.inbox, &names, editor.model(), dry_run)
        );
    }

    let progress: Arc<dyn ProgressNotifier> = if json {
        Arc::new(NoProgress)
    } else if cli.quiet {
        Arc::new(SimpleProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };

    let (run, summary) = coordinator.run_detailed(progress).await?;

    let output = match cli.output {
        OutputFormat::Text => ConsoleFormatter::format(&run, &summary),
        OutputFormat::Json => ConsoleFormatter::format_json(&run, &summary),
    };
    println!("{}", output);

    Ok(())
}

/// Console logging to stderr, plus an optional daily-rotated log file.
///
/// `RUST_LOG` applies unless `-v` or `-q` was given.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = || {
        if cli.verbose > 0 || cli.quiet {
            EnvFilter::new(cli.log_filter())
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()))
        }
    };

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "refract.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter()),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Command-line flags take precedence over every config source.
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(inbox) = &cli.inbox {
        config.paths.inbox = inbox.clone();
    }
    if cli.dry_run {
        config.batch.dry_run = true;
    }
    if let Some(passes) = cli.passes {
        config.editor.passes = passes;
    }
    if let Some(model) = &cli.edit_model {
        config.editor.model = Some(model.clone());
    }
    if let Some(policy) = cli.policy {
        config.editor.policy = policy.as_str().to_string();
    }
    if let Some(workers) = cli.workers {
        config.batch.max_workers = workers;
    }
}

fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        if issue.is_error() {
            eprintln!("{} {}", "x".red(), issue);
        } else {
            warn!("{}", issue.message);
        }
    }
    if has_errors(issues) {
        bail!("Configuration has errors; see above");
    }
    Ok(())
}
