//! entity-lengths CLI
//!
//! Generates a C# constants class with the maximum lengths configured for
//! Entity Framework entity properties.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use entity_lengths::{Config, FactsReport, GenerationSession, SessionSettings};
use entity_lengths_watcher::{FileChange, FileWatcher, WatcherConfig};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const LOG_TARGETS: [&str; 5] = [
    "entity_lengths",
    "entity_lengths_core",
    "entity_lengths_languages",
    "entity_lengths_generator",
    "entity_lengths_watcher",
];

#[derive(Parser)]
#[command(name = "entity-lengths")]
#[command(about = "Max-length constants for Entity Framework entities")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (default: entity-lengths.toml when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the constants file once
    Generate {
        #[command(flatten)]
        roots: RootArgs,

        /// Output file (default: <first root>/<GeneratedClassName>.g.cs)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Assembly name used as the default namespace
        #[arg(long, value_name = "NAME")]
        assembly_name: Option<String>,

        /// Print the generated source instead of writing it
        #[arg(long)]
        stdout: bool,
    },
    /// Print the extracted facts per stream as JSON
    Facts {
        #[command(flatten)]
        roots: RootArgs,
    },
    /// Regenerate whenever a source file changes
    Watch {
        #[command(flatten)]
        roots: RootArgs,

        /// Output file (default: <first root>/<GeneratedClassName>.g.cs)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Quiet period before a burst of changes is processed
        #[arg(long, value_name = "MS")]
        debounce_ms: Option<u64>,
    },
}

#[derive(Args)]
struct RootArgs {
    /// Source directory to scan; repeatable (default: from config, else ".")
    #[arg(short, long = "root", value_name = "DIR")]
    roots: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Generate {
            roots,
            output,
            assembly_name,
            stdout,
        } => {
            let settings = SessionSettings::from_config(&config, roots.roots, output, assembly_name)?;
            generate(settings, stdout).await
        }
        Commands::Facts { roots } => {
            let settings = SessionSettings::from_config(&config, roots.roots, None, None)?;
            facts(settings).await
        }
        Commands::Watch {
            roots,
            output,
            debounce_ms,
        } => {
            let settings = SessionSettings::from_config(&config, roots.roots, output, None)?;
            let mut watcher_config = WatcherConfig::from(&config.watcher);
            if let Some(ms) = debounce_ms {
                watcher_config.debounce_ms = ms;
            }
            watch(settings, watcher_config).await
        }
    }
}

/// Initialize logging system
///
/// `RUST_LOG` overrides the level chosen by `--verbose`.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            LOG_TARGETS
                .iter()
                .map(|target| format!("{target}={level}"))
                .collect::<Vec<_>>()
                .join(","),
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Scans the project and runs the generator once, off the async runtime
async fn initial_pass(settings: SessionSettings) -> Result<GenerationSession> {
    tokio::task::spawn_blocking(move || {
        let mut session = GenerationSession::new(settings);
        session.scan()?;
        Ok(session)
    })
    .await
    .context("Initial scan panicked")?
}

async fn generate(settings: SessionSettings, stdout: bool) -> Result<()> {
    let session = initial_pass(settings).await?;
    tokio::task::spawn_blocking(move || {
        let mut session = session;
        let outcome = session.regenerate();
        if stdout {
            print!("{}", outcome.source.text);
        } else if !session.write_output(&outcome)? {
            info!("{} is up to date", session.output_path(&outcome).display());
        }
        Ok(())
    })
    .await
    .context("Generation panicked")?
}

async fn facts(settings: SessionSettings) -> Result<()> {
    let session = initial_pass(settings).await?;
    let report = tokio::task::spawn_blocking(move || {
        let mut session = session;
        let outcome = session.regenerate();
        FactsReport::new(&session.settings().assembly_name, outcome)
    })
    .await
    .context("Generation panicked")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize facts")?
    );
    Ok(())
}

async fn watch(mut settings: SessionSettings, watcher_config: WatcherConfig) -> Result<()> {
    settings.roots = settings
        .roots
        .iter()
        .map(PathBuf::as_path)
        .map(absolute)
        .collect::<Result<_>>()?;
    let roots = settings.roots.clone();
    let mut session = initial_pass(settings).await?;
    session = regenerate_and_write(session).await?;

    let mut watcher = FileWatcher::new(watcher_config)?;
    let (tx, mut changes) = mpsc::channel::<FileChange>(1024);
    for root in &roots {
        let mut events = watcher.watch(root)?;
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(change) = events.recv().await {
                if tx.send(change).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);
    info!("Watching {} root(s); press Ctrl+C to stop", roots.len());

    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else { break };
                // Fold everything that is already queued into one batch
                let mut batch = vec![change];
                while let Ok(next) = changes.try_recv() {
                    batch.push(next);
                }
                debug!("Processing {} change(s)", batch.len());

                let mut touched = false;
                for change in &batch {
                    touched |= session.apply(change);
                }
                if touched {
                    session = regenerate_and_write(session).await?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watcher");
                break;
            }
        }
    }

    watcher.stop();
    Ok(())
}

/// Runs the generator on the blocking pool and writes the output when it changed
async fn regenerate_and_write(session: GenerationSession) -> Result<GenerationSession> {
    tokio::task::spawn_blocking(move || {
        let mut session = session;
        let outcome = session.regenerate();
        if let Err(e) = session.write_output(&outcome) {
            error!("Failed to write generated source: {e:#}");
        }
        session
    })
    .await
    .context("Generation panicked")
}

/// Watch roots must match the absolute paths notify reports
fn absolute(root: &Path) -> Result<PathBuf> {
    root.canonicalize().or_else(|e| {
        warn!("Could not canonicalize {}: {e}", root.display());
        std::env::current_dir()
            .map(|cwd| cwd.join(root))
            .context("Failed to get current directory")
    })
}
