//! CLI entry point for the vault-bestiary indexer.
//!
//! This binary builds a creature index from an Obsidian-style vault of
//! markdown notes: one-shot scans for inspection and scripting, or a live
//! watch mode that keeps the index current as notes change.
//!
//! # Usage
//!
//! ```bash
//! bestiary [OPTIONS] <COMMAND>
//!
//! # Scan the vault and print a summary
//! bestiary scan --vault ~/vaults/campaign
//!
//! # Keep watching and re-indexing until interrupted
//! bestiary watch --vault ~/vaults/campaign
//!
//! # Print one creature record as JSON
//! bestiary show "Ancient Red Dragon" --vault ~/vaults/campaign
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use bestiary_core::{Config, Creature, Provenance};
use bestiary_index::{reference, CreatureIndex};
use bestiary_scanner::{Notice, ScanCommand, ScanCoordinator, Vault};
use bestiary_watcher::{MarkdownFilter, VaultWatcher};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Creature index for markdown vaults.
///
/// Scans vault notes marked with a `statblock` front-matter key and merges
/// them with user records and the bundled reference set.
#[derive(Parser)]
#[command(name = "bestiary", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to the vault root directory.
    #[arg(long, global = true, env = "BESTIARY_VAULT", default_value = ".")]
    vault: Utf8PathBuf,

    /// Path to a JSON configuration file.
    #[arg(long, global = true, env = "BESTIARY_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Restrict scanning to these vault-relative folder prefixes.
    ///
    /// May be given multiple times. Without it the whole vault is in scope.
    #[arg(long, global = true)]
    scope: Vec<String>,

    /// Skip loading the bundled reference creatures.
    #[arg(long, global = true)]
    no_reference: bool,

    /// Enable verbose logging (debug level, includes per-file skip reasons).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan the vault once and display an index summary.
    Scan {
        /// List every indexed creature with its provenance and source.
        #[arg(short, long)]
        detailed: bool,

        /// Emit the full index as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Scan, then keep the index current until interrupted.
    Watch,

    /// Scan the vault and print one creature record as JSON.
    Show {
        /// Creature name, resolved through tier precedence.
        name: String,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},notify=warn,ignore=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the config file (if any) plus CLI overrides.
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("cannot load configuration from {path}"))?,
        None => Config::default(),
    };
    if !cli.scope.is_empty() {
        config.parse.scope_paths.clone_from(&cli.scope);
    }
    config.parse.debug |= cli.verbose;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Builds the index, pre-loaded with the reference tier unless disabled.
fn build_index(no_reference: bool) -> anyhow::Result<Arc<CreatureIndex>> {
    if no_reference {
        return Ok(Arc::new(CreatureIndex::new()));
    }
    let bundled = reference::builtin().context("bundled reference set is malformed")?;
    Ok(Arc::new(CreatureIndex::with_reference(bundled)))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs one scan to completion and tears the pipeline down.
///
/// Returns the derived record count and elapsed time from the settle notice.
async fn scan_once(
    vault: Vault,
    config: Config,
    index: &Arc<CreatureIndex>,
) -> anyhow::Result<(usize, Duration)> {
    let (notice_tx, mut notice_rx) = mpsc::channel(4);
    let coordinator = ScanCoordinator::new(
        Arc::clone(index),
        vault,
        Arc::new(RwLock::new(config)),
    )
    .with_notices(notice_tx);

    let (command_tx, command_rx) = mpsc::channel(8);
    let (_event_tx, event_rx) = mpsc::channel(1);
    let pipeline = tokio::spawn(coordinator.run(event_rx, command_rx));

    command_tx
        .send(ScanCommand::Rescan { announce: true })
        .await
        .map_err(|_| anyhow!("scan coordinator exited before scanning"))?;

    let notice = notice_rx
        .recv()
        .await
        .ok_or_else(|| anyhow!("scan pipeline stopped before settling"))?;

    command_tx.send(ScanCommand::Shutdown).await.ok();
    pipeline.await.context("scan coordinator panicked")?;

    match notice {
        Notice::ScanComplete { creatures, elapsed } => Ok((creatures, elapsed)),
        Notice::WorkerLost => Err(anyhow!("parsing worker failed during the scan")),
    }
}

/// Runs a one-shot scan with summary output.
async fn run_scan(
    vault: Vault,
    config: Config,
    index: Arc<CreatureIndex>,
    detailed: bool,
    json: bool,
) -> anyhow::Result<()> {
    info!(vault = %vault.root(), "Starting vault scan");
    let (creatures, elapsed) = scan_once(vault, config, &index).await?;

    if json {
        return print_index_json(&index);
    }

    print_summary(&index, creatures, elapsed)?;
    if detailed {
        print_detailed_list(&index)?;
    }
    Ok(())
}

/// Runs an initial scan, then keeps re-indexing on vault changes until
/// Ctrl-C (or SIGTERM on Unix).
async fn run_watch(vault: Vault, config: Config, index: Arc<CreatureIndex>) -> anyhow::Result<()> {
    info!(vault = %vault.root(), "Starting watch mode");

    let (notice_tx, mut notice_rx) = mpsc::channel(16);
    let coordinator = ScanCoordinator::new(
        Arc::clone(&index),
        vault.clone(),
        Arc::new(RwLock::new(config.clone())),
    )
    .with_notices(notice_tx);

    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, event_rx) = mpsc::channel(100);
    let pipeline = tokio::spawn(coordinator.run(event_rx, command_rx));

    let mut watcher = VaultWatcher::new(vault.root(), &config.watch, MarkdownFilter)
        .await
        .context("failed to start vault watcher")?;
    let forwarder = tokio::spawn(async move {
        while let Some(event) = watcher.recv().await {
            if event_tx.send(event).await.is_err() {
                break;
            }
        }
    });

    command_tx
        .send(ScanCommand::Rescan { announce: true })
        .await
        .map_err(|_| anyhow!("scan coordinator exited before scanning"))?;

    loop {
        tokio::select! {
            signal = shutdown_signal() => {
                signal.context("failed to listen for shutdown signal")?;
                info!("Shutdown signal received");
                break;
            }
            notice = notice_rx.recv() => match notice {
                Some(Notice::ScanComplete { creatures, elapsed }) => {
                    info!(
                        creatures,
                        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                        "Vault indexed"
                    );
                }
                Some(Notice::WorkerLost) => {
                    warn!("Parsing worker failed; index frozen at current contents");
                }
                None => break,
            },
        }
    }

    command_tx.send(ScanCommand::Shutdown).await.ok();
    pipeline.await.context("scan coordinator panicked")?;
    forwarder.abort();
    Ok(())
}

/// Scans the vault, then prints one resolved creature record as JSON.
async fn run_show(
    vault: Vault,
    config: Config,
    index: Arc<CreatureIndex>,
    name: &str,
) -> anyhow::Result<()> {
    scan_once(vault, config, &index).await?;

    let Some(creature) = index.get(name) else {
        bail!("no creature named {name:?} in the index");
    };
    let json = serde_json::to_string_pretty(&creature)?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}")?;
    Ok(())
}

/// Waits for Ctrl-C, or SIGTERM on Unix.
#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = sigterm.recv() => Ok(()),
    }
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints an index summary after a completed scan.
fn print_summary(index: &CreatureIndex, creatures: usize, elapsed: Duration) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle)?;
    writeln!(handle, "Bestiary Index Summary")?;
    writeln!(handle, "======================")?;
    writeln!(handle)?;
    writeln!(handle, "Derived from vault:  {creatures}")?;
    writeln!(handle, "User records:        {}", index.user_len())?;
    writeln!(handle, "Reference records:   {}", index.reference_len())?;
    writeln!(handle, "Resolvable names:    {}", index.names().len())?;
    writeln!(handle)?;
    writeln!(handle, "Scan took {:.1}ms", elapsed.as_secs_f64() * 1000.0)?;
    Ok(())
}

/// Prints every indexed creature with its provenance and source path.
fn print_detailed_list(index: &CreatureIndex) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle)?;
    for name in index.names() {
        let Some(creature) = index.get(&name) else {
            continue;
        };
        match &creature.path {
            Some(path) => writeln!(
                handle,
                "  {name}  [{}]  {path}",
                provenance_label(creature.provenance)
            )?,
            None => writeln!(handle, "  {name}  [{}]", provenance_label(creature.provenance))?,
        }
    }
    Ok(())
}

/// Dumps every resolvable record as a JSON array.
fn print_index_json(index: &CreatureIndex) -> anyhow::Result<()> {
    let records: Vec<Creature> = index
        .names()
        .into_iter()
        .filter_map(|name| index.get(&name))
        .collect();
    let json = serde_json::to_string_pretty(&records)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}")?;
    Ok(())
}

/// Short display label for a provenance tier.
fn provenance_label(provenance: Provenance) -> &'static str {
    match provenance {
        Provenance::User => "user",
        Provenance::Derived => "derived",
        Provenance::Reference => "reference",
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.no_color);

    let vault = Vault::open(&cli.vault)
        .with_context(|| format!("cannot open vault at {}", cli.vault))?;
    let config = build_config(&cli)?;
    let index = build_index(cli.no_reference)?;

    match &cli.command {
        Commands::Scan { detailed, json } => {
            run_scan(vault, config, index, *detailed, *json).await
        }
        Commands::Watch => run_watch(vault, config, index).await,
        Commands::Show { name } => run_show(vault, config, index, name).await,
    }
}
