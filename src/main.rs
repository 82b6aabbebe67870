//! Shorthand - acronym expansion and generation from the command line
//!
//! Thin wrapper over `shorthand_core` for trying the engine against local
//! files. Acronyms live in an in-memory store seeded from JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use shorthand_core::{
    generation::{synthesize, Strategy},
    AcronymEditor, AcronymStore, EditorEvent, GenerationOrchestrator, GenerationReport, InMemoryStore,
    Key, NewAcronym, ShorthandConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shorthand")]
#[command(about = "Acronym detection, expansion, and generation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file (TOML); SHORTHAND__* env vars override it
    #[arg(short, long, env = "SHORTHAND_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine a text file (one captured entry per line) for new acronyms
    Mine {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Existing acronyms (JSON array of {acronym, expansion})
        #[arg(short, long)]
        seed: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the labels synthesized for a phrase
    Synthesize {
        /// Phrase to abbreviate
        phrase: String,

        /// Number of attempts to show
        #[arg(short, long, default_value = "3")]
        attempts: usize,
    },

    /// Type TEXT into a buffer and press Tab
    Expand {
        /// Text to type
        text: String,

        /// Known acronyms (JSON array of {acronym, expansion})
        #[arg(short, long)]
        seed: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let level = level.as_str().to_lowercase();
    let filter = EnvFilter::new(format!("shorthand={},shorthand_core={}", level, level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Shorthand v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = ShorthandConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Mine { input, seed, json } => {
            let store = Arc::new(seeded_store(seed.as_deref()).await?);
            let report = mine_file(&input, store.clone(), config).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Processed {} entries, mined {} phrases in {:?}",
                    report.entries_processed, report.phrases_mined, report.duration
                );
                for label in &report.acronyms_created {
                    if let Some(record) = store.get_by_acronym(label).await {
                        println!("  {:<10} {}", record.acronym, record.expansion);
                    }
                }
                if report.labels_discarded > 0 {
                    println!("Discarded {} labels", report.labels_discarded);
                }
            }
        }
        Commands::Synthesize { phrase, attempts } => {
            for attempt in 0..attempts {
                println!(
                    "{:>2}  {:<14} {}",
                    attempt,
                    format!("{:?}", Strategy::for_attempt(attempt)),
                    synthesize(&phrase, attempt)
                );
            }
        }
        Commands::Expand { text, seed } => {
            let store = Arc::new(seeded_store(Some(seed.as_path())).await?);
            let mut editor = AcronymEditor::new(config, store);
            let buffer = editor.attach("");

            editor.handle_event(buffer, EditorEvent::Insert(text)).await?;
            let outcome = editor.handle_event(buffer, EditorEvent::Key(Key::Tab)).await?;
            debug!("Tab outcome: {:?}", outcome);

            editor.flush().await;
            println!("{}", editor.detach(buffer)?);
        }
    }

    Ok(())
}

/// Build a store from an optional JSON seed file
async fn seeded_store(seed: Option<&Path>) -> anyhow::Result<InMemoryStore> {
    let store = InMemoryStore::new();
    let Some(path) = seed else {
        return Ok(store);
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let acronyms: Vec<NewAcronym> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid seed file {}", path.display()))?;

    let count = acronyms.len();
    for acronym in acronyms {
        store.create(acronym).await?;
    }
    info!("Seeded {} acronyms from {}", count, path.display());

    Ok(store)
}

/// Capture every non-empty line of `input`, then run passes until the queue is empty
async fn mine_file(
    input: &Path,
    store: Arc<InMemoryStore>,
    config: ShorthandConfig,
) -> anyhow::Result<GenerationReport> {
    let contents = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        store.create_entry(line).await?;
    }

    let orchestrator = GenerationOrchestrator::new(store, config.generation);
    let mut total = GenerationReport::default();

    loop {
        let report = orchestrator.process_pending().await?;
        let processed = report.entries_processed;
        total.merge(report);
        if processed == 0 {
            break;
        }
    }

    Ok(total)
}
