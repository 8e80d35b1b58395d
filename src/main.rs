use anyhow::{anyhow, Context, Result};
use bjorn_abbrev::batch::{self, BatchOptions, BatchProcessor, Table};
use bjorn_abbrev::config::AppConfig;
use bjorn_abbrev::pipeline::{AbbreviationPipeline, AbbreviationRequest, AbbreviationResult};
use bjorn_abbrev::quality::{self, QualityReport};
use bjorn_abbrev::ranking::{self, LearnedModel, ModelKind, ModelRegistry, TrainingReport};
use bjorn_abbrev::SharedDictionary;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "bjorn-abbrev")]
#[command(about = "Abbreviate HVAC part descriptions to fit a character budget")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Human-readable logs instead of JSON
    #[arg(long, global = true)]
    plain_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Abbreviate one description and print the result as JSON
    Abbreviate {
        text: String,

        #[arg(long)]
        target_length: Option<usize>,

        /// Use fixed rules even when a trained model is available
        #[arg(long)]
        no_ml: bool,
    },

    /// Abbreviate every "Part Definition" in a CSV file
    Batch {
        input: PathBuf,

        /// Output CSV; defaults to <input>_abbreviated.csv
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        target_length: Option<usize>,

        #[arg(long)]
        no_ml: bool,

        /// Suppress console progress bar
        #[arg(long)]
        no_progress: bool,

        /// Write run statistics as JSON
        #[arg(long)]
        stats_out: Option<PathBuf>,
    },

    /// Inspect or edit the abbreviation dictionary
    Dict {
        #[command(subcommand)]
        action: DictAction,
    },

    /// Train a ranking model from reviewed "Part Definition"/"Abbreviation" pairs
    /// and register it as the active version of its kind
    Train {
        pairs: PathBuf,

        #[arg(long, default_value = "hybrid")]
        kind: ModelKind,
    },

    /// Inspect or switch registered ranking models
    Models {
        #[command(subcommand)]
        action: ModelsAction,
    },
}

#[derive(Subcommand, Debug)]
enum ModelsAction {
    /// Print registered models; the active version of each kind is marked '*'
    List {
        #[arg(long)]
        kind: Option<ModelKind>,
    },
    /// Make a registered model the active one for its kind
    Activate { id: String },
}

#[derive(Subcommand, Debug)]
enum DictAction {
    /// Print every entry, most specific first
    List,
    /// Add or replace an entry
    Add { original: String, abbreviated: String },
    /// Remove an entry
    Remove { original: String },
    /// Add entries from a CSV with "Original" and "Abbreviation" columns
    Import { file: PathBuf },
}

#[derive(Serialize)]
struct TrainOutput<'a> {
    id: &'a str,
    path: &'a Path,
    #[serde(flatten)]
    report: &'a TrainingReport,
}

#[derive(Serialize)]
struct AbbreviateOutput<'a> {
    #[serde(flatten)]
    result: &'a AbbreviationResult,
    quality: QualityReport,
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let level: Level = level
        .parse()
        .map_err(|_| anyhow!("invalid log level '{level}'"))?;
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);
    // WHY: structured JSON logs by default; plain text for interactive use
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_logging(level, config.logging.json && !args.plain_logs)?;

    info!("Starting bjorn-abbrev");
    info!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Abbreviate { text, target_length, no_ml } => {
            let pipeline = build_pipeline(&config)?;
            let target = target_length.unwrap_or(config.abbreviation.target_length);
            let request = AbbreviationRequest::new(text)
                .with_target_length(target)
                .with_ml(config.abbreviation.use_ml && !no_ml);
            let result = pipeline.abbreviate(&request)?;
            let output = AbbreviateOutput {
                result: &result,
                quality: quality::verify(&result, target),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Batch {
            input,
            output,
            target_length,
            no_ml,
            no_progress,
            stats_out,
        } => {
            let options = BatchOptions::new(target_length.unwrap_or(config.abbreviation.target_length))
                .with_ml(config.abbreviation.use_ml && !no_ml);
            let output = output.unwrap_or_else(|| default_output_path(&input));
            run_batch(&config, options, input, output, no_progress, stats_out).await?;
        }
        Command::Dict { action } => run_dict(&config, action)?,
        Command::Train { pairs, kind } => {
            let file = std::fs::File::open(&pairs)
                .with_context(|| format!("cannot open training pairs {}", pairs.display()))?;
            let training_pairs = batch::read_training_pairs(file)?;
            let (model, report) = LearnedModel::train(kind, &training_pairs)?;
            let mut registry = ModelRegistry::open(&config.models.registry_path)?;
            let entry = registry.register_trained(&model, &report)?;
            let output = TrainOutput {
                id: &entry.id,
                path: &entry.path,
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Models { action } => run_models(&config, action)?,
    }

    Ok(())
}

fn build_pipeline(config: &AppConfig) -> Result<AbbreviationPipeline> {
    let dictionary = SharedDictionary::open(&config.dictionary.path)?;
    let ranker = ranking::load_ranker(&config.models);
    Ok(AbbreviationPipeline::new(dictionary, ranker, &config.abbreviation))
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    input.with_file_name(format!("{stem}_abbreviated.csv"))
}

async fn run_batch(
    config: &AppConfig,
    options: BatchOptions,
    input: PathBuf,
    output: PathBuf,
    no_progress: bool,
    stats_out: Option<PathBuf>,
) -> Result<()> {
    // WHY: validate input exists early to fail fast with clear error
    if !input.is_file() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let pipeline = build_pipeline(config)?;

    let progress = if no_progress {
        ProgressBar::hidden()
    } else {
        // length is set once the input is parsed
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} rows ({eta})")?
                .progress_chars("#>-"),
        );
        pb
    };

    // CPU-bound row processing runs on its own threads, off the async runtime
    let worker_progress = progress.clone();
    let worker_output = output.clone();
    let report = tokio::task::spawn_blocking(move || {
        let processor = BatchProcessor::new(&pipeline, options);
        batch::process_file(&processor, &input, &worker_output, Some(&worker_progress))
    })
    .await??;
    progress.finish_with_message("done");

    if let Some(stats_path) = stats_out {
        let content = serde_json::to_string_pretty(&report.statistics)?;
        tokio::fs::write(&stats_path, content).await?;
        info!("Wrote run statistics to {}", stats_path.display());
    }

    let summary = &report.summary;
    println!("bjorn-abbrev v{} - batch complete", env!("CARGO_PKG_VERSION"));
    println!("  Processed: {} rows", summary.processed_count);
    println!("  Failed: {} rows", summary.failed_count);
    println!("  Success rate: {:.1}%", summary.success_rate * 100.0);
    println!("  Average reduction: {:.1}%", summary.avg_reduction);
    if let Some(method) = summary.method_used {
        println!("  Most common method: {method}");
    }
    println!("  Output: {}", output.display());
    Ok(())
}

fn run_dict(config: &AppConfig, action: DictAction) -> Result<()> {
    let dictionary = SharedDictionary::open(&config.dictionary.path)?;
    match action {
        DictAction::List => {
            for term in dictionary.list()? {
                println!("{}\t{}", term.original, term.abbreviated);
            }
        }
        DictAction::Add { original, abbreviated } => match dictionary.add(&original, &abbreviated)? {
            Some(previous) => println!("Updated '{}': '{}' -> '{}'", original, previous.abbreviated, abbreviated),
            None => println!("Added '{original}' -> '{abbreviated}'"),
        },
        DictAction::Remove { original } => match dictionary.remove(&original)? {
            Some(removed) => println!("Removed '{}'", removed.original),
            None => anyhow::bail!("No dictionary entry for '{original}'"),
        },
        DictAction::Import { file } => {
            let table = Table::from_path(&file)?;
            let original = table
                .column("Original")
                .ok_or_else(|| anyhow!("{} has no \"Original\" column", file.display()))?;
            let abbreviated = table
                .column(batch::ABBREVIATION)
                .ok_or_else(|| anyhow!("{} has no \"Abbreviation\" column", file.display()))?;
            let pairs = table.rows.iter().filter_map(|row| {
                Some((row.get(original)?.as_str(), row.get(abbreviated)?.as_str()))
            });
            let report = dictionary.add_many(pairs)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn run_models(config: &AppConfig, action: ModelsAction) -> Result<()> {
    let mut registry = ModelRegistry::open(&config.models.registry_path)?;
    match action {
        ModelsAction::List { kind } => {
            for entry in registry.list(kind) {
                let marker = if registry.is_active(entry) { '*' } else { ' ' };
                println!(
                    "{} {}\t{}\t{}\t{}",
                    marker,
                    entry.id,
                    entry.kind,
                    entry.path.display(),
                    serde_json::to_string(&entry.metrics)?
                );
            }
        }
        ModelsAction::Activate { id } => {
            registry.set_active(&id)?;
            println!("Activated '{id}'");
        }
    }
    Ok(())
}
