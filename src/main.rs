//! TG-CNN activation graphs - CLI
//!
//! Scores a filter pool against a labeled population and prints the
//! activated graph of one patient.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tgcnn_act_graph::{pipeline, Config, Dataset};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "act-graph")]
#[command(about = "Filter activation graphs for temporal patient graphs")]
struct Cli {
    /// YAML config file (defaults to ./config.yaml when present)
    #[arg(long, env = "ACT_GRAPH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activated graph of one patient against the most discriminative filter
    Run {
        /// Dataset JSON with patients, filters and labels
        #[arg(short, long)]
        input: PathBuf,

        /// Index of the patient to draw
        #[arg(short, long, default_value = "0")]
        patient: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Class difference per filter
    Differences {
        /// Dataset JSON with patients, filters and labels
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Dot,
}

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr, stdout carries the report)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tgcnn_act_graph=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            input,
            patient,
            format,
        } => run(&config, &input, patient, format),
        Commands::Differences { input } => differences(&config, &input),
    }
}

fn run(config: &Config, input: &Path, patient: usize, format: OutputFormat) -> Result<()> {
    let dataset = Dataset::load(input)?;
    tracing::info!("Explaining '{}' for patient {}", config.class_name, patient);

    let report = pipeline::run_pipeline(&dataset, patient, &config.scoring)
        .with_context(|| format!("Failed to build activated graph for patient {}", patient))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Dot => print!("{}", report.graph().dot()),
    }
    Ok(())
}

fn differences(config: &Config, input: &Path) -> Result<()> {
    let dataset = Dataset::load(input)?;
    let table = pipeline::class_differences(&dataset, &config.scoring)
        .context("Failed to score population")?;

    tracing::info!(
        "Difference in activation between positive and negative '{}' class",
        config.class_name
    );
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}
