//! ClaimPilot command line.
//!
//! Each subcommand reads one domain request from a JSON file (or stdin
//! with `-`), runs it through the analyzer, and prints the response
//! envelope as JSON on stdout. Logs go to stderr so output stays
//! pipeable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use claimpilot_core::{ClaimInvestigationRequest, FileNoteRequest, QuestionGenerationRequest};
use claimpilot_runtime::{ClaimAnalyzer, RuntimeConfig, StatusReport};

#[derive(Parser, Debug)]
#[command(name = "claimpilot")]
#[command(about = "Claim intake pipeline: redact, route, validate", long_about = None)]
struct Cli {
    /// Path to the YAML config; defaults apply when the file is absent
    #[arg(long, env = "CLAIMPILOT_CONFIG", default_value = "claimpilot.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Triage a claim and produce an investigation checklist
    Analyze {
        /// JSON file with a claim investigation request, or - for stdin
        request: PathBuf,
    },
    /// Generate investigation questions for one party
    Questions {
        /// JSON file with a question generation request, or - for stdin
        request: PathBuf,
    },
    /// Analyze coverage and liability for a claim
    Coverage {
        /// JSON file with a claim investigation request, or - for stdin
        request: PathBuf,
    },
    /// Draft a claim file note from completed work
    FileNote {
        /// JSON file with a file note request, or - for stdin
        request: PathBuf,
    },
    /// Show configured providers and routing posture
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Analyze { request } => {
            let request: ClaimInvestigationRequest = read_request(&request)?;
            let analyzer = ClaimAnalyzer::from_config(&config);
            print_json(&analyzer.analyze_claim(&request).await?)
        }
        Command::Questions { request } => {
            let request: QuestionGenerationRequest = read_request(&request)?;
            let analyzer = ClaimAnalyzer::from_config(&config);
            print_json(&analyzer.generate_questions(&request).await?)
        }
        Command::Coverage { request } => {
            let request: ClaimInvestigationRequest = read_request(&request)?;
            let analyzer = ClaimAnalyzer::from_config(&config);
            print_json(&analyzer.analyze_coverage(&request).await?)
        }
        Command::FileNote { request } => {
            let request: FileNoteRequest = read_request(&request)?;
            let analyzer = ClaimAnalyzer::from_config(&config);
            print_json(&analyzer.generate_file_note(&request).await?)
        }
        Command::Status => print_json(&StatusReport::collect(&config)),
    }
}

fn load_config(path: &Path) -> Result<RuntimeConfig> {
    if path.exists() {
        RuntimeConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(RuntimeConfig::default())
    }
}

fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("failed to read request from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request from {}", path.display()))?
    };
    serde_json::from_str(&contents).context("request is not valid JSON for this operation")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
