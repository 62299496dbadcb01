//! Forensic document summarizer CLI
//!
//! Classifies plain-text case documents and summarizes them against a
//! local OpenAI-compatible completion server.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;
mod context;

use context::AppContext;

#[derive(Parser)]
#[command(name = "summarize")]
#[command(about = "Classify and summarize forensic case documents")]
#[command(version)]
struct Cli {
    /// Only print results, no progress
    #[arg(short, long, global = true)]
    quiet: bool,

    /// JSON file with extra classification rules (or FS_RULES_FILE)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Comma-separated category codes (or FS_CATEGORIES)
    #[arg(long, global = true, value_delimiter = ',')]
    categories: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the category of a document
    Classify {
        /// Plain-text document
        file: PathBuf,

        /// Filename to classify by, when it differs from FILE
        #[arg(long)]
        name: Option<String>,

        /// Print score and hit diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize a document
    Summarize(cmd::summarize::SummarizeArgs),

    /// Print the merged rule table as JSON
    Rules,
}

fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,summarization=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = AppContext::new(cli.quiet, cli.rules, cli.categories);

    match cli.command {
        Commands::Classify { file, name, json } => cmd::classify::run(&ctx, &file, name, json),
        Commands::Summarize(args) => cmd::summarize::run(&ctx, args),
        Commands::Rules => cmd::rules::run(&ctx),
    }
}
