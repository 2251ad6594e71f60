use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use dcp_analyzer::{
    analyze_batch, analyze_document, matrix_title, write_matrix_csv, Batch, BatchItem,
    DcpAnalyzer, DecoderRegistry, Document, Upload, DEFAULT_LOG_FILTER,
};

/// Extract agreement numbers and competency completeness from DCP statements
#[derive(Parser, Debug)]
#[command(name = "dcp-analyzer", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode and analyze documents, print the batch response as JSON
    Analyze {
        /// PDF or .txt files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print each document's completeness matrix as CSV
    Matrix {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Analyze an already-extracted text file
    Text {
        file: PathBuf,

        /// Display name in the result (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { files, pretty } => run_analyze(&files, pretty),
        Command::Matrix { files } => run_matrix(&files),
        Command::Text { file, name } => run_text(&file, name),
    }
}

fn run_analyze(files: &[PathBuf], pretty: bool) -> Result<()> {
    let batch = Batch::unbounded(read_uploads(files)?)?;
    let response = analyze_batch(&DcpAnalyzer::new(), &DecoderRegistry::new(), &batch);

    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);

    eprintln!("✓ {}", response.summary().summary());
    Ok(())
}

fn run_matrix(files: &[PathBuf]) -> Result<()> {
    let batch = Batch::unbounded(read_uploads(files)?)?;
    let response = analyze_batch(&DcpAnalyzer::new(), &DecoderRegistry::new(), &batch);

    for item in &response.items {
        match item {
            BatchItem::Analyzed(result) => {
                println!("# {}", matrix_title(result));
                write_matrix_csv(result, io::stdout().lock())?;
                println!();
            }
            BatchItem::Failed(failure) => {
                eprintln!("❌ {}: {}", failure.file_name, failure.error);
            }
        }
    }

    Ok(())
}

fn run_text(file: &Path, name: Option<String>) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read text file: {}", file.display()))?;

    let name = name.unwrap_or_else(|| display_name(file));
    let result = analyze_document(&Document::new(name, text));

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn read_uploads(files: &[PathBuf]) -> Result<Vec<Upload>> {
    files
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to open file: {}", path.display()))?;
            Ok(Upload::new(display_name(path), bytes))
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

// ============================================================================
// TESTS
// ============================================================================
