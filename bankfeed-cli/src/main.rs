use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use bankfeed_core::ParseResult;
use bankfeed_ingest::{TabularParser, TextStatementParser};

#[derive(Parser, Debug)]
#[command(name = "bankfeed", version, about = "Bank-statement parsing engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a CSV statement export
    Csv {
        /// Path to the CSV file
        file: PathBuf,

        /// Emit the full parse result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse text already extracted from a PDF statement
    Text {
        /// Path to the extracted-text file
        file: PathBuf,

        /// Emit the full parse result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Csv { file, json } => {
            if !file.exists() {
                bail!("CSV not found: {}", file.display());
            }
            let result = parse_csv_file(&file)?;
            report(&result, json)?;
        }

        Command::Text { file, json } => {
            if !file.exists() {
                bail!("text file not found: {}", file.display());
            }
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let parser = TextStatementParser::new()?;
            let result = parser.parse(&text);
            report(&result, json)?;
        }
    }

    Ok(())
}

fn parse_csv_file(path: &Path) -> Result<ParseResult> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.context("reading CSV row")?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let parser = TabularParser::new()?;
    Ok(parser.parse(&headers, &rows))
}

fn report(result: &ParseResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("Parsed {} transactions", result.total_count);
    for t in &result.transactions {
        println!(
            "{} | {:>12.2} | {:?} | {}",
            t.date, t.amount, t.kind, t.description
        );
    }
    if !result.errors.is_empty() {
        println!("\nWarnings:");
        for e in &result.errors {
            println!("- {e}");
        }
    }
    Ok(())
}
