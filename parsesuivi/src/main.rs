use anyhow::{Context, Result};
use chantiers_core::{Catalog, Suivi};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod formatter;

#[derive(Parser)]
#[command(name = "parsesuivi")]
#[command(about = "Count worksite progress per BPU article and week", long_about = None)]
#[command(version)]
struct Cli {
    /// BPU catalog workbook (Prices and Boxes sheets)
    #[arg(value_name = "BPU")]
    bpu: PathBuf,

    /// Team progress workbook (Tirage, Racco and Mesures tabs)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output file (defaults to <FILE stem>_avancement.xlsx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reference day closing the week range (defaults to today), as YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    date: Option<NaiveDate>,

    /// Issues output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let catalog = Catalog::from_file(&cli.bpu)
        .with_context(|| format!("could not create catalog from {}", cli.bpu.display()))?;
    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());

    let (suivi, issues) = Suivi::from_file(&cli.file, catalog, today)
        .with_context(|| format!("could not read progress from {}", cli.file.display()))?;

    match cli.format {
        OutputFormat::Human => formatter::print_human(&cli.file, &issues),
        OutputFormat::Json => formatter::print_json(&cli.file, &issues)?,
    }
    if issues.has_error() {
        std::process::exit(1);
    }

    let output = cli.output.unwrap_or_else(|| {
        let stem = cli
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        cli.file.with_file_name(format!("{stem}_avancement.xlsx"))
    });
    suivi.write_xlsx(&output)?;
    if matches!(cli.format, OutputFormat::Human) {
        println!(
            "{} {} items over {} weeks written to {}",
            "✓".green().bold(),
            suivi.items.len(),
            suivi.dates().len(),
            output.display()
        );
    }
    Ok(())
}
