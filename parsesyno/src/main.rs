use anyhow::{Context, Result};
use chantiers_core::Syno;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parsesyno")]
#[command(about = "Extract the site hierarchy of a synoptic drawing", long_about = None)]
#[command(version)]
struct Cli {
    /// Synoptic workbook holding a "Syno" sheet
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output file (defaults to <FILE stem>_sites.xlsx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let syno = Syno::parse_file(&cli.file)
        .with_context(|| format!("could not parse {}", cli.file.display()))?;

    let output = cli.output.unwrap_or_else(|| {
        let stem = cli
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        cli.file.with_file_name(format!("{stem}_sites.xlsx"))
    });
    syno.write_xlsx(&output)
        .with_context(|| format!("could not write {}", output.display()))?;
    println!(
        "{} {}: {} sites written to {}",
        "✓".green().bold(),
        syno.sro_name.cyan(),
        syno.sites.len(),
        output.display()
    );
    Ok(())
}
