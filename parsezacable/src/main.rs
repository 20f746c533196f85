use anyhow::{Context, Result};
use chantiers_core::ChantierConfig;
use chantiers_core::zacable::Zone;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parsezacable")]
#[command(about = "Summarize ZACABLE site workbooks per zone", long_about = None)]
#[command(version)]
struct Cli {
    /// Zone directory holding the ZACABLE workbooks (its name is the zone name)
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Output file (defaults to <zone>_suivi.xlsx in the zone directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ChantierConfig::discover(cli.config.as_deref())?;

    let zone_name = cli
        .dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .context("could not infer zone name from directory")?;
    let mut zone = Zone::new(&zone_name);
    let nb_files = zone.parse_dir(&cli.dir, &config.global.zacable_file_prefix)?;

    let output = cli
        .output
        .unwrap_or_else(|| cli.dir.join(format!("{zone_name}_suivi.xlsx")));
    zone.write_xlsx(&output)
        .with_context(|| format!("could not write {}", output.display()))?;
    println!(
        "{} {} sites from {} files written to {}",
        "✓".green().bold(),
        zone.len(),
        nb_files,
        output.display()
    );
    Ok(())
}
