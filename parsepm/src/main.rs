use anyhow::{Context, Result};
use chantiers_core::{ChantierConfig, Zone};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parsepm")]
#[command(about = "Rebuild a PM distribution tree from its splice plans", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the BPE splice plan workbooks
    #[arg(value_name = "BPE_DIR")]
    bpe_dir: PathBuf,

    /// ROP routing workbook (tree is inferred from cable names when missing)
    #[arg(long, value_name = "FILE")]
    rop: Option<PathBuf>,

    /// Cable quantities workbook
    #[arg(long, value_name = "FILE")]
    quantites: Option<PathBuf>,

    /// Report name (defaults to the BPE directory name)
    #[arg(short, long)]
    name: Option<String>,

    /// Output directory (defaults to the BPE directory)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Also write the JSON site description
    #[arg(long)]
    json: bool,

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

    let name = match &cli.name {
        Some(name) => name.clone(),
        None => cli
            .bpe_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .context("could not infer report name from BPE directory, use --name")?,
    };
    let output_dir = cli.output.clone().unwrap_or_else(|| cli.bpe_dir.clone());

    let mut zone = Zone::with_config(&config);
    zone.parse_bpe_dir(&cli.bpe_dir, &config.global.bpe_file_marker)
        .with_context(|| format!("could not parse BPE directory {}", cli.bpe_dir.display()))?;

    match &cli.rop {
        Some(rop) => zone
            .parse_rop(rop)
            .with_context(|| format!("could not parse ROP file {}", rop.display()))?,
        None => zone.create_bpe_tree(),
    }
    zone.set_splice_points();
    zone.detect_cables();

    if let Some(quantites) = &cli.quantites {
        zone.parse_quantite_cable(quantites)
            .with_context(|| format!("could not parse cable quantities {}", quantites.display()))?;
    }
    zone.enable_cables(&config);

    let report = zone.write_xlsx(&output_dir, &name)?;
    println!(
        "{} {} nodes, {} cables written to {}",
        "✓".green().bold(),
        zone.nodes.len(),
        zone.cables.len(),
        report.display()
    );

    if cli.json {
        let json = zone.write_json(&output_dir, &name)?;
        println!("{} site description written to {}", "✓".green().bold(), json.display());
    }
    Ok(())
}
