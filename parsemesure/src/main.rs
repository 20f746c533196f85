use anyhow::Result;
use chantiers_core::ChantierConfig;
use chantiers_core::dirbrowser::find_files;
use chantiers_core::measurement::xls_to_txt;
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parsemesure")]
#[command(about = "Convert Orange OTDR measurement workbooks to text reports", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory tree holding the measurement workbooks
    #[arg(value_name = "DIR")]
    dir: PathBuf,

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

    let files = find_files(&cli.dir, &config.global.measure_extension);
    let results: Vec<_> = files.par_iter().map(|file| (file, xls_to_txt(file))).collect();

    let mut nb_errors = 0;
    for (file, result) in &results {
        match result {
            Ok(txt) => println!("{} {}", "✓".green().bold(), txt.display()),
            Err(e) => {
                nb_errors += 1;
                println!("{} {}: {:#}", "✗".red().bold(), file.display(), e);
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Converted:".green().bold(), results.len() - nb_errors);
    if nb_errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), nb_errors);
        std::process::exit(1);
    }
    Ok(())
}
