use anyhow::{Context, Result};
use clap::Parser;
use mpa_curate::report::selection;
use mpa_curate::utils::{logger, validation::Validate};
use mpa_curate::{load_dataset, CliConfig, Filter, FilterOptions, LocalStorage, Report, TomlConfig};

#[derive(Parser)]
#[command(name = "report")]
#[command(about = "Summarize a curated MPA survey dataset")]
struct Args {
    /// TOML configuration file (same format as mpa-curate)
    #[arg(short, long)]
    config: Option<String>,

    #[arg(long)]
    observations: Option<String>,

    #[arg(long)]
    sites: Option<String>,

    #[arg(long)]
    delimiter: Option<String>,

    /// Protection status ("all" for every status)
    #[arg(long)]
    protection: Option<String>,

    #[arg(long)]
    year: Option<String>,

    #[arg(long)]
    trophic: Option<String>,

    #[arg(long)]
    family: Option<String>,

    /// Print the values each filter accepts instead of the report
    #[arg(long)]
    options: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let sources = CliConfig {
        observations: args.observations.clone(),
        sites: args.sites.clone(),
        delimiter: args.delimiter.clone(),
        ..Default::default()
    };

    // 資料集只在啟動時載入一次
    let dataset = match &args.config {
        Some(path) => {
            let mut config = TomlConfig::from_file(path)
                .with_context(|| format!("Failed to load config file '{}'", path))?;
            sources.apply_overrides(&mut config);
            config.validate()?;
            load_dataset(LocalStorage::default(), config)?
        }
        None => {
            sources.validate()?;
            load_dataset(LocalStorage::default(), sources)?
        }
    };
    tracing::info!(
        "📊 Loaded {} observations across {} sites",
        dataset.observations.len(),
        dataset.sites.len()
    );

    if args.options {
        let options = FilterOptions::from_observations(&dataset.observations);
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    let year = selection(args.year.as_deref())
        .map(|y| y.parse::<i64>())
        .transpose()
        .context("--year must be a whole number or \"all\"")?;

    let filter = Filter {
        protection: selection(args.protection.as_deref()),
        year,
        trophic: selection(args.trophic.as_deref()),
        family: selection(args.family.as_deref()),
    };

    let report = Report::build(&dataset, &filter);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
