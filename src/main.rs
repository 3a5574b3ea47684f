use clap::Parser;
use mpa_curate::core::ConfigProvider;
use mpa_curate::utils::{logger, validation::Validate};
use mpa_curate::{CliConfig, CurateError, CuratePipeline, EtlEngine, LocalStorage, TomlConfig};

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting mpa-curate");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(mut config) => {
                    cli.apply_overrides(&mut config);
                    let monitor = config.monitoring_enabled();
                    run(config, monitor, cli.dry_run)
                }
                Err(e) => Err(e),
            }
        }
        None => run(cli.clone(), cli.monitor, cli.dry_run),
    };

    if let Err(e) = result {
        fail(&e);
    }
}

fn run<C: ConfigProvider + Validate>(config: C, monitor: bool, dry_run: bool) -> Result<(), CurateError> {
    // 驗證配置
    config.validate()?;
    tracing::info!("✅ Configuration validated");
    display_config_summary(&config, dry_run);

    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = CuratePipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        let dataset = engine.dry_run()?;
        println!("🔍 Dry run complete:");
        println!("  Observations: {}", dataset.observations.len());
        println!("  Sites: {}", dataset.sites.len());
        println!("  Orphan observations: {}", dataset.orphan_observations());
        return Ok(());
    }

    let output_path = engine.run()?;
    tracing::info!("✅ Curation completed successfully!");
    println!("✅ Curation completed successfully!");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

fn display_config_summary<C: ConfigProvider>(config: &C, dry_run: bool) {
    let curation = config.curation();
    let export = config.export();

    println!("📋 Configuration Summary:");
    println!("  Observations: {}", config.observations_file());
    println!("  Sites: {}", config.sites_file());
    println!("  Delimiter: {:?}", config.delimiter() as char);
    println!("  Output: {}", export.output_path);
    println!(
        "  Formats: {}",
        export
            .formats
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if let Some(bundle) = &export.bundle {
        println!("  Bundle: {} (ZIP)", bundle);
    }
    if curation.drop_trailing_site_columns > 0 {
        println!(
            "  Dropping last {} site columns",
            curation.drop_trailing_site_columns
        );
    }
    if curation.normalize_time {
        println!("  Normalizing survey times");
    }
    if let Some(seed) = curation.shuffle_seed {
        println!("  Shuffling columns (seed {})", seed);
    }
    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

fn fail(e: &CurateError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Curation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
