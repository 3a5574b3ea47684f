pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use super::toml_config::{TomlConfig, INPUT_EXTENSIONS};
    use crate::core::ConfigProvider;
    use crate::domain::model::{
        CurationOptions, ExportFormat, ExportOptions, MAX_DROPPED_SITE_COLUMNS,
    };
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_delimiter, validate_file_extensions, validate_output_formats, validate_path,
        validate_range, validate_required_field, Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
    #[command(name = "mpa-curate")]
    #[command(about = "Clean MPA fish-transect and dive-site sheets into JSON/CSV exports")]
    pub struct CliConfig {
        /// Fish observation sheet (CSV export)
        #[arg(long)]
        pub observations: Option<String>,

        /// Dive site sheet (CSV export)
        #[arg(long)]
        pub sites: Option<String>,

        /// TOML configuration file; command-line flags override its values
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(long)]
        pub output_path: Option<String>,

        /// Output formats, comma separated (json, csv)
        #[arg(long, value_delimiter = ',')]
        pub format: Vec<String>,

        /// Write every export file into this zip archive
        #[arg(long)]
        pub bundle: Option<String>,

        /// Permute each column independently before export
        #[arg(long)]
        pub shuffle_seed: Option<u64>,

        /// Rewrite site survey times like "9.30" as "09:30"
        #[arg(long)]
        pub normalize_time: bool,

        /// Columns to cut from the right edge of the site sheet
        #[arg(long)]
        pub drop_site_columns: Option<usize>,

        /// Input field delimiter
        #[arg(long)]
        pub delimiter: Option<String>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,

        #[arg(long, help = "Log process memory and CPU after each phase")]
        pub monitor: bool,

        /// Read and clean the sheets without writing anything
        #[arg(long)]
        pub dry_run: bool,
    }

    impl CliConfig {
        fn formats(&self) -> Vec<String> {
            if self.format.is_empty() {
                vec!["json".to_string()]
            } else {
                self.format.iter().map(|f| f.trim().to_ascii_lowercase()).collect()
            }
        }

        /// 命令列參數覆蓋 TOML 設定
        pub fn apply_overrides(&self, config: &mut TomlConfig) {
            if let Some(observations) = &self.observations {
                config.sources.observations = observations.clone();
            }
            if let Some(sites) = &self.sites {
                config.sources.sites = sites.clone();
            }
            if let Some(delimiter) = &self.delimiter {
                config.sources.delimiter = delimiter.clone();
            }
            if let Some(output_path) = &self.output_path {
                config.export.output_path = output_path.clone();
            }
            if !self.format.is_empty() {
                config.export.output_formats = self.formats();
            }
            if let Some(bundle) = &self.bundle {
                config.export.bundle = Some(super::toml_config::BundleConfig {
                    enabled: true,
                    filename: bundle.clone(),
                });
            }
            if let Some(seed) = self.shuffle_seed {
                config.curation.shuffle_seed = Some(seed);
            }
            if self.normalize_time {
                config.curation.normalize_time = true;
            }
            if let Some(count) = self.drop_site_columns {
                config.curation.drop_trailing_site_columns = count;
            }
            if self.monitor {
                let monitoring = config
                    .monitoring
                    .get_or_insert(super::toml_config::MonitoringConfig { enabled: true });
                monitoring.enabled = true;
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn observations_file(&self) -> &str {
            self.observations.as_deref().unwrap_or_default()
        }

        fn sites_file(&self) -> &str {
            self.sites.as_deref().unwrap_or_default()
        }

        fn delimiter(&self) -> u8 {
            self.delimiter
                .as_deref()
                .and_then(|d| validate_delimiter("delimiter", d).ok())
                .unwrap_or(b',')
        }

        fn curation(&self) -> CurationOptions {
            CurationOptions {
                drop_trailing_site_columns: self.drop_site_columns.unwrap_or(0),
                normalize_time: self.normalize_time,
                shuffle_seed: self.shuffle_seed,
            }
        }

        fn export(&self) -> ExportOptions {
            let defaults = ExportOptions::default();
            ExportOptions {
                output_path: self.output_path.clone().unwrap_or(defaults.output_path),
                formats: self
                    .formats()
                    .iter()
                    .filter_map(|f| ExportFormat::parse(f).ok())
                    .collect(),
                bundle: self.bundle.clone(),
                ..defaults
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            let observations = validate_required_field("observations", &self.observations)?;
            let sites = validate_required_field("sites", &self.sites)?;
            validate_path("observations", observations)?;
            validate_path("sites", sites)?;
            validate_file_extensions(
                "observations/sites",
                &[observations.as_str(), sites.as_str()],
                INPUT_EXTENSIONS,
            )?;

            if let Some(delimiter) = &self.delimiter {
                validate_delimiter("delimiter", delimiter)?;
            }
            if let Some(count) = self.drop_site_columns {
                validate_range("drop_site_columns", count, 0, MAX_DROPPED_SITE_COLUMNS)?;
            }
            if let Some(output_path) = &self.output_path {
                validate_path("output_path", output_path)?;
            }
            validate_output_formats("format", &self.formats())?;
            if let Some(bundle) = &self.bundle {
                validate_file_extensions("bundle", &[bundle.as_str()], &["zip"])?;
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::utils::error::CurateError;

        fn parse(args: &[&str]) -> CliConfig {
            CliConfig::try_parse_from(std::iter::once("mpa-curate").chain(args.iter().copied()))
                .unwrap()
        }

        #[test]
        fn test_cli_defaults() {
            let config = parse(&["--observations", "fish.csv", "--sites", "site.csv"]);
            config.validate().unwrap();

            assert_eq!(config.observations_file(), "fish.csv");
            assert_eq!(config.delimiter(), b',');
            assert_eq!(config.curation(), CurationOptions::default());
            assert_eq!(config.export(), ExportOptions::default());
        }

        #[test]
        fn test_cli_flags() {
            let config = parse(&[
                "--observations",
                "fish.csv",
                "--sites",
                "site.csv",
                "--format",
                "json,CSV",
                "--bundle",
                "curated.zip",
                "--shuffle-seed",
                "7",
                "--normalize-time",
                "--drop-site-columns",
                "2",
                "--delimiter",
                ";",
            ]);
            config.validate().unwrap();

            assert_eq!(config.delimiter(), b';');
            let curation = config.curation();
            assert_eq!(curation.shuffle_seed, Some(7));
            assert!(curation.normalize_time);
            assert_eq!(curation.drop_trailing_site_columns, 2);

            let export = config.export();
            assert_eq!(export.formats, vec![ExportFormat::Json, ExportFormat::Csv]);
            assert_eq!(export.bundle.as_deref(), Some("curated.zip"));
        }

        #[test]
        fn test_missing_inputs_fail_validation() {
            let config = parse(&["--sites", "site.csv"]);
            match config.validate() {
                Err(CurateError::MissingConfigError { field }) => assert_eq!(field, "observations"),
                other => panic!("expected MissingConfigError, got {:?}", other),
            }
        }

        #[test]
        fn test_bad_values_fail_validation() {
            let base = ["--observations", "fish.csv", "--sites", "site.csv"];

            let mut args = base.to_vec();
            args.extend(["--format", "parquet"]);
            assert!(parse(&args).validate().is_err());

            let mut args = base.to_vec();
            args.extend(["--bundle", "out.tar"]);
            assert!(parse(&args).validate().is_err());

            let mut args = base.to_vec();
            args.extend(["--delimiter", "::"]);
            assert!(parse(&args).validate().is_err());

            let mut args = base.to_vec();
            args.extend(["--drop-site-columns", "9"]);
            assert!(parse(&args).validate().is_err());
        }

        #[test]
        fn test_overrides_replace_toml_values() {
            let mut toml = TomlConfig::from_toml_str(
                r#"
[pipeline]
name = "survey"

[sources]
observations = "fish.csv"
sites = "site.csv"

[export]
output_path = "./from-toml"
"#,
            )
            .unwrap();

            let cli = parse(&[
                "--config",
                "curate.toml",
                "--output-path",
                "./from-cli",
                "--bundle",
                "all.zip",
                "--monitor",
            ]);
            cli.apply_overrides(&mut toml);

            assert_eq!(toml.observations_file(), "fish.csv");
            assert_eq!(toml.export().output_path, "./from-cli");
            assert_eq!(toml.export().bundle.as_deref(), Some("all.zip"));
            assert!(toml.monitoring_enabled());
            assert_eq!(toml.export().formats, vec![ExportFormat::Json]);
        }
    }
}
