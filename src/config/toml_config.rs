use crate::core::ConfigProvider;
use crate::domain::model::{CurationOptions, ExportFormat, ExportOptions, MAX_DROPPED_SITE_COLUMNS};
use crate::utils::error::{CurateError, Result};
use crate::utils::validation::{
    validate_delimiter, validate_file_extensions, validate_non_empty_string,
    validate_output_formats, validate_path, validate_range, Validate,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 允許的輸入檔副檔名
pub const INPUT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub curation: CurationOptions,
    #[serde(default)]
    pub export: ExportConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub observations: String,
    pub sites: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    pub bundle: Option<BundleConfig>,
    pub filenames: Option<FilenameConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilenameConfig {
    pub observations: Option<String>,
    pub sites: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_output_path() -> String {
    ExportOptions::default().output_path
}

fn default_output_formats() -> Vec<String> {
    vec!["json".to_string()]
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            output_formats: default_output_formats(),
            bundle: None,
            filenames: None,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CurateError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CurateError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數原樣保留
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        validate_path("sources.observations", &self.sources.observations)?;
        validate_path("sources.sites", &self.sources.sites)?;
        validate_file_extensions(
            "sources",
            &[self.sources.observations.as_str(), self.sources.sites.as_str()],
            INPUT_EXTENSIONS,
        )?;
        validate_delimiter("sources.delimiter", &self.sources.delimiter)?;

        validate_range(
            "curation.drop_trailing_site_columns",
            self.curation.drop_trailing_site_columns,
            0,
            MAX_DROPPED_SITE_COLUMNS,
        )?;

        validate_path("export.output_path", &self.export.output_path)?;
        validate_output_formats("export.output_formats", &self.export.output_formats)?;

        if let Some(bundle) = self.export.bundle.as_ref().filter(|b| b.enabled) {
            validate_file_extensions("export.bundle.filename", &[bundle.filename.as_str()], &["zip"])?;
        }
        if let Some(names) = &self.export.filenames {
            for (field, name) in [
                ("export.filenames.observations", &names.observations),
                ("export.filenames.sites", &names.sites),
            ] {
                if let Some(name) = name {
                    validate_non_empty_string(field, name)?;
                }
            }
        }

        Ok(())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn bundle_name(&self) -> Option<&str> {
        self.export
            .bundle
            .as_ref()
            .filter(|b| b.enabled)
            .map(|b| b.filename.as_str())
    }
}

impl ConfigProvider for TomlConfig {
    fn observations_file(&self) -> &str {
        &self.sources.observations
    }

    fn sites_file(&self) -> &str {
        &self.sources.sites
    }

    fn delimiter(&self) -> u8 {
        validate_delimiter("sources.delimiter", &self.sources.delimiter).unwrap_or(b',')
    }

    fn curation(&self) -> CurationOptions {
        self.curation.clone()
    }

    fn export(&self) -> ExportOptions {
        let defaults = ExportOptions::default();
        let names = self.export.filenames.as_ref();

        ExportOptions {
            output_path: self.export.output_path.clone(),
            formats: self
                .export
                .output_formats
                .iter()
                .filter_map(|f| ExportFormat::parse(f).ok())
                .collect(),
            bundle: self.bundle_name().map(str::to_string),
            observations_name: names
                .and_then(|n| n.observations.clone())
                .unwrap_or(defaults.observations_name),
            sites_name: names
                .and_then(|n| n.sites.clone())
                .unwrap_or(defaults.sites_name),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL: &str = r#"
[pipeline]
name = "nusa-penida-2023"
description = "Reef fish survey"
version = "1.0.0"

[sources]
observations = "dataset/mpa_fish.csv"
sites = "dataset/mpa_site.csv"
delimiter = ";"

[curation]
drop_trailing_site_columns = 2
normalize_time = true
shuffle_seed = 42

[export]
output_path = "./curated"
output_formats = ["json", "csv"]

[export.bundle]
enabled = true
filename = "curated.zip"

[export.filenames]
observations = "fish"

[monitoring]
enabled = true
"#;

    const MINIMAL: &str = r#"
[pipeline]
name = "minimal"

[sources]
observations = "fish.csv"
sites = "site.csv"
"#;

    #[test]
    fn test_parse_full_toml_config() {
        let config = TomlConfig::from_toml_str(FULL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.pipeline.name, "nusa-penida-2023");
        assert_eq!(config.delimiter(), b';');
        assert!(config.monitoring_enabled());

        let curation = config.curation();
        assert_eq!(curation.drop_trailing_site_columns, 2);
        assert!(curation.normalize_time);
        assert_eq!(curation.shuffle_seed, Some(42));

        let export = config.export();
        assert_eq!(export.output_path, "./curated");
        assert_eq!(export.formats, vec![ExportFormat::Json, ExportFormat::Csv]);
        assert_eq!(export.bundle.as_deref(), Some("curated.zip"));
        assert_eq!(export.observations_name, "fish");
        assert_eq!(export.sites_name, "site_fish");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.delimiter(), b',');
        assert!(!config.monitoring_enabled());
        assert_eq!(config.curation(), CurationOptions::default());
        assert_eq!(config.export(), ExportOptions::default());
    }

    #[test]
    fn test_disabled_bundle_writes_loose_files() {
        let content = format!(
            "{}\n[export]\noutput_formats = [\"csv\"]\n[export.bundle]\nenabled = false\nfilename = \"x.zip\"\n",
            MINIMAL
        );
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.export().bundle, None);
        assert_eq!(config.export().formats, vec![ExportFormat::Csv]);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MPA_CURATE_TEST_DATA_DIR", "/srv/survey");

        let content = MINIMAL.replace("fish.csv", "${MPA_CURATE_TEST_DATA_DIR}/fish.csv");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.observations_file(), "/srv/survey/fish.csv");

        std::env::remove_var("MPA_CURATE_TEST_DATA_DIR");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let content = MINIMAL.replace("site.csv", "${MPA_CURATE_TEST_UNSET}/site.csv");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.sites_file(), "${MPA_CURATE_TEST_UNSET}/site.csv");
    }

    #[test]
    fn test_config_validation() {
        let bad_format = format!("{}\n[export]\noutput_formats = [\"xlsx\"]\n", MINIMAL);
        let config = TomlConfig::from_toml_str(&bad_format).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CurateError::InvalidConfigValueError { .. })
        ));

        let bad_source = MINIMAL.replace("fish.csv", "fish.xlsx");
        let config = TomlConfig::from_toml_str(&bad_source).unwrap();
        assert!(config.validate().is_err());

        let bad_delimiter = MINIMAL.replace("sites = \"site.csv\"", "sites = \"site.csv\"\ndelimiter = \"ab\"");
        let config = TomlConfig::from_toml_str(&bad_delimiter).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dropped_site_columns_limit() {
        let within = format!("{}\n[curation]\ndrop_trailing_site_columns = 8\n", MINIMAL);
        TomlConfig::from_toml_str(&within).unwrap().validate().unwrap();

        let beyond = format!("{}\n[curation]\ndrop_trailing_site_columns = 9\n", MINIMAL);
        match TomlConfig::from_toml_str(&beyond).unwrap().validate() {
            Err(CurateError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "curation.drop_trailing_site_columns")
            }
            other => panic!("expected InvalidConfigValueError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[pipeline\nname = ").unwrap_err();
        assert!(matches!(err, CurateError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "minimal");
    }
}
