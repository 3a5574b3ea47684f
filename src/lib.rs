pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod transform;
pub mod utils;

pub use app::CuratePipeline;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{dataset::load_dataset, etl::EtlEngine};
pub use domain::model::{CurationOptions, Dataset, ExportFormat, ExportOptions, Observation, Site};
pub use report::{Filter, FilterOptions, Report};
pub use utils::error::{CurateError, Result};
