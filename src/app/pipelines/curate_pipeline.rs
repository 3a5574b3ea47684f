use crate::core::export::export_dataset;
use crate::core::{ConfigProvider, Dataset, Pipeline, RawSheets, Storage, Table};
use crate::utils::error::Result;

/// Reads both sheets through `Storage`, cleans them, and exports the result.
pub struct CuratePipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ConfigProvider> CuratePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn read_sheet(&self, name: &str, path: &str) -> Result<Table> {
        tracing::debug!("Reading {} sheet from {}", name, path);
        let bytes = self.storage.read_file(path)?;
        Table::from_csv_reader(name, bytes.as_slice(), self.config.delimiter())
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for CuratePipeline<S, C> {
    fn extract(&self) -> Result<RawSheets> {
        let observations = self.read_sheet("observations", self.config.observations_file())?;
        let sites = self.read_sheet("sites", self.config.sites_file())?;
        Ok(RawSheets {
            observations,
            sites,
        })
    }

    fn transform(&self, raw: RawSheets) -> Result<Dataset> {
        Dataset::from_tables(raw.observations, raw.sites, &self.config.curation())
    }

    fn load(&self, dataset: &Dataset) -> Result<String> {
        let options = self.config.export();
        tracing::debug!(
            "Exporting {:?} to {} (bundle: {:?})",
            options.formats,
            options.output_path,
            options.bundle
        );
        match self.config.curation().shuffle_seed {
            Some(seed) => {
                tracing::info!("🔀 Shuffling exported columns (seed {})", seed);
                export_dataset(&self.storage, &dataset.anonymized(seed)?, &options)
            }
            None => export_dataset(&self.storage, dataset, &options),
        }
    }
}
