use crate::app::pipelines::curate_pipeline::CuratePipeline;
use crate::app::pipelines::observation_pipeline::{observation_pipeline, observations_from_table};
use crate::app::pipelines::site_pipeline::{site_pipeline, sites_from_table};
use crate::domain::model::{CurationOptions, Dataset, Table};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::transform::shuffle::shuffle_records;
use crate::utils::error::Result;

impl Dataset {
    /// Clean both raw tables and type them. Observations are processed
    /// first; if they fail, the site sheet is never touched.
    pub fn from_tables(observations: Table, sites: Table, options: &CurationOptions) -> Result<Self> {
        let cleaned = observation_pipeline().run(observations)?;
        let observations = observations_from_table(&cleaned)?;

        let cleaned = site_pipeline(options).run(sites)?;
        let sites = sites_from_table(&cleaned)?;

        let dataset = Dataset {
            observations,
            sites,
        };

        let orphans = dataset.orphan_observations();
        if orphans > 0 {
            tracing::warn!(
                "⚠️ {} observations reference a site id missing from the site sheet",
                orphans
            );
        }
        tracing::info!(
            "Curated {} observations and {} sites",
            dataset.observations.len(),
            dataset.sites.len()
        );

        Ok(dataset)
    }

    /// A copy with every column permuted independently, for publishing.
    /// The site table uses the next seed so both tables are not reordered alike.
    pub fn anonymized(&self, seed: u64) -> Result<Self> {
        Ok(Dataset {
            observations: shuffle_records(&self.observations, seed)?,
            sites: shuffle_records(&self.sites, seed.wrapping_add(1))?,
        })
    }
}

/// 程式啟動時載入一次資料集，之後以參數傳給使用端
pub fn load_dataset<S: Storage, C: ConfigProvider>(storage: S, config: C) -> Result<Dataset> {
    let pipeline = CuratePipeline::new(storage, config);
    let raw = pipeline.extract()?;
    pipeline.transform(raw)
}
