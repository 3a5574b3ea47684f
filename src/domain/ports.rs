use crate::domain::model::{CurationOptions, Dataset, ExportOptions, RawSheets};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn observations_file(&self) -> &str;
    fn sites_file(&self) -> &str;
    fn delimiter(&self) -> u8;
    fn curation(&self) -> CurationOptions;
    fn export(&self) -> ExportOptions;
}

pub trait Pipeline {
    fn extract(&self) -> Result<RawSheets>;
    fn transform(&self, raw: RawSheets) -> Result<Dataset>;
    fn load(&self, dataset: &Dataset) -> Result<String>;
}
