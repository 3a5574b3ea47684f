pub mod dataset;
pub mod etl;
pub mod export;
pub mod pipeline;

pub use crate::domain::model::{Dataset, RawSheets, Table};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
