pub mod pipelines;

pub use pipelines::curate_pipeline::CuratePipeline;
