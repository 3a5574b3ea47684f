use crate::core::Pipeline;
use crate::domain::model::Dataset;
use crate::utils::error::Result;
use crate::utils::monitor::PhaseMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor_enabled: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor_enabled,
        }
    }

    pub fn run(&self) -> Result<String> {
        let mut monitor = PhaseMonitor::new(self.monitor_enabled);
        tracing::info!("Starting curation run");

        let dataset = self.extract_and_transform(&mut monitor)?;

        tracing::info!("Exporting curated tables...");
        let output_path = self.pipeline.load(&dataset)?;
        monitor.log_phase("load");
        tracing::info!("Output saved to: {}", output_path);

        monitor.log_final_stats();
        Ok(output_path)
    }

    /// Extract and transform only; nothing is written.
    pub fn dry_run(&self) -> Result<Dataset> {
        let mut monitor = PhaseMonitor::new(self.monitor_enabled);
        let dataset = self.extract_and_transform(&mut monitor)?;
        monitor.log_final_stats();
        Ok(dataset)
    }

    fn extract_and_transform(&self, monitor: &mut PhaseMonitor) -> Result<Dataset> {
        tracing::info!("Reading sheets...");
        let raw = self.pipeline.extract()?;
        tracing::info!(
            "Read {} observation rows and {} site rows",
            raw.observations.len(),
            raw.sites.len()
        );
        monitor.log_phase("extract");

        tracing::info!("Cleaning tables...");
        let dataset = self.pipeline.transform(raw)?;
        monitor.log_phase("transform");

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RawSheets, Table};
    use crate::utils::error::CurateError;
    use std::cell::RefCell;

    struct RecordingPipeline {
        calls: RefCell<Vec<&'static str>>,
        fail_transform: bool,
    }

    impl RecordingPipeline {
        fn new(fail_transform: bool) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_transform,
            }
        }
    }

    impl Pipeline for RecordingPipeline {
        fn extract(&self) -> Result<RawSheets> {
            self.calls.borrow_mut().push("extract");
            Ok(RawSheets {
                observations: Table::from_text_rows("observations", &["a"], &[]),
                sites: Table::from_text_rows("sites", &["b"], &[]),
            })
        }

        fn transform(&self, _raw: RawSheets) -> Result<Dataset> {
            self.calls.borrow_mut().push("transform");
            if self.fail_transform {
                return Err(CurateError::ConfigError {
                    message: "bad sheet".to_string(),
                });
            }
            Ok(Dataset::default())
        }

        fn load(&self, _dataset: &Dataset) -> Result<String> {
            self.calls.borrow_mut().push("load");
            Ok("out".to_string())
        }
    }

    #[test]
    fn test_run_executes_phases_in_order() {
        let engine = EtlEngine::new(RecordingPipeline::new(false));
        assert_eq!(engine.run().unwrap(), "out");
        assert_eq!(
            *engine.pipeline.calls.borrow(),
            vec!["extract", "transform", "load"]
        );
    }

    #[test]
    fn test_transform_failure_skips_load() {
        let engine = EtlEngine::new(RecordingPipeline::new(true));
        assert!(engine.run().is_err());
        assert_eq!(*engine.pipeline.calls.borrow(), vec!["extract", "transform"]);
    }

    #[test]
    fn test_dry_run_never_loads() {
        let engine = EtlEngine::new(RecordingPipeline::new(false));
        engine.dry_run().unwrap();
        assert_eq!(*engine.pipeline.calls.borrow(), vec!["extract", "transform"]);
    }
}
