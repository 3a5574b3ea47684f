use crate::domain::model::Table;
use crate::utils::error::Result;

type StepFn = Box<dyn Fn(Table) -> Result<Table>>;

struct Step {
    name: &'static str,
    run: StepFn,
}

/// 依序執行的表格轉換步驟
///
/// Steps run in the order they were added. The first failing step stops the
/// run and its error is returned; no half-cleaned table leaves `run`.
pub struct TablePipeline {
    name: String,
    steps: Vec<Step>,
}

impl TablePipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn step<F>(mut self, name: &'static str, run: F) -> Self
    where
        F: Fn(Table) -> Result<Table> + 'static,
    {
        self.steps.push(Step {
            name,
            run: Box::new(run),
        });
        self
    }

    /// Add a step only when `enabled`.
    pub fn step_if<F>(self, enabled: bool, name: &'static str, run: F) -> Self
    where
        F: Fn(Table) -> Result<Table> + 'static,
    {
        if enabled {
            self.step(name, run)
        } else {
            self
        }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    pub fn run(&self, table: Table) -> Result<Table> {
        tracing::debug!(
            "Running {} pipeline ({} steps) on {} rows",
            self.name,
            self.steps.len(),
            table.len()
        );

        let mut table = table;
        for step in &self.steps {
            table = (step.run)(table).map_err(|e| {
                tracing::error!("❌ {} pipeline failed at step '{}': {}", self.name, step.name, e);
                e
            })?;
            tracing::debug!("✓ {}: {}", self.name, step.name);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Cell;
    use crate::utils::error::CurateError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn table() -> Table {
        Table::from_text_rows("t", &["a"], &[&["1"]])
    }

    #[test]
    fn test_steps_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (first, second) = (log.clone(), log.clone());

        let pipeline = TablePipeline::new("test")
            .step("first", move |t| {
                first.borrow_mut().push("first");
                Ok(t)
            })
            .step("second", move |t| {
                second.borrow_mut().push("second");
                t.map_column("a", |_, _| Ok(Cell::Int(2)))
            });

        assert_eq!(pipeline.step_names(), vec!["first", "second"]);
        let out = pipeline.run(table()).unwrap();
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(out.cell(0, 0), &Cell::Int(2));
    }

    #[test]
    fn test_failure_stops_later_steps() {
        let ran_after = Rc::new(RefCell::new(false));
        let flag = ran_after.clone();

        let pipeline = TablePipeline::new("test")
            .step("fails", |_| {
                Err(CurateError::ConfigError {
                    message: "boom".to_string(),
                })
            })
            .step("after", move |t| {
                *flag.borrow_mut() = true;
                Ok(t)
            });

        assert!(pipeline.run(table()).is_err());
        assert!(!*ran_after.borrow());
    }

    #[test]
    fn test_step_if_skips_disabled_steps() {
        let pipeline = TablePipeline::new("test")
            .step_if(false, "off", Ok)
            .step_if(true, "on", Ok);
        assert_eq!(pipeline.step_names(), vec!["on"]);
    }
}
