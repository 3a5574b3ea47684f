pub mod curate_pipeline;
pub mod observation_pipeline;
pub mod site_pipeline;

use crate::domain::model::{Cell, Table};
use crate::utils::error::{CurateError, Result};

/// The subset of `columns` that `table` actually has.
pub(crate) fn present_columns(table: &Table, columns: &[&'static str]) -> Vec<&'static str> {
    columns
        .iter()
        .copied()
        .filter(|c| table.has_column(c))
        .collect()
}

/// Column lookups for turning a cleaned table into records.
pub(crate) struct Columns<'a> {
    table: &'a Table,
}

impl<'a> Columns<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        Self { table }
    }

    pub(crate) fn required(&self, column: &str) -> Result<usize> {
        self.table.column_index(column)
    }

    pub(crate) fn optional(&self, column: &str) -> Option<usize> {
        self.table.column_index(column).ok()
    }
}

pub(crate) fn text_at(row: &[Cell], idx: usize) -> String {
    row[idx].to_text()
}

pub(crate) fn opt_text_at(row: &[Cell], idx: Option<usize>) -> Option<String> {
    idx.map(|i| row[i].to_text())
}

pub(crate) fn float_at(row: &[Cell], idx: Option<usize>) -> Option<f64> {
    idx.and_then(|i| row[i].as_f64())
}

pub(crate) fn int_at(row: &[Cell], idx: Option<usize>) -> Option<i64> {
    idx.and_then(|i| row[i].as_i64())
}

/// Integer a cast step has already guaranteed; anything else is a schema error.
pub(crate) fn required_int_at(row: &[Cell], idx: usize, column: &str, row_no: usize) -> Result<i64> {
    row[idx].as_i64().ok_or_else(|| CurateError::SchemaError {
        column: column.to_string(),
        row: row_no,
        message: format!("expected an integer, found '{}'", row[idx].to_text()),
    })
}
