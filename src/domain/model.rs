use crate::utils::error::{CurateError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;

/// 空白儲存格在原始表格中的替代值
pub const MISSING_SENTINEL: &str = "n/a";

/// A single table cell. Raw sheets hold only `Text`; the cleaning steps
/// turn cells into typed variants column by column.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Float(f64),
    Int(i64),
    Date(NaiveDate),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// `Missing`, or the sentinel still in text form.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Text(s) => s.trim().eq_ignore_ascii_case(MISSING_SENTINEL),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Render the cell back to text, the sentinel standing in for missing values.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Missing => MISSING_SENTINEL.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Float(v) => v.to_string(),
            Cell::Int(v) => v.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// In-memory table: ordered column labels and rows of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, padding short rows with the sentinel and cutting long ones.
    pub fn from_rows(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::text(MISSING_SENTINEL));
                row
            })
            .collect();

        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Build an all-text table the way a sheet is read: empty cells become the sentinel.
    pub fn from_text_rows(name: impl Into<String>, columns: &[&str], rows: &[&[&str]]) -> Self {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|value| raw_cell(value)).collect())
            .collect();
        Self::from_rows(name, columns, rows)
    }

    /// Read a delimited sheet export. Every cell is kept as text.
    pub fn from_csv_reader<R: Read>(name: &str, reader: R, delimiter: u8) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            // 全空白列視為表格尾端的殘留
            if record.iter().all(|value| value.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(raw_cell).collect());
        }

        tracing::debug!(
            "Read {} rows x {} columns from {} sheet",
            rows.len(),
            columns.len(),
            name
        );

        Ok(Self::from_rows(name, columns, rows))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| CurateError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.rows[row][column]
    }

    /// Replace every column label. The label count must not change.
    pub fn with_columns(mut self, columns: Vec<String>) -> Result<Self> {
        if columns.len() != self.columns.len() {
            return Err(CurateError::ConfigError {
                message: format!(
                    "{} table has {} columns but {} labels were supplied",
                    self.name,
                    self.columns.len(),
                    columns.len()
                ),
            });
        }
        self.columns = columns;
        Ok(self)
    }

    /// Rewrite one column cell by cell. `f` receives the 1-based data row number.
    pub fn map_column<F>(mut self, column: &str, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, &Cell) -> Result<Cell>,
    {
        let idx = self.column_index(column)?;
        for (i, row) in self.rows.iter_mut().enumerate() {
            row[idx] = f(i + 1, &row[idx])?;
        }
        Ok(self)
    }

    /// Drop the last `count` columns.
    pub fn drop_trailing_columns(mut self, count: usize) -> Self {
        let keep = self.columns.len().saturating_sub(count);
        self.columns.truncate(keep);
        for row in &mut self.rows {
            row.truncate(keep);
        }
        self
    }
}

fn raw_cell(value: &str) -> Cell {
    if value.trim().is_empty() {
        Cell::text(MISSING_SENTINEL)
    } else {
        Cell::text(value)
    }
}

/// Both sheets as read from storage, before any cleaning.
#[derive(Debug, Clone)]
pub struct RawSheets {
    pub observations: Table,
    pub sites: Table,
}

/// One fish sighting on a transect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub sea_site_id: String,
    pub site_name: String,
    pub year: i64,
    pub month: i64,
    pub transect: i64,
    pub species: String,
    pub family: String,
    pub trophic: String,
    #[serde(rename = "depth_(m)")]
    pub depth_m: Option<f64>,
    #[serde(rename = "area_(m2)")]
    pub area_m2: Option<f64>,
    #[serde(rename = "size_(cm)")]
    pub size_cm: i64,
    #[serde(rename = "ind_weight_(kg)")]
    pub ind_weight_kg: Option<f64>,
    #[serde(rename = "number_individu_(n)")]
    pub count: i64,
    #[serde(rename = "density_(n/ha)")]
    pub density: Option<f64>,
    #[serde(rename = "biomass_(kg/ha)")]
    pub biomass: Option<f64>,
    #[serde(rename = "control/mpa")]
    pub protection: String,
}

/// One dive/survey site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub rec_id: Option<i64>,
    pub dive_no: Option<i64>,
    pub sea_site_id: String,
    pub site_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub slope_angle: Option<f64>,
    pub visibility: Option<f64>,
    pub bleaching: Option<String>,
    pub date_of_survey: Option<NaiveDate>,
    pub time: Option<String>,
    #[serde(rename = "mpa/control")]
    pub protection: String,
    pub mpa: Option<String>,
}

/// The two cleaned tables, immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub observations: Vec<Observation>,
    pub sites: Vec<Site>,
}

impl Dataset {
    pub fn site(&self, sea_site_id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.sea_site_id == sea_site_id)
    }

    /// Observations whose site id has no site record.
    pub fn orphan_observations(&self) -> usize {
        let known: HashSet<&str> = self.sites.iter().map(|s| s.sea_site_id.as_str()).collect();
        self.observations
            .iter()
            .filter(|o| !known.contains(o.sea_site_id.as_str()))
            .count()
    }
}

/// Upper bound for `drop_trailing_site_columns`, well below the thirteen
/// columns of the site sheet.
pub const MAX_DROPPED_SITE_COLUMNS: usize = 8;

/// Knobs for the cleaning steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurationOptions {
    /// Columns cut from the right edge of the site sheet before anything else.
    #[serde(default)]
    pub drop_trailing_site_columns: usize,
    #[serde(default)]
    pub normalize_time: bool,
    /// When set, exports are written with each column permuted independently.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(CurateError::InvalidConfigValueError {
                field: "export.output_formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: json, csv".to_string(),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub output_path: String,
    pub formats: Vec<ExportFormat>,
    /// Zip archive name; `None` writes loose files.
    pub bundle: Option<String>,
    pub observations_name: String,
    pub sites_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            formats: vec![ExportFormat::Json],
            bundle: None,
            observations_name: "observe_fish".to_string(),
            sites_name: "site_fish".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_reader_fills_sentinel_and_pads_rows() {
        let data = "Site,Depth (m),Note\nA1,\"12,5\",\nB2\n,,\n";
        let table = Table::from_csv_reader("observations", data.as_bytes(), b',').unwrap();

        assert_eq!(table.columns(), &["Site", "Depth (m)", "Note"]);
        // 全空白列被略過
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), &Cell::text("12,5"));
        assert_eq!(table.cell(0, 2), &Cell::text(MISSING_SENTINEL));
        assert_eq!(table.cell(1, 1), &Cell::text(MISSING_SENTINEL));
        assert!(table.cell(1, 2).is_missing());
    }

    #[test]
    fn test_csv_reader_with_semicolon_delimiter() {
        let data = "a;b\n1,5;x\n";
        let table = Table::from_csv_reader("sites", data.as_bytes(), b';').unwrap();
        assert_eq!(table.cell(0, 0), &Cell::text("1,5"));
        assert_eq!(table.cell(0, 1), &Cell::text("x"));
    }

    #[test]
    fn test_missing_column_error_names_table() {
        let table = Table::from_text_rows("sites", &["a"], &[&["1"]]);
        match table.column_index("latitude") {
            Err(CurateError::MissingColumn { table, column }) => {
                assert_eq!(table, "sites");
                assert_eq!(column, "latitude");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_drop_trailing_columns() {
        let table = Table::from_text_rows("sites", &["a", "b", "c"], &[&["1", "2", "3"]]);
        let table = table.drop_trailing_columns(2);
        assert_eq!(table.columns(), &["a"]);
        assert_eq!(table.rows()[0], vec![Cell::text("1")]);
    }

    #[test]
    fn test_map_column_reports_one_based_rows() {
        let table = Table::from_text_rows("t", &["a"], &[&["x"], &["y"]]);
        let mut seen = Vec::new();
        table
            .map_column("a", |row, cell| {
                seen.push(row);
                Ok(cell.clone())
            })
            .unwrap();
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!(ExportFormat::parse("JSON").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("csv").unwrap().extension(), "csv");
        assert!(ExportFormat::parse("xlsx").is_err());
    }
}
