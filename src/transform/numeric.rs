use crate::domain::model::{Cell, Table, MISSING_SENTINEL};
use crate::utils::error::{CurateError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

// 允許逗號或句點作為小數點，不接受 inf / nan 之類的字詞
static NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+([.,]\d*)?|[.,]\d+)$").expect("valid regex"));

/// Parse a comma-decimal numeral (`"12,5"` -> `12.5`). Period decimals are
/// accepted too. The sentinel or an empty string is `None`; anything else
/// that is not a numeral is an error.
pub fn parse_decimal(text: &str) -> std::result::Result<Option<f64>, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(MISSING_SENTINEL) {
        return Ok(None);
    }
    if !NUMERAL.is_match(trimmed) {
        return Err(trimmed.to_string());
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| trimmed.to_string())
}

/// Whole-number value of `value`, if it has no fractional part.
pub fn as_integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Strict parse of the named text columns to `Float` (or `Missing`).
/// A token that is neither a numeral nor the sentinel aborts with `ParseError`.
pub fn parse_numeric_columns(table: Table, columns: &[&str]) -> Result<Table> {
    columns.iter().try_fold(table, |table, &column| {
        table.map_column(column, |row, cell| match cell {
            Cell::Text(text) => match parse_decimal(text) {
                Ok(Some(v)) => Ok(Cell::Float(v)),
                Ok(None) => Ok(Cell::Missing),
                Err(value) => Err(CurateError::ParseError {
                    column: column.to_string(),
                    row,
                    value,
                }),
            },
            other => Ok(other.clone()),
        })
    })
}

/// Cast the named columns to `Int`. Values must already be numeric (see
/// [`parse_numeric_columns`]); a missing or non-integral value is a `SchemaError`.
pub fn cast_integer_columns(table: Table, columns: &[&str]) -> Result<Table> {
    columns.iter().try_fold(table, |table, &column| {
        table.map_column(column, |row, cell| {
            let schema_error = |message: String| CurateError::SchemaError {
                column: column.to_string(),
                row,
                message,
            };
            match cell {
                Cell::Int(v) => Ok(Cell::Int(*v)),
                Cell::Float(v) => as_integral(*v)
                    .map(Cell::Int)
                    .ok_or_else(|| schema_error(format!("{} is not a whole number", v))),
                Cell::Missing => Err(schema_error("missing value in integer column".to_string())),
                other => Err(schema_error(format!(
                    "'{}' has not been parsed as a number",
                    other.to_text()
                ))),
            }
        })
    })
}

/// Lenient parse: anything unparseable becomes `Missing`. Used for site
/// measurements that are routinely left blank or annotated by hand.
pub fn coerce_numeric_columns(table: Table, columns: &[&str]) -> Result<Table> {
    columns.iter().try_fold(table, |table, &column| {
        table.map_column(column, |row, cell| {
            Ok(match cell {
                Cell::Text(text) => match parse_decimal(text) {
                    Ok(Some(v)) => Cell::Float(v),
                    Ok(None) => Cell::Missing,
                    Err(value) => {
                        tracing::debug!("{} row {}: '{}' is not numeric", column, row, value);
                        Cell::Missing
                    }
                },
                other => other.clone(),
            })
        })
    })
}

/// Lenient integer parse: unparseable -> `Missing`, but a fractional value is
/// still a `SchemaError` since it cannot be cast without losing data.
pub fn coerce_integer_columns(table: Table, columns: &[&str]) -> Result<Table> {
    let table = coerce_numeric_columns(table, columns)?;
    columns.iter().try_fold(table, |table, &column| {
        table.map_column(column, |row, cell| match cell {
            Cell::Float(v) => as_integral(*v).map(Cell::Int).ok_or_else(|| {
                CurateError::SchemaError {
                    column: column.to_string(),
                    row,
                    message: format!("{} is not a whole number", v),
                }
            }),
            other => Ok(other.clone()),
        })
    })
}
