//! Latitude/longitude cells come in two shapes: plain decimal degrees
//! (`-8.6512`, `115,2103`) or degrees-minutes-seconds with a hemisphere
//! letter (`8.39.04,3S`, `115°12'37" E`). Both end up as signed decimal
//! degrees; anything else becomes a missing value.

use crate::domain::model::{Cell, Table, MISSING_SENTINEL};
use crate::utils::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));
static HEMISPHERE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[nsew]").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    pub fn limit(&self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }
}

/// Split `text` into numeral tokens. Each token is a run of digits, except
/// that a final run joined to the one before it by a single `.` or `,` is
/// that numeral's fraction, when doing so leaves one token (a decimal) or
/// three (degrees, minutes, fractional seconds). A lone run right after a
/// separator (`.5`, `-,5`) is a fraction of zero degrees, and the returned
/// start then points at that separator so a sign before it still counts.
fn numeral_tokens(text: &str) -> (Vec<String>, Option<usize>) {
    let runs: Vec<_> = DIGIT_RUN.find_iter(text).collect();
    let mut tokens: Vec<String> = runs.iter().map(|m| m.as_str().to_string()).collect();

    if runs.len() == 2 || runs.len() == 4 {
        let prev = runs[runs.len() - 2];
        let last = runs[runs.len() - 1];
        let gap = &text[prev.end()..last.start()];
        if gap == "." || gap == "," {
            tokens.pop();
            if let Some(whole) = tokens.last_mut() {
                whole.push('.');
                whole.push_str(last.as_str());
            }
        }
    }

    let mut start = runs.first().map(|m| m.start());
    if let ([only], Some(at)) = (runs.as_slice(), start) {
        if text[..at].ends_with(|c: char| c == '.' || c == ',') {
            tokens[0] = format!("0.{}", only.as_str());
            start = Some(at - 1);
        }
    }

    (tokens, start)
}

/// Convert a coordinate string to signed decimal degrees.
///
/// One numeral is read as decimal degrees; three are degrees, minutes and
/// seconds (`deg + min/60 + sec/3600`). A south or west hemisphere letter
/// makes the result negative. Every other shape is `None`, never an error.
pub fn convert_coordinate(text: &str) -> Option<f64> {
    let text = text.trim().to_lowercase();
    if text.is_empty() || text == MISSING_SENTINEL || text == "nan" {
        return None;
    }

    let (tokens, first_digit) = numeral_tokens(&text);
    let southern_or_western = HEMISPHERE
        .find_iter(&text)
        .last()
        .map(|m| matches!(m.as_str(), "s" | "w"))
        .unwrap_or(false);

    let magnitude = match tokens.as_slice() {
        [decimal] => {
            let value: f64 = decimal.parse().ok()?;
            let negative = first_digit
                .map(|start| text[..start].trim_end().ends_with('-'))
                .unwrap_or(false);
            if negative {
                -value
            } else {
                value
            }
        }
        [degrees, minutes, seconds] => {
            let degrees: f64 = degrees.parse().ok()?;
            let minutes: f64 = minutes.parse().ok()?;
            let seconds: f64 = seconds.parse().ok()?;
            degrees + minutes / 60.0 + seconds / 3600.0
        }
        _ => {
            tracing::debug!(
                "Coordinate '{}' has {} numeral tokens, treating as missing",
                text,
                tokens.len()
            );
            return None;
        }
    };

    if southern_or_western {
        Some(-magnitude.abs())
    } else {
        Some(magnitude)
    }
}

/// Keep `value` only when it lies inside the axis range.
pub fn within_axis(value: f64, axis: Axis) -> Option<f64> {
    if value.abs() <= axis.limit() {
        Some(value)
    } else {
        None
    }
}

/// Convert one coordinate column in place. Unconvertible or out-of-range
/// values become `Missing`.
pub fn convert_coordinate_column(table: Table, column: &str, axis: Axis) -> Result<Table> {
    let mut dropped = 0usize;
    let table = table.map_column(column, |row, cell| {
        let converted = match cell {
            Cell::Text(text) => {
                let value = convert_coordinate(text);
                let bounded = value.and_then(|v| within_axis(v, axis));
                if value.is_some() && bounded.is_none() {
                    tracing::warn!("{} row {}: '{}' is out of range", column, row, text);
                }
                if bounded.is_none() && !cell.is_missing() {
                    dropped += 1;
                }
                bounded
            }
            Cell::Float(v) => within_axis(*v, axis),
            _ => None,
        };
        Ok(converted.map(Cell::Float).unwrap_or(Cell::Missing))
    })?;

    if dropped > 0 {
        tracing::info!("{} values in '{}' could not be converted", dropped, column);
    }
    Ok(table)
}
