use crate::domain::model::Table;
use crate::utils::error::{CurateError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// How periods in a header are handled. The two sheets were labelled by
/// different people and disagree on this one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// `Ind.Weight` -> `ind_weight` (observation sheet)
    Underscore,
    /// `Dive No.` -> `dive_no` (site sheet)
    Strip,
}

/// Canonical column label: whitespace runs become `_`, commas go, periods
/// are replaced or stripped according to `style`, then lowercase.
pub fn normalize_header(label: &str, style: HeaderStyle) -> String {
    let label = WHITESPACE.replace_all(label, "_");
    let label = label.replace(',', "");
    let label = match style {
        HeaderStyle::Underscore => label.replace('.', "_"),
        HeaderStyle::Strip => label.replace('.', ""),
    };
    label.to_lowercase()
}

/// Rename every column of `table`. Two labels landing on the same canonical
/// form is a sheet configuration problem and fails the pipeline.
pub fn normalize_headers(table: Table, style: HeaderStyle) -> Result<Table> {
    let mut seen = HashSet::new();
    let mut labels = Vec::with_capacity(table.columns().len());

    for raw in table.columns() {
        let label = normalize_header(raw, style);
        if !seen.insert(label.clone()) {
            return Err(CurateError::HeaderCollision { label });
        }
        if &label != raw {
            tracing::debug!("Header '{}' -> '{}'", raw, label);
        }
        labels.push(label);
    }

    table.with_columns(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_headers() {
        let style = HeaderStyle::Underscore;
        assert_eq!(normalize_header("Sea Site ID", style), "sea_site_id");
        assert_eq!(normalize_header("Size (cm)", style), "size_(cm)");
        assert_eq!(normalize_header("Ind.Weight (kg)", style), "ind_weight_(kg)");
        assert_eq!(normalize_header("Density  (n/ha)", style), "density_(n/ha)");
        assert_eq!(normalize_header("Number Individu (n)", style), "number_individu_(n)");
        assert_eq!(normalize_header("Control/MPA", style), "control/mpa");
    }

    #[test]
    fn test_site_headers_strip_periods() {
        let style = HeaderStyle::Strip;
        assert_eq!(normalize_header("Rec. ID", style), "rec_id");
        assert_eq!(normalize_header("Dive No.", style), "dive_no");
        assert_eq!(normalize_header("Date of Survey", style), "date_of_survey");
        assert_eq!(normalize_header("Lat, Long", style), "lat_long");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let labels = [
            "Sea Site ID",
            "Ind. Weight (kg)",
            "  Depth\t(m) ",
            "A,B.C  D",
            "already_clean",
            "MPA/Control",
            "",
        ];
        for style in [HeaderStyle::Underscore, HeaderStyle::Strip] {
            for label in labels {
                let once = normalize_header(label, style);
                assert_eq!(normalize_header(&once, style), once, "label {:?}", label);
            }
        }
    }

    #[test]
    fn test_collision_is_rejected() {
        let table = Table::from_text_rows("observations", &["Size (cm)", "size  (cm)"], &[]);
        match normalize_headers(table, HeaderStyle::Underscore) {
            Err(CurateError::HeaderCollision { label }) => assert_eq!(label, "size_(cm)"),
            other => panic!("expected HeaderCollision, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_headers_keeps_rows() {
        let table = Table::from_text_rows("sites", &["Site Name", "Dive No."], &[&["Reef", "3"]]);
        let table = normalize_headers(table, HeaderStyle::Strip).unwrap();
        assert_eq!(table.columns(), &["site_name", "dive_no"]);
        assert_eq!(table.len(), 1);
    }
}
