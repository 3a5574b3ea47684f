use super::{float_at, present_columns, required_int_at, text_at, Columns};
use crate::core::pipeline::TablePipeline;
use crate::domain::model::{Observation, Table};
use crate::transform::header::{normalize_headers, HeaderStyle};
use crate::transform::numeric::{cast_integer_columns, parse_numeric_columns};
use crate::utils::error::Result;

/// 觀測表的數值欄位（逗號小數）
pub const FLOAT_COLUMNS: &[&str] = &[
    "size_(cm)",
    "ind_weight_(kg)",
    "density_(n/ha)",
    "biomass_(kg/ha)",
];

/// Transect geometry columns; older sheets do not carry them.
pub const OPTIONAL_FLOAT_COLUMNS: &[&str] = &["depth_(m)", "area_(m2)"];

pub const INTEGER_COLUMNS: &[&str] = &[
    "year",
    "month",
    "transect",
    "size_(cm)",
    "number_individu_(n)",
];

fn numeric_columns(table: &Table) -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = FLOAT_COLUMNS.to_vec();
    columns.extend(present_columns(table, OPTIONAL_FLOAT_COLUMNS));
    for column in INTEGER_COLUMNS {
        if !columns.contains(column) {
            columns.push(*column);
        }
    }
    columns
}

/// normalize headers -> parse numerics -> cast integers
pub fn observation_pipeline() -> TablePipeline {
    TablePipeline::new("observations")
        .step("normalize_headers", |t| {
            normalize_headers(t, HeaderStyle::Underscore)
        })
        .step("parse_numeric", |t| {
            let columns = numeric_columns(&t);
            parse_numeric_columns(t, &columns)
        })
        .step("cast_integers", |t| cast_integer_columns(t, INTEGER_COLUMNS))
}

/// Turn a cleaned observation table into records.
pub fn observations_from_table(table: &Table) -> Result<Vec<Observation>> {
    let cols = Columns::new(table);
    let sea_site_id = cols.required("sea_site_id")?;
    let site_name = cols.required("site_name")?;
    let year = cols.required("year")?;
    let month = cols.required("month")?;
    let transect = cols.required("transect")?;
    let species = cols.required("species")?;
    let family = cols.required("family")?;
    let trophic = cols.required("trophic")?;
    let size = cols.required("size_(cm)")?;
    let weight = cols.required("ind_weight_(kg)")?;
    let count = cols.required("number_individu_(n)")?;
    let density = cols.required("density_(n/ha)")?;
    let biomass = cols.required("biomass_(kg/ha)")?;
    let protection = cols.required("control/mpa")?;
    let depth = cols.optional("depth_(m)");
    let area = cols.optional("area_(m2)");

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let row_no = i + 1;
            Ok(Observation {
                sea_site_id: text_at(row, sea_site_id),
                site_name: text_at(row, site_name),
                year: required_int_at(row, year, "year", row_no)?,
                month: required_int_at(row, month, "month", row_no)?,
                transect: required_int_at(row, transect, "transect", row_no)?,
                species: text_at(row, species),
                family: text_at(row, family),
                trophic: text_at(row, trophic),
                depth_m: float_at(row, depth),
                area_m2: float_at(row, area),
                size_cm: required_int_at(row, size, "size_(cm)", row_no)?,
                ind_weight_kg: float_at(row, Some(weight)),
                count: required_int_at(row, count, "number_individu_(n)", row_no)?,
                density: float_at(row, Some(density)),
                biomass: float_at(row, Some(biomass)),
                protection: text_at(row, protection),
            })
        })
        .collect()
}
