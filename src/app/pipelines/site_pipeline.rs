use super::{float_at, int_at, opt_text_at, present_columns, text_at, Columns};
use crate::core::pipeline::TablePipeline;
use crate::domain::model::{CurationOptions, Site, Table};
use crate::transform::coordinate::{convert_coordinate_column, Axis};
use crate::transform::datetime::{normalize_time_column, parse_date_column};
use crate::transform::header::{normalize_headers, HeaderStyle};
use crate::transform::numeric::{coerce_integer_columns, coerce_numeric_columns};
use crate::utils::error::Result;

pub const MEASUREMENT_COLUMNS: &[&str] = &["slope_angle", "visibility"];
pub const IDENTIFIER_COLUMNS: &[&str] = &["rec_id", "dive_no"];
pub const DATE_COLUMN: &str = "date_of_survey";
pub const TIME_COLUMN: &str = "time";

/// [drop trailing columns] -> normalize headers -> coordinates ->
/// measurements -> identifiers -> dates -> [time]
pub fn site_pipeline(options: &CurationOptions) -> TablePipeline {
    let trailing = options.drop_trailing_site_columns;

    TablePipeline::new("sites")
        .step_if(trailing > 0, "drop_trailing_columns", move |t| {
            Ok(t.drop_trailing_columns(trailing))
        })
        .step("normalize_headers", |t| normalize_headers(t, HeaderStyle::Strip))
        .step("convert_coordinates", |t| {
            let t = convert_coordinate_column(t, "latitude", Axis::Latitude)?;
            convert_coordinate_column(t, "longitude", Axis::Longitude)
        })
        .step("coerce_measurements", |t| {
            let columns = present_columns(&t, MEASUREMENT_COLUMNS);
            coerce_numeric_columns(t, &columns)
        })
        .step("coerce_identifiers", |t| {
            let columns = present_columns(&t, IDENTIFIER_COLUMNS);
            coerce_integer_columns(t, &columns)
        })
        .step("parse_dates", |t| parse_date_column(t, DATE_COLUMN))
        .step_if(options.normalize_time, "normalize_time", |t| {
            if t.has_column(TIME_COLUMN) {
                normalize_time_column(t, TIME_COLUMN)
            } else {
                tracing::warn!("Time normalization enabled but the site sheet has no time column");
                Ok(t)
            }
        })
}

pub fn sites_from_table(table: &Table) -> Result<Vec<Site>> {
    let cols = Columns::new(table);
    let sea_site_id = cols.required("sea_site_id")?;
    let site_name = cols.required("site_name")?;
    let latitude = cols.required("latitude")?;
    let longitude = cols.required("longitude")?;
    let date = cols.required(DATE_COLUMN)?;
    let protection = cols.required("mpa/control")?;
    let rec_id = cols.optional("rec_id");
    let dive_no = cols.optional("dive_no");
    let slope_angle = cols.optional("slope_angle");
    let visibility = cols.optional("visibility");
    let bleaching = cols.optional("bleaching");
    let time = cols.optional(TIME_COLUMN);
    let mpa = cols.optional("mpa");

    Ok(table
        .rows()
        .iter()
        .map(|row| Site {
            rec_id: int_at(row, rec_id),
            dive_no: int_at(row, dive_no),
            sea_site_id: text_at(row, sea_site_id),
            site_name: text_at(row, site_name),
            latitude: float_at(row, Some(latitude)),
            longitude: float_at(row, Some(longitude)),
            slope_angle: float_at(row, slope_angle),
            visibility: float_at(row, visibility),
            bleaching: opt_text_at(row, bleaching),
            date_of_survey: row[date].as_date(),
            time: opt_text_at(row, time),
            protection: text_at(row, protection),
            mpa: opt_text_at(row, mpa),
        })
        .collect())
}
