use crate::domain::model::{Cell, Table};
use crate::utils::error::Result;
use chrono::{NaiveDate, NaiveDateTime};

/// Timestamp layout of date cells in the site sheet export.
pub const SURVEY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date part of a `YYYY-MM-DD HH:MM:SS` timestamp; `None` when it does not parse.
pub fn parse_survey_date(text: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(text.trim(), SURVEY_TIMESTAMP_FORMAT)
        .map(|dt| dt.date())
        .ok()
}

/// `H.MM` -> `HH:MM`. Anything that is not two dot-separated integers is
/// returned unchanged.
pub fn normalize_time(text: &str) -> String {
    let parts: Vec<&str> = text.trim().split('.').collect();
    if let [hour, minute] = parts.as_slice() {
        if let (Ok(hour), Ok(minute)) = (hour.parse::<u32>(), minute.parse::<u32>()) {
            return format!("{:02}:{:02}", hour, minute);
        }
    }
    text.to_string()
}

pub fn parse_date_column(table: Table, column: &str) -> Result<Table> {
    let mut unparsed = 0usize;
    let table = table.map_column(column, |row, cell| {
        Ok(match cell {
            Cell::Text(text) => match parse_survey_date(text) {
                Some(date) => Cell::Date(date),
                None => {
                    if !cell.is_missing() {
                        tracing::debug!("{} row {}: '{}' is not a timestamp", column, row, text);
                        unparsed += 1;
                    }
                    Cell::Missing
                }
            },
            Cell::Date(date) => Cell::Date(*date),
            _ => Cell::Missing,
        })
    })?;

    if unparsed > 0 {
        tracing::info!("{} values in '{}' could not be parsed as dates", unparsed, column);
    }
    Ok(table)
}

pub fn normalize_time_column(table: Table, column: &str) -> Result<Table> {
    table.map_column(column, |_, cell| {
        Ok(match cell {
            Cell::Text(text) => Cell::Text(normalize_time(text)),
            other => other.clone(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_survey_date() {
        assert_eq!(
            parse_survey_date("2023-05-14 00:00:00"),
            NaiveDate::from_ymd_opt(2023, 5, 14)
        );
        assert_eq!(
            parse_survey_date("2023-05-14 09:41:07"),
            NaiveDate::from_ymd_opt(2023, 5, 14)
        );
        assert_eq!(parse_survey_date("14/05/2023"), None);
        assert_eq!(parse_survey_date("2023-05-14"), None);
        assert_eq!(parse_survey_date("n/a"), None);
        assert_eq!(parse_survey_date("2023-02-30 00:00:00"), None);
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("9.30"), "09:30");
        assert_eq!(normalize_time("14.05"), "14:05");
        assert_eq!(normalize_time("9.5"), "09:05");
        assert_eq!(normalize_time("09:30"), "09:30");
        assert_eq!(normalize_time("9.30.15"), "9.30.15");
        assert_eq!(normalize_time("n/a"), "n/a");
        assert_eq!(normalize_time("a.b"), "a.b");
    }

    #[test]
    fn test_date_column() {
        let table = Table::from_text_rows(
            "sites",
            &["date_of_survey"],
            &[&["2022-11-02 00:00:00"], &["soon"], &[""]],
        );
        let table = parse_date_column(table, "date_of_survey").unwrap();
        assert_eq!(
            table.cell(0, 0),
            &Cell::Date(NaiveDate::from_ymd_opt(2022, 11, 2).unwrap())
        );
        assert_eq!(table.cell(1, 0), &Cell::Missing);
        assert_eq!(table.cell(2, 0), &Cell::Missing);
    }
}
