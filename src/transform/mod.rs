pub mod coordinate;
pub mod datetime;
pub mod header;
pub mod numeric;
pub mod shuffle;

pub use coordinate::{convert_coordinate, Axis};
pub use datetime::{normalize_time, parse_survey_date};
pub use header::{normalize_header, normalize_headers, HeaderStyle};
pub use numeric::parse_decimal;
pub use shuffle::shuffle_records;
