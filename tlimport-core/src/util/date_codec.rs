//! codecs for dates read from and written to a GTFS archive, which use
//! yyyymmdd format.
use chrono::NaiveDate;
use serde::Serializer;

pub const GTFS_DATE_FORMAT: &str = "%Y%m%d";

/// parses a GTFS date, returning None for empty or malformed values.
pub fn parse_gtfs_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), GTFS_DATE_FORMAT).ok()
}

pub fn serialize_naive_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format(GTFS_DATE_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gtfs_date() {
        assert_eq!(
            parse_gtfs_date("20240301"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_gtfs_date("2024-03-01"), None);
        assert_eq!(parse_gtfs_date(""), None);
    }
}
