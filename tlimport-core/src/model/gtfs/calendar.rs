use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::model::{EntityError, EntityRecord, EntityStatus};
use crate::util::date_codec;

/// calendar.txt. calendars created from calendar_dates.txt alone are marked
/// as `generated` and have no active weekdays.
#[derive(Debug, Clone, Serialize)]
pub struct Calendar {
    pub service_id: String,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    #[serde(serialize_with = "date_codec::serialize_naive_date")]
    pub start_date: NaiveDate,
    #[serde(serialize_with = "date_codec::serialize_naive_date")]
    pub end_date: NaiveDate,
    pub generated: bool,
    #[serde(skip)]
    pub status: EntityStatus,
}

impl Calendar {
    pub const FILENAME: &'static str = "calendar.txt";

    /// an empty calendar spanning a single date, used when a service_id
    /// only appears in calendar_dates.txt.
    pub fn generated(service_id: &str, date: NaiveDate) -> Calendar {
        Calendar {
            service_id: service_id.to_string(),
            monday: false,
            tuesday: false,
            wednesday: false,
            thursday: false,
            friday: false,
            saturday: false,
            sunday: false,
            start_date: date,
            end_date: date,
            generated: true,
            status: EntityStatus::default(),
        }
    }

    pub fn runs_on_weekday(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    /// true if the date falls within the calendar range on an active weekday.
    /// does not consider calendar_dates.txt exceptions.
    pub fn runs_on(&self, date: &NaiveDate) -> bool {
        self.start_date <= *date && *date <= self.end_date && self.runs_on_weekday(date.weekday())
    }

    /// widens the date range to include this date.
    pub fn expand_to(&mut self, date: NaiveDate) {
        self.start_date = self.start_date.min(date);
        self.end_date = self.end_date.max(date);
    }
}

impl EntityRecord for Calendar {
    fn filename(&self) -> &'static str {
        Calendar::FILENAME
    }

    fn entity_id(&self) -> &str {
        &self.service_id
    }

    fn status(&self) -> Option<&EntityStatus> {
        Some(&self.status)
    }

    fn status_mut(&mut self) -> Option<&mut EntityStatus> {
        Some(&mut self.status)
    }

    fn validate(&self) -> Vec<EntityError> {
        let mut errors = vec![];
        super::require(&mut errors, "service_id", &self.service_id);
        if self.end_date < self.start_date {
            errors.push(EntityError::invalid(
                "end_date",
                self.end_date.format(date_codec::GTFS_DATE_FORMAT),
                "end_date is before start_date",
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_on_weekday_within_range() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap_or_default(); // monday
        let mut calendar = Calendar::generated("weekday", start);
        calendar.monday = true;
        calendar.end_date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap_or_default();
        assert!(calendar.runs_on(&NaiveDate::from_ymd_opt(2024, 3, 11).unwrap_or_default()));
        assert!(!calendar.runs_on(&NaiveDate::from_ymd_opt(2024, 3, 12).unwrap_or_default()));
        assert!(!calendar.runs_on(&NaiveDate::from_ymd_opt(2024, 4, 1).unwrap_or_default()));
    }

    #[test]
    fn test_expand_to() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap_or_default();
        let d0 = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap_or_default();
        let mut calendar = Calendar::generated("x", d1);
        calendar.expand_to(d0);
        assert_eq!(calendar.start_date, d0);
        assert_eq!(calendar.end_date, d1);
        assert!(calendar.validate().is_empty());
    }
}
