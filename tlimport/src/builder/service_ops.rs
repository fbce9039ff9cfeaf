use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use tlimport_core::model::gtfs::{Calendar, ExceptionType};

/// number of days, from the start of a service's validity window, that are
/// expanded into concrete service dates.
pub const SERVICE_WINDOW_DAYS: u32 = 30;

/// day-of-week categories used to summarize a schedule.
pub const WEEKDAY: i32 = 1;
pub const SATURDAY: i32 = 6;
pub const SUNDAY: i32 = 7;

pub fn dow_category(date: &NaiveDate) -> i32 {
    match date.weekday() {
        Weekday::Sat => SATURDAY,
        Weekday::Sun => SUNDAY,
        _ => WEEKDAY,
    }
}

/// the dates a service runs within the first `days` days of its validity
/// window. the window starts at the calendar start date, or at the earliest
/// exception when there is no calendar. weekdays of the calendar are
/// expanded first, then added and removed exceptions are applied.
pub fn service_dates(
    calendar: Option<&Calendar>,
    exceptions: &[(NaiveDate, ExceptionType)],
    days: u32,
) -> BTreeSet<NaiveDate> {
    let window_start = match calendar {
        Some(c) => c.start_date,
        None => match exceptions.iter().map(|(d, _)| *d).min() {
            Some(d) => d,
            None => return BTreeSet::new(),
        },
    };
    let in_window = |date: &NaiveDate| {
        *date >= window_start && date.signed_duration_since(window_start).num_days() < i64::from(days)
    };

    let mut dates: BTreeSet<NaiveDate> = match calendar {
        Some(c) => window_start
            .iter_days()
            .take(days as usize)
            .take_while(|d| *d <= c.end_date)
            .filter(|d| c.runs_on(d))
            .collect(),
        None => BTreeSet::new(),
    };
    for (date, exception) in exceptions {
        if !in_window(date) {
            continue;
        }
        match exception {
            ExceptionType::Added => {
                dates.insert(*date);
            }
            ExceptionType::Removed => {
                dates.remove(date);
            }
        }
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_weekdays_limited_to_window() {
        // 2024-03-04 is a monday
        let mut calendar = Calendar::generated("wk", date(2024, 3, 4));
        calendar.monday = true;
        calendar.end_date = date(2024, 12, 31);
        let dates = service_dates(Some(&calendar), &[], SERVICE_WINDOW_DAYS);
        assert_eq!(
            dates.into_iter().collect::<Vec<_>>(),
            vec![date(2024, 3, 4), date(2024, 3, 11), date(2024, 3, 18), date(2024, 3, 25), date(2024, 4, 1)]
        );
    }

    #[test]
    fn test_exceptions_applied() {
        let mut calendar = Calendar::generated("wk", date(2024, 3, 4));
        calendar.monday = true;
        calendar.end_date = date(2024, 3, 17);
        let exceptions = vec![
            (date(2024, 3, 11), ExceptionType::Removed),
            (date(2024, 3, 16), ExceptionType::Added),
            (date(2024, 5, 1), ExceptionType::Added),
        ];
        let dates = service_dates(Some(&calendar), &exceptions, SERVICE_WINDOW_DAYS);
        assert_eq!(
            dates.into_iter().collect::<Vec<_>>(),
            vec![date(2024, 3, 4), date(2024, 3, 16)]
        );
    }

    #[test]
    fn test_window_stops_at_end_of_date_range() {
        let start = NaiveDate::MAX.pred_opt().expect("valid date");
        let mut calendar = Calendar::generated("wk", start);
        calendar.end_date = NaiveDate::MAX;
        for day in [
            &mut calendar.monday,
            &mut calendar.tuesday,
            &mut calendar.wednesday,
            &mut calendar.thursday,
            &mut calendar.friday,
            &mut calendar.saturday,
            &mut calendar.sunday,
        ] {
            *day = true;
        }
        let dates = service_dates(Some(&calendar), &[], SERVICE_WINDOW_DAYS);
        assert_eq!(dates.into_iter().collect::<Vec<_>>(), vec![start]);
    }

    #[test]
    fn test_exceptions_only_service() {
        let exceptions = vec![
            (date(2024, 7, 4), ExceptionType::Added),
            (date(2024, 7, 1), ExceptionType::Added),
            (date(2024, 8, 30), ExceptionType::Added),
        ];
        let dates = service_dates(None, &exceptions, SERVICE_WINDOW_DAYS);
        assert_eq!(
            dates.into_iter().collect::<Vec<_>>(),
            vec![date(2024, 7, 1), date(2024, 7, 4)]
        );
    }

    #[test]
    fn test_dow_category() {
        assert_eq!(dow_category(&date(2024, 3, 8)), WEEKDAY);
        assert_eq!(dow_category(&date(2024, 3, 9)), SATURDAY);
        assert_eq!(dow_category(&date(2024, 3, 10)), SUNDAY);
    }
}
