//! records read from a GTFS feed. field names follow the GTFS reference so
//! that writing a record back out produces the expected column headers.
mod agency;
mod calendar;
mod calendar_date;
mod route;
mod shape;
mod stop;
mod stop_time;
mod trip;

pub use agency::Agency;
pub use calendar::Calendar;
pub use calendar_date::{CalendarDate, ExceptionType};
pub use route::Route;
pub use shape::Shape;
pub use stop::{LocationType, Stop};
pub use stop_time::StopTime;
pub use trip::Trip;

use super::EntityError;

pub(crate) fn require(errors: &mut Vec<EntityError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(EntityError::RequiredField(field));
    }
}

pub(crate) fn check_latitude(errors: &mut Vec<EntityError>, field: &'static str, value: f64) {
    if !(-90.0..=90.0).contains(&value) {
        errors.push(EntityError::invalid(field, value, "latitude out of range"));
    }
}

pub(crate) fn check_longitude(errors: &mut Vec<EntityError>, field: &'static str, value: f64) {
    if !(-180.0..=180.0).contains(&value) {
        errors.push(EntityError::invalid(field, value, "longitude out of range"));
    }
}

pub(crate) fn check_enum(
    errors: &mut Vec<EntityError>,
    field: &'static str,
    value: Option<i32>,
    allowed: &[i32],
) {
    if let Some(v) = value {
        if !allowed.contains(&v) {
            errors.push(EntityError::invalid(field, v, "value not in allowed set"));
        }
    }
}
