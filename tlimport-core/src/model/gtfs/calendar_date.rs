use chrono::NaiveDate;
use serde::Serialize;

use super::Calendar;
use crate::emap::EntityMap;
use crate::model::{EntityError, EntityRecord, EntityStatus};
use crate::util::date_codec;

/// calendar_dates.txt `exception_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionType {
    Added,
    Removed,
}

impl ExceptionType {
    pub fn from_code(code: i32) -> Option<ExceptionType> {
        match code {
            1 => Some(ExceptionType::Added),
            2 => Some(ExceptionType::Removed),
            _ => None,
        }
    }
}

/// calendar_dates.txt
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDate {
    pub service_id: String,
    #[serde(serialize_with = "date_codec::serialize_naive_date")]
    pub date: NaiveDate,
    pub exception_type: i32,
    #[serde(skip)]
    pub status: EntityStatus,
}

impl CalendarDate {
    pub const FILENAME: &'static str = "calendar_dates.txt";

    pub fn exception(&self) -> Option<ExceptionType> {
        ExceptionType::from_code(self.exception_type)
    }
}

impl EntityRecord for CalendarDate {
    fn filename(&self) -> &'static str {
        CalendarDate::FILENAME
    }

    fn entity_id(&self) -> &str {
        ""
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
        if self.exception().is_none() {
            errors.push(EntityError::invalid(
                "exception_type",
                self.exception_type,
                "must be 1 or 2",
            ));
        }
        errors
    }

    fn update_keys(&mut self, emap: &EntityMap) -> Result<(), EntityError> {
        emap.update_key(&mut self.service_id, Calendar::FILENAME, "service_id")
    }
}
