use serde::Serialize;

use super::{Stop, Trip};
use crate::emap::EntityMap;
use crate::model::{EntityError, EntityRecord, EntityStatus, WideTime};

/// stop_times.txt
#[derive(Debug, Clone, Default, Serialize)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub arrival_time: Option<WideTime>,
    pub departure_time: Option<WideTime>,
    pub stop_headsign: Option<String>,
    pub pickup_type: Option<i32>,
    pub drop_off_type: Option<i32>,
    pub shape_dist_traveled: Option<f64>,
    pub timepoint: Option<i32>,
    pub interpolated: bool,
    #[serde(skip)]
    pub status: EntityStatus,
}

impl StopTime {
    pub const FILENAME: &'static str = "stop_times.txt";

    /// when only one of arrival or departure is given, the other takes the same value.
    pub fn normalize_times(&mut self) {
        match (self.arrival_time, self.departure_time) {
            (Some(a), None) => self.departure_time = Some(a),
            (None, Some(d)) => self.arrival_time = Some(d),
            _ => {}
        }
    }

    pub fn has_times(&self) -> bool {
        self.arrival_time.is_some() && self.departure_time.is_some()
    }
}

impl EntityRecord for StopTime {
    fn filename(&self) -> &'static str {
        StopTime::FILENAME
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
        super::require(&mut errors, "trip_id", &self.trip_id);
        super::require(&mut errors, "stop_id", &self.stop_id);
        if let (Some(a), Some(d)) = (self.arrival_time, self.departure_time) {
            if d < a {
                errors.push(EntityError::invalid(
                    "departure_time",
                    d,
                    format!("departure is before arrival {a}"),
                ));
            }
        }
        super::check_enum(&mut errors, "pickup_type", self.pickup_type, &[0, 1, 2, 3]);
        super::check_enum(&mut errors, "drop_off_type", self.drop_off_type, &[0, 1, 2, 3]);
        super::check_enum(&mut errors, "timepoint", self.timepoint, &[0, 1]);
        if let Some(d) = self.shape_dist_traveled {
            if d < 0.0 {
                errors.push(EntityError::invalid("shape_dist_traveled", d, "must be non-negative"));
            }
        }
        errors
    }

    fn update_keys(&mut self, emap: &EntityMap) -> Result<(), EntityError> {
        emap.update_key(&mut self.trip_id, Trip::FILENAME, "trip_id")?;
        emap.update_key(&mut self.stop_id, Stop::FILENAME, "stop_id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_times_fills_missing_side() {
        let mut st = StopTime {
            arrival_time: Some(WideTime::from_hms(8, 0, 0)),
            ..Default::default()
        };
        st.normalize_times();
        assert_eq!(st.departure_time, Some(WideTime::from_hms(8, 0, 0)));
        assert!(st.has_times());
    }

    #[test]
    fn test_departure_before_arrival() {
        let st = StopTime {
            trip_id: String::from("t"),
            stop_id: String::from("s"),
            arrival_time: Some(WideTime::from_hms(8, 1, 0)),
            departure_time: Some(WideTime::from_hms(8, 0, 0)),
            ..Default::default()
        };
        assert_eq!(st.validate().len(), 1);
    }
}
