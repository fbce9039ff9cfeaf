use serde::Serialize;

use super::{Calendar, Route, Shape};
use crate::emap::EntityMap;
use crate::model::{EntityError, EntityRecord, EntityStatus};

/// trips.txt
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    pub trip_headsign: Option<String>,
    pub trip_short_name: Option<String>,
    pub direction_id: Option<i32>,
    pub block_id: Option<String>,
    pub shape_id: Option<String>,
    pub wheelchair_accessible: Option<i32>,
    pub bikes_allowed: Option<i32>,
    #[serde(skip)]
    pub status: EntityStatus,
}

impl Trip {
    pub const FILENAME: &'static str = "trips.txt";

    /// direction_id, with a missing value treated as 0.
    pub fn direction(&self) -> i32 {
        self.direction_id.unwrap_or(0)
    }
}

impl EntityRecord for Trip {
    fn filename(&self) -> &'static str {
        Trip::FILENAME
    }

    fn entity_id(&self) -> &str {
        &self.trip_id
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
        super::require(&mut errors, "route_id", &self.route_id);
        super::require(&mut errors, "service_id", &self.service_id);
        super::check_enum(&mut errors, "direction_id", self.direction_id, &[0, 1]);
        super::check_enum(&mut errors, "wheelchair_accessible", self.wheelchair_accessible, &[0, 1, 2]);
        super::check_enum(&mut errors, "bikes_allowed", self.bikes_allowed, &[0, 1, 2]);
        errors
    }

    fn update_keys(&mut self, emap: &EntityMap) -> Result<(), EntityError> {
        emap.update_key(&mut self.route_id, Route::FILENAME, "route_id")?;
        emap.update_key(&mut self.service_id, Calendar::FILENAME, "service_id")?;
        emap.update_optional_key(&mut self.shape_id, Shape::FILENAME, "shape_id")
    }
}
