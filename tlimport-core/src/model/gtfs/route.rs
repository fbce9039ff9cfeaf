use serde::Serialize;

use super::Agency;
use crate::emap::EntityMap;
use crate::model::{EntityError, EntityRecord, EntityStatus};

/// routes.txt
#[derive(Debug, Clone, Default, Serialize)]
pub struct Route {
    pub route_id: String,
    pub agency_id: String,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub route_desc: Option<String>,
    pub route_type: i32,
    pub route_url: Option<String>,
    pub route_color: Option<String>,
    pub route_text_color: Option<String>,
    pub route_sort_order: Option<i32>,
    #[serde(skip)]
    pub status: EntityStatus,
}

impl Route {
    pub const FILENAME: &'static str = "routes.txt";

    /// basic GTFS route types plus the extended (hierarchical) route types.
    pub fn is_valid_route_type(route_type: i32) -> bool {
        matches!(route_type, 0..=7 | 11 | 12 | 100..=1702)
    }

    /// the short name when present, otherwise the long name.
    pub fn display_name(&self) -> Option<&str> {
        [&self.route_short_name, &self.route_long_name]
            .into_iter()
            .flatten()
            .map(|s| s.as_str())
            .find(|s| !s.trim().is_empty())
    }
}

impl EntityRecord for Route {
    fn filename(&self) -> &'static str {
        Route::FILENAME
    }

    fn entity_id(&self) -> &str {
        &self.route_id
    }

    fn status(&self) -> Option<&EntityStatus> {
        Some(&self.status)
    }

    fn status_mut(&mut self) -> Option<&mut EntityStatus> {
        Some(&mut self.status)
    }

    fn validate(&self) -> Vec<EntityError> {
        let mut errors = vec![];
        super::require(&mut errors, "route_id", &self.route_id);
        if self.display_name().is_none() {
            errors.push(EntityError::RequiredField("route_short_name"));
        }
        if !Route::is_valid_route_type(self.route_type) {
            errors.push(EntityError::invalid(
                "route_type",
                self.route_type,
                "not a basic or extended route type",
            ));
        }
        errors
    }

    fn update_keys(&mut self, emap: &EntityMap) -> Result<(), EntityError> {
        emap.update_key(&mut self.agency_id, Agency::FILENAME, "agency_id")
    }
}
