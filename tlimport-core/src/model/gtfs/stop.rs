use geo::Point;
use serde::Serialize;

use crate::emap::EntityMap;
use crate::model::{EntityError, EntityRecord, EntityStatus, HasPointGeometry};

/// values of stops.txt `location_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationType {
    StopOrPlatform,
    Station,
    EntranceExit,
    GenericNode,
    BoardingArea,
}

impl TryFrom<i32> for LocationType {
    type Error = EntityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LocationType::StopOrPlatform),
            1 => Ok(LocationType::Station),
            2 => Ok(LocationType::EntranceExit),
            3 => Ok(LocationType::GenericNode),
            4 => Ok(LocationType::BoardingArea),
            _ => Err(EntityError::invalid(
                "location_type",
                value,
                "must be between 0 and 4",
            )),
        }
    }
}

/// stops.txt
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stop {
    pub stop_id: String,
    pub stop_code: Option<String>,
    pub stop_name: Option<String>,
    pub stop_desc: Option<String>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
    pub zone_id: Option<String>,
    pub stop_url: Option<String>,
    pub location_type: i32,
    pub parent_station: Option<String>,
    pub stop_timezone: Option<String>,
    pub wheelchair_boarding: Option<i32>,
    pub platform_code: Option<String>,
    #[serde(skip)]
    pub status: EntityStatus,
}

impl Stop {
    pub const FILENAME: &'static str = "stops.txt";

    /// location types 0, 1 and 2 require a name and coordinates.
    fn requires_location(&self) -> bool {
        matches!(
            LocationType::try_from(self.location_type),
            Ok(LocationType::StopOrPlatform | LocationType::Station | LocationType::EntranceExit)
        )
    }
}

impl EntityRecord for Stop {
    fn filename(&self) -> &'static str {
        Stop::FILENAME
    }

    fn entity_id(&self) -> &str {
        &self.stop_id
    }

    fn status(&self) -> Option<&EntityStatus> {
        Some(&self.status)
    }

    fn status_mut(&mut self) -> Option<&mut EntityStatus> {
        Some(&mut self.status)
    }

    fn validate(&self) -> Vec<EntityError> {
        let mut errors = vec![];
        super::require(&mut errors, "stop_id", &self.stop_id);
        let location_type = match LocationType::try_from(self.location_type) {
            Ok(lt) => lt,
            Err(e) => {
                errors.push(e);
                return errors;
            }
        };
        if self.requires_location() {
            if self.stop_name.as_deref().unwrap_or_default().trim().is_empty() {
                errors.push(EntityError::RequiredField("stop_name"));
            }
            match (self.stop_lat, self.stop_lon) {
                (Some(lat), Some(lon)) => {
                    super::check_latitude(&mut errors, "stop_lat", lat);
                    super::check_longitude(&mut errors, "stop_lon", lon);
                }
                (None, _) => errors.push(EntityError::RequiredField("stop_lat")),
                (_, None) => errors.push(EntityError::RequiredField("stop_lon")),
            }
        }
        match (location_type, self.parent_station.as_deref()) {
            (LocationType::Station, Some(parent)) if !parent.is_empty() => {
                errors.push(EntityError::invalid(
                    "parent_station",
                    parent,
                    "stations cannot have a parent station",
                ))
            }
            (
                LocationType::EntranceExit
                | LocationType::GenericNode
                | LocationType::BoardingArea,
                None,
            ) => errors.push(EntityError::RequiredField("parent_station")),
            _ => {}
        }
        super::check_enum(&mut errors, "wheelchair_boarding", self.wheelchair_boarding, &[0, 1, 2]);
        errors
    }

    fn update_keys(&mut self, emap: &EntityMap) -> Result<(), EntityError> {
        emap.update_optional_key(&mut self.parent_station, Stop::FILENAME, "parent_station")
    }

    fn as_point_geometry(&self) -> Option<&dyn HasPointGeometry> {
        Some(self)
    }
}

impl HasPointGeometry for Stop {
    fn point(&self) -> Option<Point<f64>> {
        match (self.stop_lon, self.stop_lat) {
            (Some(lon), Some(lat)) => Some(Point::new(lon, lat)),
            _ => None,
        }
    }

    fn display_name(&self) -> Option<&str> {
        self.stop_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> Stop {
        Stop {
            stop_id: String::from("a"),
            stop_name: Some(String::from("Union Station")),
            stop_lat: Some(39.75),
            stop_lon: Some(-105.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_platform() {
        assert!(platform().validate().is_empty());
    }

    #[test]
    fn test_out_of_range_latitude() {
        let stop = Stop {
            stop_lat: Some(91.0),
            ..platform()
        };
        let errors = stop.validate();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            EntityError::InvalidField {
                field: "stop_lat",
                ..
            }
        ));
    }

    #[test]
    fn test_boarding_area_requires_parent() {
        let stop = Stop {
            location_type: 4,
            stop_lat: None,
            stop_lon: None,
            ..platform()
        };
        assert_eq!(
            stop.validate(),
            vec![EntityError::RequiredField("parent_station")]
        );
    }
}
