use geo::LineString;
use serde::Serialize;

use crate::model::{EntityError, EntityRecord, EntityStatus};
use crate::util::wkt_codec;

/// a complete shape assembled from the rows of shapes.txt sharing a shape_id,
/// ordered by shape_pt_sequence. also used for shapes generated from the
/// stop sequence of a trip.
#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    pub shape_id: String,
    #[serde(serialize_with = "wkt_codec::serialize")]
    pub geometry: LineString<f64>,
    #[serde(skip)]
    pub shape_dist_traveled: Option<Vec<f64>>,
    pub generated: bool,
    #[serde(skip)]
    pub status: EntityStatus,
}

impl Shape {
    pub const FILENAME: &'static str = "shapes.txt";
}

impl EntityRecord for Shape {
    fn filename(&self) -> &'static str {
        Shape::FILENAME
    }

    fn entity_id(&self) -> &str {
        &self.shape_id
    }

    fn status(&self) -> Option<&EntityStatus> {
        Some(&self.status)
    }

    fn status_mut(&mut self) -> Option<&mut EntityStatus> {
        Some(&mut self.status)
    }

    fn validate(&self) -> Vec<EntityError> {
        let mut errors = vec![];
        super::require(&mut errors, "shape_id", &self.shape_id);
        if self.geometry.0.len() < 2 {
            errors.push(EntityError::invalid(
                "shape_pt_sequence",
                self.geometry.0.len(),
                "shape must have at least 2 points",
            ));
        }
        for coord in self.geometry.coords() {
            super::check_latitude(&mut errors, "shape_pt_lat", coord.y);
            super::check_longitude(&mut errors, "shape_pt_lon", coord.x);
        }
        if let Some(dists) = &self.shape_dist_traveled {
            if dists.len() != self.geometry.0.len() {
                errors.push(EntityError::invalid(
                    "shape_dist_traveled",
                    dists.len(),
                    "must be provided for every point or none",
                ));
            }
        }
        errors
    }
}
