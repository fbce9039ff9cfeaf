use geo::{LineString, MultiLineString};
use serde::Serialize;

use super::derived_record;
use crate::util::wkt_codec;

/// the representative line of a route, along with every selected line.
#[derive(Debug, Clone, Serialize)]
pub struct RouteGeometry {
    pub feed_version_id: i64,
    pub route_id: String,
    /// true when the primary line comes from a shape generated from stop points.
    pub generated: bool,
    #[serde(serialize_with = "wkt_codec::serialize")]
    pub geometry: LineString<f64>,
    #[serde(serialize_with = "wkt_codec::serialize")]
    pub combined_geometry: MultiLineString<f64>,
    /// length of the primary line in meters.
    pub length: f64,
    /// longest segment of the primary line in meters.
    pub max_segment_length: f64,
    /// largest distance in meters from the primary line's first point to the
    /// first point of any other selected line.
    pub first_point_max_distance: f64,
}

derived_record!(RouteGeometry, "tl_route_geometries", route_id);
