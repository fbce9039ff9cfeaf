use geo::Polygon;
use serde::Serialize;

use super::derived_record;
use crate::util::wkt_codec;

/// convex hull of the stops visited by an agency's routes.
#[derive(Debug, Clone, Serialize)]
pub struct AgencyGeometry {
    pub feed_version_id: i64,
    pub agency_id: String,
    #[serde(serialize_with = "wkt_codec::serialize")]
    pub geometry: Polygon<f64>,
}

derived_record!(AgencyGeometry, "tl_agency_geometries", agency_id);

/// convex hull of every stop in the feed version.
#[derive(Debug, Clone, Serialize)]
pub struct FeedVersionGeometry {
    pub feed_version_id: i64,
    #[serde(serialize_with = "wkt_codec::serialize")]
    pub geometry: Polygon<f64>,
    #[serde(skip)]
    id: String,
}

impl FeedVersionGeometry {
    pub fn new(feed_version_id: i64, geometry: Polygon<f64>) -> FeedVersionGeometry {
        FeedVersionGeometry {
            feed_version_id,
            geometry,
            id: String::new(),
        }
    }
}

derived_record!(FeedVersionGeometry, "tl_feed_version_geometries", id);
