use serde::Serialize;

use super::derived_record;

/// a stop visited by at least one trip of a route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStop {
    pub feed_version_id: i64,
    pub route_id: String,
    pub agency_id: String,
    pub stop_id: String,
}

derived_record!(RouteStop, "tl_route_stops", route_id);
