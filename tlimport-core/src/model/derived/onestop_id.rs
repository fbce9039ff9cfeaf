use serde::Serialize;

use super::derived_record;

#[derive(Debug, Clone, Serialize)]
pub struct StopOnestopId {
    pub feed_version_id: i64,
    pub stop_id: String,
    pub onestop_id: String,
}

derived_record!(StopOnestopId, "tl_stop_onestop_ids", stop_id);

#[derive(Debug, Clone, Serialize)]
pub struct RouteOnestopId {
    pub feed_version_id: i64,
    pub route_id: String,
    pub onestop_id: String,
}

derived_record!(RouteOnestopId, "tl_route_onestop_ids", route_id);

#[derive(Debug, Clone, Serialize)]
pub struct AgencyOnestopId {
    pub feed_version_id: i64,
    pub agency_id: String,
    pub onestop_id: String,
}

derived_record!(AgencyOnestopId, "tl_agency_onestop_ids", agency_id);
