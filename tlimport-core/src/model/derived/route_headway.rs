use chrono::NaiveDate;
use serde::Serialize;

use super::derived_record;
use crate::util::{date_codec, seconds_codec};

/// departure frequency of a route at its busiest stop, for one direction and
/// day-of-week category (1 = weekday, 6 = saturday, 7 = sunday).
#[derive(Debug, Clone, Serialize)]
pub struct RouteHeadway {
    pub feed_version_id: i64,
    pub route_id: String,
    pub selected_stop_id: String,
    pub direction_id: i32,
    pub dow_category: i32,
    #[serde(serialize_with = "date_codec::serialize_naive_date")]
    pub service_date: NaiveDate,
    pub stop_trip_count: usize,
    #[serde(serialize_with = "seconds_codec::serialize")]
    pub departures: Vec<u32>,
    /// median gap between morning departures, in seconds.
    pub headway_secs: Option<u32>,
    pub headway_min_secs: Option<u32>,
    pub headway_max_secs: Option<u32>,
}

derived_record!(RouteHeadway, "tl_route_headways", route_id);
