use serde::Serialize;

use super::derived_record;

/// a named place containing stops of an agency. `rank` is the share of the
/// agency's stops that fall within the place.
#[derive(Debug, Clone, Serialize)]
pub struct AgencyPlace {
    pub feed_version_id: i64,
    pub agency_id: String,
    pub name: Option<String>,
    pub adm0_name: Option<String>,
    pub adm1_name: Option<String>,
    pub rank: f64,
}

derived_record!(AgencyPlace, "tl_agency_places", agency_id);
