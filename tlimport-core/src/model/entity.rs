use geo::Point;
use serde::Serialize;

use super::derived::{
    AgencyGeometry, AgencyOnestopId, AgencyPlace, FeedVersionGeometry, RouteGeometry,
    RouteHeadway, RouteOnestopId, RouteStop, StopOnestopId,
};
use super::gtfs::{Agency, Calendar, CalendarDate, Route, Shape, Stop, StopTime, Trip};
use super::{EntityError, EntityStatus};
use crate::emap::EntityMap;

/// behaviors shared by every record the copier can write.
pub trait EntityRecord {
    /// the GTFS file or derived table this record belongs to.
    fn filename(&self) -> &'static str;

    /// identifier of this record within its file. records without a natural
    /// identifier (stop times, feed version geometries) return an empty string.
    fn entity_id(&self) -> &str;

    /// validation results, only present on source records.
    fn status(&self) -> Option<&EntityStatus> {
        None
    }

    fn status_mut(&mut self) -> Option<&mut EntityStatus> {
        None
    }

    /// field-level validation. returned errors are attached to the status by the copier.
    fn validate(&self) -> Vec<EntityError> {
        vec![]
    }

    /// rewrites references to other entities with the identifiers assigned
    /// when those entities were written.
    fn update_keys(&mut self, _emap: &EntityMap) -> Result<(), EntityError> {
        Ok(())
    }

    fn as_point_geometry(&self) -> Option<&dyn HasPointGeometry> {
        None
    }

    fn as_feed_version_scoped(&mut self) -> Option<&mut dyn HasFeedVersionId> {
        None
    }
}

/// records that can be placed in the geometry cache as a point.
pub trait HasPointGeometry {
    fn point(&self) -> Option<Point<f64>>;
    fn display_name(&self) -> Option<&str>;
}

/// derived records, which are all scoped to the feed version being imported.
pub trait HasFeedVersionId {
    fn feed_version_id(&self) -> i64;
    fn set_feed_version_id(&mut self, feed_version_id: i64);
}

/// a single record flowing through the copier, either read from the source
/// feed or computed by a builder.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Agency(Agency),
    Stop(Stop),
    Route(Route),
    Calendar(Calendar),
    CalendarDate(CalendarDate),
    Shape(Shape),
    Trip(Trip),
    StopTime(StopTime),
    RouteGeometry(RouteGeometry),
    RouteHeadway(RouteHeadway),
    AgencyGeometry(AgencyGeometry),
    FeedVersionGeometry(FeedVersionGeometry),
    StopOnestopId(StopOnestopId),
    RouteOnestopId(RouteOnestopId),
    AgencyOnestopId(AgencyOnestopId),
    RouteStop(RouteStop),
    AgencyPlace(AgencyPlace),
}

impl Entity {
    pub fn record(&self) -> &dyn EntityRecord {
        match self {
            Entity::Agency(e) => e,
            Entity::Stop(e) => e,
            Entity::Route(e) => e,
            Entity::Calendar(e) => e,
            Entity::CalendarDate(e) => e,
            Entity::Shape(e) => e,
            Entity::Trip(e) => e,
            Entity::StopTime(e) => e,
            Entity::RouteGeometry(e) => e,
            Entity::RouteHeadway(e) => e,
            Entity::AgencyGeometry(e) => e,
            Entity::FeedVersionGeometry(e) => e,
            Entity::StopOnestopId(e) => e,
            Entity::RouteOnestopId(e) => e,
            Entity::AgencyOnestopId(e) => e,
            Entity::RouteStop(e) => e,
            Entity::AgencyPlace(e) => e,
        }
    }

    pub fn record_mut(&mut self) -> &mut dyn EntityRecord {
        match self {
            Entity::Agency(e) => e,
            Entity::Stop(e) => e,
            Entity::Route(e) => e,
            Entity::Calendar(e) => e,
            Entity::CalendarDate(e) => e,
            Entity::Shape(e) => e,
            Entity::Trip(e) => e,
            Entity::StopTime(e) => e,
            Entity::RouteGeometry(e) => e,
            Entity::RouteHeadway(e) => e,
            Entity::AgencyGeometry(e) => e,
            Entity::FeedVersionGeometry(e) => e,
            Entity::StopOnestopId(e) => e,
            Entity::RouteOnestopId(e) => e,
            Entity::AgencyOnestopId(e) => e,
            Entity::RouteStop(e) => e,
            Entity::AgencyPlace(e) => e,
        }
    }

    pub fn filename(&self) -> &'static str {
        self.record().filename()
    }

    pub fn entity_id(&self) -> &str {
        self.record().entity_id()
    }

    pub fn errors(&self) -> &[EntityError] {
        self.record()
            .status()
            .map(|s| s.errors.as_slice())
            .unwrap_or_default()
    }

    pub fn warnings(&self) -> &[EntityError] {
        self.record()
            .status()
            .map(|s| s.warnings.as_slice())
            .unwrap_or_default()
    }
}

macro_rules! impl_from_record {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Entity {
                fn from(value: $variant) -> Self {
                    Entity::$variant(value)
                }
            }
        )*
    };
}

impl_from_record!(
    Agency,
    Stop,
    Route,
    Calendar,
    CalendarDate,
    Shape,
    Trip,
    StopTime,
    RouteGeometry,
    RouteHeadway,
    AgencyGeometry,
    FeedVersionGeometry,
    StopOnestopId,
    RouteOnestopId,
    AgencyOnestopId,
    RouteStop,
    AgencyPlace
);
