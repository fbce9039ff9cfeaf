//! records computed by builders during finalization. every derived record is
//! scoped to the feed version being imported.
/// implements [`crate::model::EntityRecord`] and [`crate::model::HasFeedVersionId`]
/// for a derived record with a `feed_version_id` field.
macro_rules! derived_record {
    ($record:ty, $filename:expr, $id:ident) => {
        impl $record {
            pub const FILENAME: &'static str = $filename;
        }

        impl $crate::model::EntityRecord for $record {
            fn filename(&self) -> &'static str {
                $filename
            }

            fn entity_id(&self) -> &str {
                &self.$id
            }

            fn as_feed_version_scoped(
                &mut self,
            ) -> Option<&mut dyn $crate::model::HasFeedVersionId> {
                Some(self)
            }
        }

        impl $crate::model::HasFeedVersionId for $record {
            fn feed_version_id(&self) -> i64 {
                self.feed_version_id
            }

            fn set_feed_version_id(&mut self, feed_version_id: i64) {
                self.feed_version_id = feed_version_id;
            }
        }
    };
}

pub(crate) use derived_record;

mod agency_place;
mod hull_geometry;
mod onestop_id;
mod route_geometry;
mod route_headway;
mod route_stop;

pub use agency_place::AgencyPlace;
pub use hull_geometry::{AgencyGeometry, FeedVersionGeometry};
pub use onestop_id::{AgencyOnestopId, RouteOnestopId, StopOnestopId};
pub use route_geometry::RouteGeometry;
pub use route_headway::RouteHeadway;
pub use route_stop::RouteStop;
