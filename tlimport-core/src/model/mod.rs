pub mod derived;
mod entity;
mod entity_error;
mod entity_status;
pub mod gtfs;
mod wide_time;

pub use entity::{Entity, EntityRecord, HasFeedVersionId, HasPointGeometry};
pub use entity_error::EntityError;
pub use entity_status::EntityStatus;
pub use wide_time::WideTime;
