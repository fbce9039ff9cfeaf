use tlimport_core::model::gtfs::StopTime;
use tlimport_core::model::Entity;

use crate::copier::CopierError;

pub type EntityCallback<'a> = &'a mut dyn FnMut(Entity) -> Result<(), CopierError>;
pub type StopTimeGroupCallback<'a> = &'a mut dyn FnMut(Vec<StopTime>) -> Result<(), CopierError>;

/// a source of GTFS entities.
pub trait Reader {
    /// streams every entity in a GTFS file, in file order. shapes.txt rows
    /// are assembled into one entity per shape_id. rows which fail to parse
    /// are still delivered, with parse errors attached to their status.
    /// a missing file produces no entities.
    fn each(&mut self, file: &'static str, callback: EntityCallback<'_>) -> Result<(), CopierError>;

    /// streams stop times grouped by trip_id. each group holds every stop
    /// time of one trip, sorted by stop_sequence.
    fn stop_times_by_trip(&mut self, callback: StopTimeGroupCallback<'_>) -> Result<(), CopierError>;
}
