use std::collections::HashMap;

use itertools::Itertools;
use tlimport_core::model::gtfs::StopTime;
use tlimport_core::model::Entity;

use super::reader::{EntityCallback, Reader, StopTimeGroupCallback};
use crate::copier::CopierError;

/// serves entities held in memory, for tests and for embedding the copier
/// behind another source.
#[derive(Debug, Default)]
pub struct MemoryReader {
    entities: HashMap<&'static str, Vec<Entity>>,
    stop_times: Vec<StopTime>,
}

impl MemoryReader {
    pub fn new() -> MemoryReader {
        MemoryReader::default()
    }

    pub fn add(&mut self, entity: impl Into<Entity>) {
        match entity.into() {
            Entity::StopTime(st) => self.stop_times.push(st),
            e => self.entities.entry(e.filename()).or_default().push(e),
        }
    }

    pub fn with(mut self, entity: impl Into<Entity>) -> MemoryReader {
        self.add(entity);
        self
    }
}

impl Reader for MemoryReader {
    fn each(&mut self, file: &'static str, callback: EntityCallback<'_>) -> Result<(), CopierError> {
        if let Some(entities) = self.entities.get(file) {
            for e in entities {
                callback(e.clone())?;
            }
        }
        Ok(())
    }

    fn stop_times_by_trip(&mut self, callback: StopTimeGroupCallback<'_>) -> Result<(), CopierError> {
        let groups = self
            .stop_times
            .iter()
            .cloned()
            .into_group_map_by(|st| st.trip_id.clone());
        let trip_order = self.stop_times.iter().map(|st| st.trip_id.as_str()).unique();
        for trip_id in trip_order {
            if let Some(group) = groups.get(trip_id) {
                let mut group = group.clone();
                group.sort_by_key(|st| st.stop_sequence);
                callback(group)?;
            }
        }
        Ok(())
    }
}
