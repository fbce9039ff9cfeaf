use std::collections::HashMap;

use tlimport_core::model::Entity;

use super::writer::Writer;
use crate::copier::CopierError;

/// keeps written entities in memory and assigns sequential identifiers per
/// file, starting at 1, the way a database sequence would.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    entities: HashMap<&'static str, Vec<(String, Entity)>>,
}

impl MemoryWriter {
    pub fn new() -> MemoryWriter {
        MemoryWriter::default()
    }

    /// written entities for a file, with their assigned identifiers.
    pub fn get(&self, file: &str) -> &[(String, Entity)] {
        self.entities.get(file).map(|v| v.as_slice()).unwrap_or_default()
    }

    pub fn count(&self, file: &str) -> usize {
        self.get(file).len()
    }
}

impl Writer for MemoryWriter {
    fn add_entity(&mut self, entity: &Entity) -> Result<String, CopierError> {
        let rows = self.entities.entry(entity.filename()).or_default();
        let id = (rows.len() + 1).to_string();
        rows.push((id.clone(), entity.clone()));
        Ok(id)
    }
}
