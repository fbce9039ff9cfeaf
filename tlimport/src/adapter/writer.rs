use tlimport_core::model::Entity;

use crate::copier::CopierError;

/// a sink for source and derived entities.
pub trait Writer {
    /// writes an entity and returns the identifier assigned to it.
    fn add_entity(&mut self, entity: &Entity) -> Result<String, CopierError>;

    /// writes a batch of entities, returning the assigned identifiers in order.
    fn add_entities(&mut self, entities: &[Entity]) -> Result<Vec<String>, CopierError> {
        entities.iter().map(|e| self.add_entity(e)).collect()
    }

    fn flush(&mut self) -> Result<(), CopierError> {
        Ok(())
    }
}
