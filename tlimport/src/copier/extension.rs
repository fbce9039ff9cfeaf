use tlimport_core::emap::EntityMap;
use tlimport_core::model::Entity;

use super::{CopierError, FinalizeContext};

/// a component registered with the copier. an extension exposes only the
/// hook capabilities it needs; hooks are dispatched in registration order
/// and an error from any hook aborts the import.
pub trait Extension {
    fn name(&self) -> &str;

    fn as_after_validator(&mut self) -> Option<&mut dyn AfterValidator> {
        None
    }

    fn as_after_write(&mut self) -> Option<&mut dyn AfterWrite> {
        None
    }

    fn as_finalizer(&mut self) -> Option<&mut dyn Finalizer> {
        None
    }
}

/// observes each entity after validation, before references are rewritten.
pub trait AfterValidator {
    fn after_validator(&mut self, entity: &Entity) -> Result<(), CopierError>;
}

/// observes each written entity. `entity_id` is the assigned identifier and
/// references held by the entity have already been rewritten.
pub trait AfterWrite {
    fn after_write(&mut self, entity_id: &str, entity: &Entity, emap: &EntityMap) -> Result<(), CopierError>;
}

/// runs once after every source entity has been written.
pub trait Finalizer {
    fn finalize(&mut self, ctx: &mut FinalizeContext<'_>) -> Result<(), CopierError>;
}
