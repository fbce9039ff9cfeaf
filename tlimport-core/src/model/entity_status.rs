use super::EntityError;

/// validation results attached to a source entity. errors prevent an entity
/// from being written (unless the copier is configured to allow them), while
/// warnings are only tallied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStatus {
    pub errors: Vec<EntityError>,
    pub warnings: Vec<EntityError>,
}

impl EntityStatus {
    pub fn add_error(&mut self, error: EntityError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: EntityError) {
        self.warnings.push(warning);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
