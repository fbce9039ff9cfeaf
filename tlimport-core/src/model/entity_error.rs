use crate::geom::GeomError;

/// a data problem found on a single row. these are attached to the entity
/// and never abort an import.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    #[error("required field '{0}' is missing")]
    RequiredField(&'static str),
    #[error("failed to parse value '{value}' for field '{field}'")]
    ParseError { field: &'static str, value: String },
    #[error("invalid value '{value}' for field '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("value '{value}' for field '{field}' does not reference any entity in {file}")]
    MissingReference {
        field: &'static str,
        value: String,
        file: &'static str,
    },
    #[error("entity id '{0}' is duplicated in {1}")]
    DuplicateId(String, &'static str),
    #[error("trip has {0} stop times, at least 2 are required")]
    InsufficientStopTimes(usize),
    #[error("trip '{0}' has no matching stop times")]
    NoStopTimes(String),
    #[error("failed to interpolate stop times: {source}")]
    Interpolation {
        #[from]
        source: GeomError,
    },
}

impl EntityError {
    pub fn invalid(field: &'static str, value: impl ToString, reason: impl ToString) -> Self {
        EntityError::InvalidField {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// true for errors that come from unresolved references, which have their
    /// own allowance in the copier configuration.
    pub fn is_reference_error(&self) -> bool {
        matches!(self, EntityError::MissingReference { .. })
    }
}
