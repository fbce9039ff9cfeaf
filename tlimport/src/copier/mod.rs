//! the import pipeline. entities are read, validated, re-identified and
//! written in reference order, with registered extensions observing each
//! step and writing derived records once the source is exhausted.
mod copier_error;
mod copier_options;
mod copy_result;
mod extension;
mod finalize_context;
mod pipeline;

pub use copier_error::CopierError;
pub use copier_options::CopierOptions;
pub use copy_result::{CopyResult, EntityErrorReport};
pub use extension::{AfterValidator, AfterWrite, Extension, Finalizer};
pub use finalize_context::FinalizeContext;
pub use pipeline::Copier;
