mod builder_kind;
mod import_configuration;

pub use builder_kind::BuilderKind;
pub use import_configuration::ImportConfiguration;
