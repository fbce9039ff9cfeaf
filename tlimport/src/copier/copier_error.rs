/// systemic failures which abort an import. problems with individual rows
/// are recorded as [`tlimport_core::model::EntityError`]s instead.
#[derive(thiserror::Error, Debug)]
pub enum CopierError {
    #[error("failure reading run configuration: {0}")]
    ConfigurationError(String),
    #[error("failure reading {file}: {source}")]
    CsvReadError { file: String, source: csv::Error },
    #[error("failure writing {file}: {source}")]
    CsvWriteError { file: String, source: csv::Error },
    #[error("failure reading zip archive: {source}")]
    ZipError {
        #[from]
        source: zip::result::ZipError,
    },
    #[error("i/o failure: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure writing entity to {file}: {message}")]
    WriterError { file: String, message: String },
    #[error("extension '{name}' failed: {message}")]
    ExtensionError { name: String, message: String },
    #[error("stop time read-ahead thread failed: {0}")]
    ReadAheadError(String),
    #[error("{0}")]
    InternalError(String),
}

impl CopierError {
    pub fn extension(name: &str, message: impl ToString) -> CopierError {
        CopierError::ExtensionError {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}
