use serde::{Deserialize, Serialize};

use super::BuilderKind;
use crate::copier::CopierError;

/// defines behaviors for a GTFS feed version import
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct ImportConfiguration {
    /// identifier stamped on every derived record
    pub feed_version_id: i64,
    /// write entities even when they fail validation
    pub allow_entity_errors: bool,
    /// write entities even when a reference cannot be resolved
    pub allow_reference_errors: bool,
    pub interpolate_stop_times: bool,
    /// generate shapes from stop locations for trips without a shape_id
    pub create_missing_shapes: bool,
    /// number of stop times buffered before writing. trips are never split
    /// across batches.
    pub stop_time_batch_size: usize,
    /// number of trips grouped on the read-ahead thread before the copier
    /// must catch up
    pub read_ahead: usize,
    /// maximum number of trips (or shapes) grouped per pass over a file
    pub group_chunk_size: usize,
    pub builders: Vec<BuilderKind>,
    /// csv of named places with a WKT `geometry` column, required by the
    /// agency place builder
    pub places_file: Option<String>,
}

impl Default for ImportConfiguration {
    fn default() -> Self {
        Self {
            feed_version_id: 1,
            allow_entity_errors: false,
            allow_reference_errors: false,
            interpolate_stop_times: true,
            create_missing_shapes: true,
            stop_time_batch_size: 100_000,
            read_ahead: 1_000,
            group_chunk_size: 1_000_000,
            builders: BuilderKind::ALL.to_vec(),
            places_file: None,
        }
    }
}

impl TryFrom<&String> for ImportConfiguration {
    type Error = CopierError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        if f.ends_with(".toml") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                CopierError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            toml::from_str(&s).map_err(|e| {
                CopierError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })
        } else if f.ends_with(".json") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                CopierError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            serde_json::from_str(&s).map_err(|e| {
                CopierError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })
        } else {
            Err(CopierError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let conf: ImportConfiguration = toml::from_str(
            r#"
            feed_version_id = 42
            allow_reference_errors = true
            builders = ["route_geometry", "onestop_id"]
            "#,
        )
        .expect("valid configuration");
        assert_eq!(conf.feed_version_id, 42);
        assert!(conf.allow_reference_errors);
        assert!(conf.interpolate_stop_times);
        assert_eq!(
            conf.builders,
            vec![BuilderKind::RouteGeometry, BuilderKind::OnestopId]
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let result = ImportConfiguration::try_from(&String::from("import.yaml"));
        assert!(matches!(result, Err(CopierError::ConfigurationError(_))));
    }
}
