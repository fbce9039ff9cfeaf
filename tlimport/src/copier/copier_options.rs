use crate::config::ImportConfiguration;

/// the subset of [`ImportConfiguration`] that governs the copier itself.
#[derive(Debug, Clone)]
pub struct CopierOptions {
    pub feed_version_id: i64,
    pub allow_entity_errors: bool,
    pub allow_reference_errors: bool,
    pub interpolate_stop_times: bool,
    pub create_missing_shapes: bool,
    pub stop_time_batch_size: usize,
}

impl Default for CopierOptions {
    fn default() -> Self {
        CopierOptions::from(&ImportConfiguration::default())
    }
}

impl From<&ImportConfiguration> for CopierOptions {
    fn from(conf: &ImportConfiguration) -> Self {
        CopierOptions {
            feed_version_id: conf.feed_version_id,
            allow_entity_errors: conf.allow_entity_errors,
            allow_reference_errors: conf.allow_reference_errors,
            interpolate_stop_times: conf.interpolate_stop_times,
            create_missing_shapes: conf.create_missing_shapes,
            stop_time_batch_size: conf.stop_time_batch_size.max(1),
        }
    }
}
