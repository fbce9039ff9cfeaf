use std::collections::BTreeMap;

use tlimport_core::model::EntityError;

use super::CopierError;

/// upper bound on the number of individual entity errors kept for reporting.
/// every error is still counted.
const MAX_ERROR_REPORTS: usize = 1_000;

#[derive(Debug, Clone)]
pub struct EntityErrorReport {
    pub file: String,
    pub entity_id: String,
    pub error: EntityError,
}

/// tallies of an import. when the import was aborted, `error` holds the cause
/// and the counts describe what was written before it.
#[derive(Debug, Default)]
pub struct CopyResult {
    pub inserted: BTreeMap<String, usize>,
    pub skipped_entity_errors: BTreeMap<String, usize>,
    pub skipped_reference_errors: BTreeMap<String, usize>,
    pub warnings: BTreeMap<String, usize>,
    pub entity_errors: BTreeMap<String, usize>,
    pub generated: BTreeMap<String, usize>,
    pub interpolated_stop_times: usize,
    pub error_reports: Vec<EntityErrorReport>,
    pub error: Option<CopierError>,
}

impl CopyResult {
    pub fn inserted_count(&self, file: &str) -> usize {
        self.inserted.get(file).copied().unwrap_or_default()
    }

    pub fn skipped_count(&self, file: &str) -> usize {
        self.skipped_entity_errors.get(file).copied().unwrap_or_default()
            + self.skipped_reference_errors.get(file).copied().unwrap_or_default()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub(crate) fn add_inserted(&mut self, file: &str, count: usize) {
        *self.inserted.entry(file.to_string()).or_default() += count;
    }

    pub(crate) fn add_generated(&mut self, file: &str) {
        *self.generated.entry(file.to_string()).or_default() += 1;
    }

    pub(crate) fn add_skipped(&mut self, file: &str, reference_error: bool, count: usize) {
        let counts = if reference_error {
            &mut self.skipped_reference_errors
        } else {
            &mut self.skipped_entity_errors
        };
        *counts.entry(file.to_string()).or_default() += count;
    }

    pub(crate) fn add_warnings(&mut self, file: &str, count: usize) {
        if count > 0 {
            *self.warnings.entry(file.to_string()).or_default() += count;
        }
    }

    pub(crate) fn add_errors(&mut self, file: &str, entity_id: &str, errors: &[EntityError]) {
        if errors.is_empty() {
            return;
        }
        *self.entity_errors.entry(file.to_string()).or_default() += errors.len();
        for error in errors {
            if self.error_reports.len() >= MAX_ERROR_REPORTS {
                break;
            }
            self.error_reports.push(EntityErrorReport {
                file: file.to_string(),
                entity_id: entity_id.to_string(),
                error: error.clone(),
            });
        }
    }

    /// logs the tallies at info level, one line per file.
    pub fn log_summary(&self) {
        for (file, count) in self.inserted.iter() {
            let skipped = self.skipped_count(file);
            let warnings = self.warnings.get(file).copied().unwrap_or_default();
            log::info!("{file}: {count} written, {skipped} skipped, {warnings} warnings");
        }
        for (file, count) in self.generated.iter() {
            log::info!("{file}: {count} generated");
        }
        log::info!("{} stop times interpolated", self.interpolated_stop_times);
        if let Some(e) = &self.error {
            log::error!("import failed: {e}");
        }
    }
}
