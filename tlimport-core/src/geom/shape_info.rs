use std::sync::Arc;

use geo::LineString;

/// a cached polyline with cumulative distances at each vertex. clones share
/// the backing line and distance array.
#[derive(Debug, Clone)]
pub struct ShapeInfo {
    pub line: Arc<LineString<f64>>,
    pub distances: Arc<[f64]>,
    pub length: f64,
    pub generated: bool,
}

impl ShapeInfo {
    /// true if both shapes point at the same backing polyline.
    pub fn shares_line(&self, other: &ShapeInfo) -> bool {
        Arc::ptr_eq(&self.line, &other.line)
    }

    /// true if the polyline and distances are equal in value.
    pub fn same_geometry(&self, line: &LineString<f64>, distances: &[f64]) -> bool {
        *self.line == *line && *self.distances == *distances
    }
}
