use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use geo::{LineString, Point};

use super::{interpolate_gaps, line_ops, GeomError, ShapeInfo};
use crate::model::gtfs::StopTime;

/// the location and display name of a written stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopGeom {
    pub point: Point<f64>,
    pub name: Option<String>,
}

/// run-scoped store of stop points and shape polylines keyed by their written
/// identifiers. identical polylines stored under different keys share one
/// [`ShapeInfo`] backing.
#[derive(Debug, Default)]
pub struct GeomCache {
    stops: HashMap<String, StopGeom>,
    shapes: HashMap<String, ShapeInfo>,
    shape_buckets: HashMap<u64, Vec<ShapeInfo>>,
}

impl GeomCache {
    pub fn new() -> GeomCache {
        GeomCache::default()
    }

    pub fn add_stop(&mut self, stop_id: &str, geom: StopGeom) {
        self.stops.insert(stop_id.to_string(), geom);
    }

    pub fn get_stop(&self, stop_id: &str) -> Option<&StopGeom> {
        self.stops.get(stop_id)
    }

    pub fn stops(&self) -> impl Iterator<Item = (&String, &StopGeom)> {
        self.stops.iter()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn get_shape(&self, shape_id: &str) -> Option<&ShapeInfo> {
        self.shapes.get(shape_id)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// caches a polyline. supplied distances are kept only when they match
    /// the vertex count and never decrease; otherwise distances are computed
    /// from the points.
    pub fn add_shape(
        &mut self,
        shape_id: &str,
        line: &LineString<f64>,
        supplied_distances: Option<&[f64]>,
        generated: bool,
    ) -> Result<ShapeInfo, GeomError> {
        if line.0.len() < 2 {
            return Err(GeomError::InsufficientPoints(line.0.len()));
        }
        let distances = match supplied_distances {
            Some(d) if d.len() == line.0.len() && line_ops::is_monotonic(d) => d.to_vec(),
            Some(_) => {
                log::debug!("shape '{shape_id}' has unusable shape_dist_traveled, recomputing");
                line_ops::cumulative_distances(line)
            }
            None => line_ops::cumulative_distances(line),
        };

        let key = geometry_hash(line, &distances);
        let bucket = self.shape_buckets.entry(key).or_default();
        let info = match bucket
            .iter()
            .find(|s| s.generated == generated && s.same_geometry(line, &distances))
        {
            Some(existing) => existing.clone(),
            None => {
                let length = distances.last().copied().unwrap_or_default();
                let info = ShapeInfo {
                    line: Arc::new(line.clone()),
                    distances: Arc::from(distances),
                    length,
                    generated,
                };
                bucket.push(info.clone());
                info
            }
        };
        self.shapes.insert(shape_id.to_string(), info.clone());
        Ok(info)
    }

    /// builds a line through the cached points of a stop sequence, skipping
    /// consecutive repeats of the same stop.
    pub fn make_shape(&self, stop_ids: &[&str]) -> Result<LineString<f64>, GeomError> {
        let mut coords = Vec::with_capacity(stop_ids.len());
        let mut prev: Option<&str> = None;
        for stop_id in stop_ids {
            if prev == Some(*stop_id) {
                continue;
            }
            let stop = self
                .get_stop(stop_id)
                .ok_or_else(|| GeomError::MissingStop(stop_id.to_string()))?;
            coords.push(stop.point.0);
            prev = Some(*stop_id);
        }
        if coords.len() < 2 {
            return Err(GeomError::InsufficientPoints(coords.len()));
        }
        Ok(LineString::new(coords))
    }

    /// fills arrival and departure times for stop times between two known
    /// times, proportional to distance along the trip. stop times must be
    /// sorted by stop_sequence and reference written stop ids.
    ///
    /// positions come from `shape_dist_traveled` when every stop time has a
    /// non-decreasing value. otherwise stops are projected onto the trip's
    /// shape, and when that does not produce increasing positions, the
    /// cumulative distance between the stops themselves is used.
    ///
    /// returns the number of stop times that were interpolated.
    pub fn interpolate_stop_times(
        &self,
        shape_id: Option<&str>,
        stop_times: &mut [StopTime],
    ) -> Result<usize, GeomError> {
        for st in stop_times.iter_mut() {
            st.normalize_times();
        }
        if stop_times.iter().all(|st| st.has_times()) {
            return Ok(0);
        }

        let supplied: Option<Vec<f64>> = stop_times.iter().map(|st| st.shape_dist_traveled).collect();
        let positions = match supplied {
            Some(p) if line_ops::is_monotonic(&p) => p,
            _ => self.stop_positions(shape_id, stop_times)?,
        };
        interpolate_gaps(stop_times, &positions)
    }

    fn stop_positions(&self, shape_id: Option<&str>, stop_times: &[StopTime]) -> Result<Vec<f64>, GeomError> {
        let points = stop_times
            .iter()
            .map(|st| {
                self.get_stop(&st.stop_id)
                    .map(|s| s.point)
                    .ok_or_else(|| GeomError::MissingStop(st.stop_id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let shape = shape_id.and_then(|id| self.get_shape(id));
        if let Some(shape) = shape {
            if let Some(positions) = line_ops::line_positions(&shape.line, &shape.distances, &points) {
                if line_ops::is_monotonic(&positions) {
                    return Ok(positions);
                }
            }
        }

        let fallback = line_ops::path_positions(&points);
        if line_ops::is_monotonic(&fallback) {
            Ok(fallback)
        } else {
            Err(GeomError::NonMonotonicPositions)
        }
    }
}

fn geometry_hash(line: &LineString<f64>, distances: &[f64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for c in line.coords() {
        c.x.to_bits().hash(&mut hasher);
        c.y.to_bits().hash(&mut hasher);
    }
    for d in distances {
        d.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WideTime;
    use geo::{line_string, point};

    fn stop_time(stop_id: &str, seq: u32, times: Option<(u32, u32)>) -> StopTime {
        StopTime {
            trip_id: String::from("t1"),
            stop_id: stop_id.to_string(),
            stop_sequence: seq,
            arrival_time: times.map(|(a, _)| WideTime::from_seconds(a)),
            departure_time: times.map(|(_, d)| WideTime::from_seconds(d)),
            ..Default::default()
        }
    }

    fn cache_with_stops() -> GeomCache {
        let mut cache = GeomCache::new();
        for (id, lat) in [("a", 0.0), ("b", 0.01), ("c", 0.02)] {
            cache.add_stop(
                id,
                StopGeom {
                    point: point!(x: 0.0, y: lat),
                    name: None,
                },
            );
        }
        cache
    }

    #[test]
    fn test_identical_shapes_share_backing() {
        let mut cache = GeomCache::new();
        let line = line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 1.0)];
        let a = cache.add_shape("1", &line, None, false).expect("valid shape");
        let b = cache.add_shape("2", &line, None, false).expect("valid shape");
        assert!(a.shares_line(&b));
        assert_eq!(cache.shape_count(), 2);
    }

    #[test]
    fn test_non_monotonic_distances_are_recomputed() {
        let mut cache = GeomCache::new();
        let line = line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.01), (x: 0.0, y: 0.02)];
        let info = cache
            .add_shape("1", &line, Some(&[0.0, 5.0, 3.0]), false)
            .expect("valid shape");
        assert!(line_ops::is_monotonic(&info.distances));
        assert!(info.length > 2000.0);
    }

    #[test]
    fn test_interpolate_with_shape_dist_traveled() {
        let cache = cache_with_stops();
        let mut sts = vec![
            stop_time("a", 1, Some((0, 20))),
            stop_time("b", 2, None),
            stop_time("c", 3, Some((100, 120))),
        ];
        sts[0].shape_dist_traveled = Some(0.0);
        sts[1].shape_dist_traveled = Some(10.0);
        sts[2].shape_dist_traveled = Some(20.0);
        let count = cache.interpolate_stop_times(None, &mut sts).expect("should interpolate");
        assert_eq!(count, 1);
        assert_eq!(sts[1].arrival_time, Some(WideTime::from_seconds(60)));
        assert_eq!(sts[1].departure_time, Some(WideTime::from_seconds(60)));
        assert!(sts[1].interpolated);
        assert!(!sts[0].interpolated);
    }

    #[test]
    fn test_interpolate_projects_onto_shape() {
        let mut cache = cache_with_stops();
        let line = line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.02)];
        cache.add_shape("s", &line, None, false).expect("valid shape");
        let mut sts = vec![
            stop_time("a", 1, Some((0, 0))),
            stop_time("b", 2, None),
            stop_time("c", 3, Some((600, 600))),
        ];
        cache
            .interpolate_stop_times(Some("s"), &mut sts)
            .expect("should interpolate");
        assert_eq!(sts[1].arrival_time, Some(WideTime::from_seconds(300)));
    }

    #[test]
    fn test_interpolate_fully_known_is_noop() {
        let cache = cache_with_stops();
        let mut sts = vec![
            stop_time("a", 1, Some((0, 10))),
            stop_time("b", 2, Some((50, 60))),
            stop_time("c", 3, Some((100, 120))),
        ];
        let before = sts.clone();
        let count = cache.interpolate_stop_times(None, &mut sts).expect("no-op");
        assert_eq!(count, 0);
        for (x, y) in before.iter().zip(sts.iter()) {
            assert_eq!(x.arrival_time, y.arrival_time);
            assert_eq!(x.departure_time, y.departure_time);
            assert_eq!(x.interpolated, y.interpolated);
        }
    }

    #[test]
    fn test_interpolate_missing_stop() {
        let cache = cache_with_stops();
        let mut sts = vec![
            stop_time("a", 1, Some((0, 0))),
            stop_time("zz", 2, None),
            stop_time("c", 3, Some((600, 600))),
        ];
        let result = cache.interpolate_stop_times(None, &mut sts);
        assert_eq!(result, Err(GeomError::MissingStop(String::from("zz"))));
    }

    #[test]
    fn test_make_shape_skips_repeats() {
        let cache = cache_with_stops();
        let line = cache.make_shape(&["a", "a", "b", "c"]).expect("valid stops");
        assert_eq!(line.0.len(), 3);
        assert!(cache.make_shape(&["a", "a"]).is_err());
    }
}
