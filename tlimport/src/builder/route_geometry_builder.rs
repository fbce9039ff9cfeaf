use std::collections::{BTreeMap, BTreeSet, HashMap};

use geo::{Distance, Haversine, Length, LineString, MultiLineString, Point};
use tlimport_core::emap::EntityMap;
use tlimport_core::geom::{line_ops, GeomCache};
use tlimport_core::model::derived::RouteGeometry;
use tlimport_core::model::Entity;

use crate::copier::{AfterWrite, CopierError, Extension, FinalizeContext, Finalizer};

/// a shape is included when it carries more than this share of a
/// direction's trips.
const MIN_TRIP_SHARE: f64 = 0.1;

/// selects the representative shapes of each route from the shapes used by
/// its trips and writes one [`RouteGeometry`] per route.
#[derive(Debug, Default)]
pub struct RouteGeometryBuilder {
    /// route -> direction -> shape -> trip count
    shape_counts: HashMap<String, BTreeMap<i32, HashMap<String, usize>>>,
}

/// shapes chosen for a route. `selected` is ordered by trip count, then id,
/// and starts with `primary`.
#[derive(Debug, PartialEq)]
pub struct ShapeSelection {
    pub primary: String,
    pub selected: Vec<String>,
}

impl Extension for RouteGeometryBuilder {
    fn name(&self) -> &str {
        "route_geometry_builder"
    }

    fn as_after_write(&mut self) -> Option<&mut dyn AfterWrite> {
        Some(self)
    }

    fn as_finalizer(&mut self) -> Option<&mut dyn Finalizer> {
        Some(self)
    }
}

impl AfterWrite for RouteGeometryBuilder {
    fn after_write(&mut self, _entity_id: &str, entity: &Entity, _emap: &EntityMap) -> Result<(), CopierError> {
        if let Entity::Trip(trip) = entity {
            if let Some(shape_id) = &trip.shape_id {
                *self
                    .shape_counts
                    .entry(trip.route_id.clone())
                    .or_default()
                    .entry(trip.direction())
                    .or_default()
                    .entry(shape_id.clone())
                    .or_default() += 1;
            }
        }
        Ok(())
    }
}

impl Finalizer for RouteGeometryBuilder {
    fn finalize(&mut self, ctx: &mut FinalizeContext<'_>) -> Result<(), CopierError> {
        let route_ids: BTreeSet<&String> = self.shape_counts.keys().collect();
        let mut count = 0;
        for route_id in route_ids {
            let directions = &self.shape_counts[route_id];
            let geometry = select_shapes(directions, ctx.geom_cache)
                .and_then(|selection| route_geometry(route_id, &selection, ctx.geom_cache));
            match geometry {
                Some(g) => {
                    ctx.write(g)?;
                    count += 1;
                }
                None => log::warn!("route '{route_id}' has no cached shapes, skipping geometry"),
            }
        }
        log::info!("wrote {count} route geometries");
        Ok(())
    }
}

/// chooses the shapes that represent a route.
///
/// within each direction the longest non-generated shape, the shape with
/// the most trips, and any shape with more than 10% of the trips are
/// selected. generated shapes are dropped from the union of directions when
/// any non-generated shape was selected. shapes missing from the cache are
/// ignored.
pub fn select_shapes(
    directions: &BTreeMap<i32, HashMap<String, usize>>,
    geom_cache: &GeomCache,
) -> Option<ShapeSelection> {
    let mut selected: BTreeSet<&str> = BTreeSet::new();
    let mut totals: HashMap<&str, usize> = HashMap::new();
    let mut lengths: HashMap<&str, f64> = HashMap::new();
    let mut generated: HashMap<&str, bool> = HashMap::new();

    for counts in directions.values() {
        let known: Vec<(&str, usize)> = counts
            .iter()
            .filter_map(|(id, n)| {
                let shape = geom_cache.get_shape(id)?;
                generated.insert(id.as_str(), shape.generated);
                lengths
                    .entry(id.as_str())
                    .or_insert_with(|| Haversine.length(shape.line.as_ref()));
                Some((id.as_str(), *n))
            })
            .collect();
        let total: usize = known.iter().map(|(_, n)| n).sum();
        for (id, n) in known.iter() {
            *totals.entry(*id).or_default() += *n;
        }

        let longest = known
            .iter()
            .filter(|(id, _)| !generated[id])
            .max_by(|(a, _), (b, _)| lengths[a].total_cmp(&lengths[b]).then_with(|| b.cmp(a)));
        if let Some((id, _)) = longest {
            selected.insert(*id);
        }
        let most_trips = known
            .iter()
            .max_by(|(a, na), (b, nb)| na.cmp(nb).then_with(|| b.cmp(a)));
        if let Some((id, _)) = most_trips {
            selected.insert(*id);
        }
        for (id, n) in known.iter() {
            if total > 0 && (*n as f64 / total as f64) > MIN_TRIP_SHARE {
                selected.insert(*id);
            }
        }
    }

    if selected.iter().any(|id| !generated[id]) {
        selected.retain(|id| !generated[id]);
    }
    let mut ordered: Vec<&str> = selected.into_iter().collect();
    ordered.sort_by(|a, b| totals[b].cmp(&totals[a]).then_with(|| a.cmp(b)));
    let primary = ordered.first()?.to_string();
    Some(ShapeSelection {
        primary,
        selected: ordered.into_iter().map(String::from).collect(),
    })
}

fn route_geometry(route_id: &str, selection: &ShapeSelection, geom_cache: &GeomCache) -> Option<RouteGeometry> {
    let primary = geom_cache.get_shape(&selection.primary)?;
    let lines: Vec<LineString<f64>> = selection
        .selected
        .iter()
        .filter_map(|id| geom_cache.get_shape(id))
        .map(|s| s.line.as_ref().clone())
        .collect();
    let first_point = primary.line.points().next()?;
    let first_point_max_distance = lines
        .iter()
        .filter_map(|l| l.points().next())
        .map(|p: Point<f64>| Haversine.distance(first_point, p))
        .fold(0.0, f64::max);
    Some(RouteGeometry {
        feed_version_id: 0,
        route_id: route_id.to_string(),
        generated: primary.generated,
        geometry: primary.line.as_ref().clone(),
        length: Haversine.length(primary.line.as_ref()),
        max_segment_length: line_ops::max_segment_length(&primary.line),
        first_point_max_distance,
        combined_geometry: MultiLineString::new(lines),
    })
}
