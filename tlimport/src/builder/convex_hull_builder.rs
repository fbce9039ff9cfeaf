use std::collections::HashSet;

use geo::{ConvexHull, MultiPoint, Point, Polygon};
use tlimport_core::emap::EntityMap;
use tlimport_core::geom::GeomCache;
use tlimport_core::model::derived::{AgencyGeometry, FeedVersionGeometry};
use tlimport_core::model::Entity;

use super::RouteVisits;
use crate::copier::{AfterWrite, CopierError, Extension, FinalizeContext, Finalizer};

/// writes the convex hull of every stop in the feed version, and of the stops
/// visited by each agency's routes.
#[derive(Debug, Default)]
pub struct ConvexHullBuilder {
    visits: RouteVisits,
}

impl Extension for ConvexHullBuilder {
    fn name(&self) -> &str {
        "convex_hull_builder"
    }

    fn as_after_write(&mut self) -> Option<&mut dyn AfterWrite> {
        Some(self)
    }

    fn as_finalizer(&mut self) -> Option<&mut dyn Finalizer> {
        Some(self)
    }
}

impl AfterWrite for ConvexHullBuilder {
    fn after_write(&mut self, entity_id: &str, entity: &Entity, _emap: &EntityMap) -> Result<(), CopierError> {
        self.visits.observe(entity_id, entity);
        Ok(())
    }
}

impl Finalizer for ConvexHullBuilder {
    fn finalize(&mut self, ctx: &mut FinalizeContext<'_>) -> Result<(), CopierError> {
        let all_points: Vec<Point<f64>> = ctx.geom_cache.stops().map(|(_, s)| s.point).collect();
        match convex_hull(&all_points) {
            Some(hull) => {
                ctx.write(FeedVersionGeometry::new(ctx.feed_version_id, hull))?;
            }
            None => log::warn!(
                "feed version has {} stops, too few for a hull",
                all_points.len()
            ),
        }

        let mut count = 0;
        for (agency_id, stops) in self.visits.agency_stops() {
            let points = stop_points(stops.iter().copied(), ctx.geom_cache);
            let Some(geometry) = convex_hull(&points) else {
                log::warn!("agency '{agency_id}' visits too few stops for a hull, skipping");
                continue;
            };
            ctx.write(AgencyGeometry {
                feed_version_id: 0,
                agency_id: agency_id.to_string(),
                geometry,
            })?;
            count += 1;
        }
        log::info!("wrote {count} agency geometries");
        Ok(())
    }
}

fn stop_points<'a>(stop_ids: impl Iterator<Item = &'a str>, geom_cache: &GeomCache) -> Vec<Point<f64>> {
    stop_ids
        .filter_map(|id| geom_cache.get_stop(id))
        .map(|s| s.point)
        .collect()
}

/// 2-D convex hull of the distinct points, or None when there are fewer
/// than three of them.
pub fn convex_hull(points: &[Point<f64>]) -> Option<Polygon<f64>> {
    let mut seen = HashSet::new();
    let distinct: Vec<Point<f64>> = points
        .iter()
        .filter(|p| seen.insert((p.x().to_bits(), p.y().to_bits())))
        .copied()
        .collect();
    if distinct.len() < 3 {
        return None;
    }
    Some(MultiPoint::new(distinct).convex_hull())
}
