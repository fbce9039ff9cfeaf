use std::collections::BTreeMap;

use geo::Point;
use tlimport_core::emap::EntityMap;
use tlimport_core::geom::GeomCache;
use tlimport_core::model::derived::{AgencyOnestopId, RouteOnestopId, StopOnestopId};
use tlimport_core::model::{Entity, HasPointGeometry};

use super::onestop_ops::{self, NameFilter, GEOHASH_PRECISION};
use super::RouteVisits;
use crate::copier::{AfterWrite, CopierError, Extension, FinalizeContext, Finalizer};

/// assigns onestop ids of the form `<prefix>-<geohash>-<name>` to stops,
/// routes and agencies. stop ids are computed as stops are written; route
/// and agency ids use the consensus geohash of the stops they visit.
#[derive(Debug)]
pub struct OnestopIdBuilder {
    filter: NameFilter,
    stops: Vec<StopOnestopId>,
    route_names: BTreeMap<String, String>,
    agency_names: BTreeMap<String, String>,
    visits: RouteVisits,
}

impl OnestopIdBuilder {
    pub fn new() -> Result<OnestopIdBuilder, CopierError> {
        Ok(OnestopIdBuilder {
            filter: NameFilter::new()?,
            stops: vec![],
            route_names: BTreeMap::new(),
            agency_names: BTreeMap::new(),
            visits: RouteVisits::default(),
        })
    }

    fn consensus_id(
        &self,
        prefix: &str,
        name: &str,
        stop_ids: impl Iterator<Item = String>,
        geom_cache: &GeomCache,
    ) -> Result<Option<String>, CopierError> {
        let points: Vec<Point<f64>> = stop_ids
            .filter_map(|id| geom_cache.get_stop(&id).map(|s| s.point))
            .collect();
        let geohash = onestop_ops::consensus_geohash(&points)?;
        Ok(geohash.map(|g| format!("{prefix}-{g}-{}", self.filter.apply(name))))
    }
}

impl Extension for OnestopIdBuilder {
    fn name(&self) -> &str {
        "onestop_id_builder"
    }

    fn as_after_write(&mut self) -> Option<&mut dyn AfterWrite> {
        Some(self)
    }

    fn as_finalizer(&mut self) -> Option<&mut dyn Finalizer> {
        Some(self)
    }
}

impl AfterWrite for OnestopIdBuilder {
    fn after_write(&mut self, entity_id: &str, entity: &Entity, _emap: &EntityMap) -> Result<(), CopierError> {
        self.visits.observe(entity_id, entity);
        match entity {
            Entity::Stop(stop) => {
                if let Some(point) = stop.point() {
                    let geohash = onestop_ops::encode(&point, GEOHASH_PRECISION)?;
                    let name = self.filter.apply(stop.display_name().unwrap_or_default());
                    self.stops.push(StopOnestopId {
                        feed_version_id: 0,
                        stop_id: entity_id.to_string(),
                        onestop_id: format!("s-{geohash}-{name}"),
                    });
                }
            }
            Entity::Route(route) => {
                let name = route.display_name().unwrap_or_default();
                self.route_names.insert(entity_id.to_string(), name.to_string());
            }
            Entity::Agency(agency) => {
                self.agency_names
                    .insert(entity_id.to_string(), agency.agency_name.clone());
            }
            _ => {}
        }
        Ok(())
    }
}

impl Finalizer for OnestopIdBuilder {
    fn finalize(&mut self, ctx: &mut FinalizeContext<'_>) -> Result<(), CopierError> {
        let stops: Vec<Entity> = std::mem::take(&mut self.stops)
            .into_iter()
            .map(Entity::from)
            .collect();
        let stop_count = stops.len();
        ctx.write_all(stops)?;

        let route_stops = self.visits.route_stops();
        let mut routes: Vec<Entity> = vec![];
        for (route_id, name) in self.route_names.iter() {
            let stop_ids = route_stops
                .get(route_id.as_str())
                .into_iter()
                .flatten()
                .map(|s| s.to_string());
            match self.consensus_id("r", name, stop_ids, ctx.geom_cache)? {
                Some(onestop_id) => routes.push(
                    RouteOnestopId {
                        feed_version_id: 0,
                        route_id: route_id.clone(),
                        onestop_id,
                    }
                    .into(),
                ),
                None => log::warn!("route '{route_id}' has no located stops, skipping onestop id"),
            }
        }
        let route_count = routes.len();
        ctx.write_all(routes)?;

        let agency_stops = self.visits.agency_stops();
        let mut agencies: Vec<Entity> = vec![];
        for (agency_id, name) in self.agency_names.iter() {
            let stop_ids = agency_stops
                .get(agency_id.as_str())
                .into_iter()
                .flatten()
                .map(|s| s.to_string());
            match self.consensus_id("o", name, stop_ids, ctx.geom_cache)? {
                Some(onestop_id) => agencies.push(
                    AgencyOnestopId {
                        feed_version_id: 0,
                        agency_id: agency_id.clone(),
                        onestop_id,
                    }
                    .into(),
                ),
                None => log::warn!("agency '{agency_id}' has no located stops, skipping onestop id"),
            }
        }
        let agency_count = agencies.len();
        ctx.write_all(agencies)?;

        log::info!("wrote onestop ids for {stop_count} stops, {route_count} routes, {agency_count} agencies");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MemoryWriter;
    use crate::copier::CopyResult;
    use tlimport_core::geom::StopGeom;
    use tlimport_core::model::gtfs::{Agency, Route, Stop, StopTime, Trip};

    #[test]
    fn test_onestop_ids_for_stops_routes_and_agencies() {
        let emap = EntityMap::new();
        let mut cache = GeomCache::new();
        let mut builder = OnestopIdBuilder::new().expect("patterns compile");
        let agency = Agency {
            agency_name: String::from("Metro Transit"),
            ..Default::default()
        };
        builder.after_write("1", &agency.into(), &emap).expect("ok");
        for (id, name, lon, lat) in [("1", "Café Central", -122.42, 37.77), ("2", "Main St", -122.41, 37.78)] {
            let stop = Stop {
                stop_id: id.to_string(),
                stop_name: Some(name.to_string()),
                stop_lon: Some(lon),
                stop_lat: Some(lat),
                ..Default::default()
            };
            cache.add_stop(id, StopGeom { point: Point::new(lon, lat), name: Some(name.to_string()) });
            builder.after_write(id, &stop.into(), &emap).expect("ok");
        }
        let route = Route {
            agency_id: String::from("1"),
            route_short_name: Some(String::from("N-Judah")),
            ..Default::default()
        };
        builder.after_write("1", &route.into(), &emap).expect("ok");
        let trip = Trip {
            route_id: String::from("1"),
            ..Default::default()
        };
        builder.after_write("1", &trip.into(), &emap).expect("ok");
        for stop_id in ["1", "2"] {
            let st = StopTime {
                trip_id: String::from("1"),
                stop_id: stop_id.to_string(),
                ..Default::default()
            };
            builder.after_write("", &st.into(), &emap).expect("ok");
        }

        let mut writer = MemoryWriter::new();
        let mut result = CopyResult::default();
        let mut ctx = FinalizeContext::new(7, &emap, &cache, &mut writer, &mut result);
        builder.finalize(&mut ctx).expect("finalize");

        let stops = writer.get(StopOnestopId::FILENAME);
        assert_eq!(stops.len(), 2);
        let Entity::StopOnestopId(first) = &stops[0].1 else {
            panic!("expected a stop onestop id");
        };
        assert_eq!(first.feed_version_id, 7);
        assert!(first.onestop_id.starts_with("s-9q8y"));
        assert!(first.onestop_id.ends_with("-cafecentral"));

        let routes = writer.get(RouteOnestopId::FILENAME);
        let Entity::RouteOnestopId(route) = &routes[0].1 else {
            panic!("expected a route onestop id");
        };
        assert!(route.onestop_id.starts_with("r-9q8"));
        assert!(route.onestop_id.ends_with("-n~judah"));
        assert_eq!(writer.count(AgencyOnestopId::FILENAME), 1);
    }
}
