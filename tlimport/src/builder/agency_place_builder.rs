use std::collections::BTreeMap;

use tlimport_core::emap::EntityMap;
use tlimport_core::model::derived::AgencyPlace;
use tlimport_core::model::Entity;

use super::{PlaceIndex, RouteVisits};
use crate::copier::{AfterWrite, CopierError, Extension, FinalizeContext, Finalizer};

type PlaceKey<'a> = (Option<&'a str>, Option<&'a str>, Option<&'a str>);

/// relates each agency to the places its stops fall in. the join of stops
/// against places runs once per agency at finalization.
pub struct AgencyPlaceBuilder {
    places: PlaceIndex,
    visits: RouteVisits,
}

impl AgencyPlaceBuilder {
    pub fn new(places: PlaceIndex) -> AgencyPlaceBuilder {
        AgencyPlaceBuilder {
            places,
            visits: RouteVisits::default(),
        }
    }
}

impl Extension for AgencyPlaceBuilder {
    fn name(&self) -> &str {
        "agency_place_builder"
    }

    fn as_after_write(&mut self) -> Option<&mut dyn AfterWrite> {
        Some(self)
    }

    fn as_finalizer(&mut self) -> Option<&mut dyn Finalizer> {
        Some(self)
    }
}

impl AfterWrite for AgencyPlaceBuilder {
    fn after_write(&mut self, entity_id: &str, entity: &Entity, _emap: &EntityMap) -> Result<(), CopierError> {
        self.visits.observe(entity_id, entity);
        Ok(())
    }
}

impl Finalizer for AgencyPlaceBuilder {
    fn finalize(&mut self, ctx: &mut FinalizeContext<'_>) -> Result<(), CopierError> {
        let mut records: Vec<Entity> = vec![];
        for (agency_id, stops) in self.visits.agency_stops() {
            let points: Vec<_> = stops
                .iter()
                .filter_map(|id| ctx.geom_cache.get_stop(id))
                .map(|s| s.point)
                .collect();
            if points.is_empty() {
                log::warn!("agency '{agency_id}' has no located stops, skipping places");
                continue;
            }
            let mut counts: BTreeMap<PlaceKey, usize> = BTreeMap::new();
            for point in points.iter() {
                for place in self.places.places_at(*point) {
                    let key = (
                        place.name.as_deref(),
                        place.adm0_name.as_deref(),
                        place.adm1_name.as_deref(),
                    );
                    *counts.entry(key).or_default() += 1;
                }
            }
            log::debug!(
                "agency '{agency_id}': {} stops in {} places",
                points.len(),
                counts.len()
            );
            for ((name, adm0_name, adm1_name), count) in counts {
                records.push(
                    AgencyPlace {
                        feed_version_id: 0,
                        agency_id: agency_id.to_string(),
                        name: name.map(String::from),
                        adm0_name: adm0_name.map(String::from),
                        adm1_name: adm1_name.map(String::from),
                        rank: count as f64 / points.len() as f64,
                    }
                    .into(),
                );
            }
        }
        log::info!("writing {} agency places", records.len());
        ctx.write_all(records)?;
        Ok(())
    }
}
