use tlimport_core::emap::EntityMap;
use tlimport_core::model::derived::RouteStop;
use tlimport_core::model::Entity;

use super::RouteVisits;
use crate::copier::{AfterWrite, CopierError, Extension, FinalizeContext, Finalizer};

/// writes one (route, agency, stop) record for each stop a route visits.
#[derive(Debug, Default)]
pub struct RouteStopBuilder {
    visits: RouteVisits,
}

impl Extension for RouteStopBuilder {
    fn name(&self) -> &str {
        "route_stop_builder"
    }

    fn as_after_write(&mut self) -> Option<&mut dyn AfterWrite> {
        Some(self)
    }

    fn as_finalizer(&mut self) -> Option<&mut dyn Finalizer> {
        Some(self)
    }
}

impl AfterWrite for RouteStopBuilder {
    fn after_write(&mut self, entity_id: &str, entity: &Entity, _emap: &EntityMap) -> Result<(), CopierError> {
        self.visits.observe(entity_id, entity);
        Ok(())
    }
}

impl Finalizer for RouteStopBuilder {
    fn finalize(&mut self, ctx: &mut FinalizeContext<'_>) -> Result<(), CopierError> {
        let mut records: Vec<Entity> = vec![];
        for (route_id, stops) in self.visits.route_stops() {
            let Some(agency_id) = self.visits.agency_of(route_id) else {
                log::warn!("route '{route_id}' has no agency, skipping route stops");
                continue;
            };
            records.extend(stops.into_iter().map(|stop_id| {
                Entity::from(RouteStop {
                    feed_version_id: 0,
                    route_id: route_id.to_string(),
                    agency_id: agency_id.to_string(),
                    stop_id: stop_id.to_string(),
                })
            }));
        }
        log::info!("writing {} route stops", records.len());
        ctx.write_all(records)?;
        Ok(())
    }
}
