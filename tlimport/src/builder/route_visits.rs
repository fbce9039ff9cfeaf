use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tlimport_core::model::Entity;

/// which stops are visited by each route, assembled from written routes,
/// trips and stop times. every builder that needs it keeps its own copy.
#[derive(Debug, Default)]
pub struct RouteVisits {
    route_agency: HashMap<String, String>,
    trip_route: HashMap<String, String>,
    route_stops: HashMap<String, HashSet<String>>,
}

impl RouteVisits {
    /// records a written entity. `entity_id` is the assigned identifier and
    /// the entity's references are already rewritten.
    pub fn observe(&mut self, entity_id: &str, entity: &Entity) {
        match entity {
            Entity::Route(route) => {
                self.route_agency
                    .insert(entity_id.to_string(), route.agency_id.clone());
            }
            Entity::Trip(trip) => {
                self.trip_route
                    .insert(entity_id.to_string(), trip.route_id.clone());
            }
            Entity::StopTime(st) => {
                if let Some(route_id) = self.trip_route.get(&st.trip_id) {
                    let stops = self.route_stops.entry(route_id.clone()).or_default();
                    if !stops.contains(&st.stop_id) {
                        stops.insert(st.stop_id.clone());
                    }
                }
            }
            _ => {}
        }
    }

    pub fn agency_of(&self, route_id: &str) -> Option<&str> {
        self.route_agency.get(route_id).map(String::as_str)
    }

    /// stops visited by each route, ordered by route and stop id.
    pub fn route_stops(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        self.route_stops
            .iter()
            .map(|(route, stops)| {
                (
                    route.as_str(),
                    stops.iter().map(String::as_str).collect(),
                )
            })
            .collect()
    }

    /// stops visited by the routes of each agency, ordered by agency and stop id.
    pub fn agency_stops(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut result: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (route, stops) in self.route_stops.iter() {
            if let Some(agency) = self.agency_of(route) {
                result
                    .entry(agency)
                    .or_default()
                    .extend(stops.iter().map(String::as_str));
            }
        }
        result
    }
}
