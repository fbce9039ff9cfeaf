use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use rayon::prelude::*;
use tlimport_core::emap::EntityMap;
use tlimport_core::model::derived::RouteHeadway;
use tlimport_core::model::gtfs::{Calendar, ExceptionType};
use tlimport_core::model::Entity;

use super::service_ops::{self, SATURDAY, SERVICE_WINDOW_DAYS, SUNDAY, WEEKDAY};
use crate::copier::{AfterWrite, CopierError, Extension, FinalizeContext, Finalizer};

/// morning window, in seconds after midnight, in which departure gaps are measured.
const MORNING_START: u32 = 6 * 3600;
const MORNING_END: u32 = 10 * 3600;
/// fewer gaps than this produce no headway statistic.
const MIN_GAPS: usize = 3;

/// summarizes how often each route departs its busiest stop, per direction
/// and day-of-week category.
#[derive(Debug, Default)]
pub struct RouteHeadwayBuilder {
    calendars: HashMap<String, Calendar>,
    exceptions: HashMap<String, Vec<(NaiveDate, ExceptionType)>>,
    trips: HashMap<String, TripKey>,
    routes: HashMap<String, RouteDepartures>,
}

#[derive(Debug)]
struct TripKey {
    route_id: String,
    service_id: String,
    direction_id: i32,
}

#[derive(Debug, Default)]
struct RouteDepartures {
    /// service -> trip count
    service_trips: HashMap<String, usize>,
    /// (direction, service) -> stop -> departure seconds
    departures: HashMap<(i32, String), HashMap<String, Vec<u32>>>,
}

/// gap statistics in seconds.
#[derive(Debug, PartialEq, Eq)]
pub struct HeadwayStats {
    pub min: u32,
    pub median: u32,
    pub max: u32,
}

impl Extension for RouteHeadwayBuilder {
    fn name(&self) -> &str {
        "route_headway_builder"
    }

    fn as_after_write(&mut self) -> Option<&mut dyn AfterWrite> {
        Some(self)
    }

    fn as_finalizer(&mut self) -> Option<&mut dyn Finalizer> {
        Some(self)
    }
}

impl AfterWrite for RouteHeadwayBuilder {
    fn after_write(&mut self, entity_id: &str, entity: &Entity, _emap: &EntityMap) -> Result<(), CopierError> {
        match entity {
            Entity::Calendar(calendar) => {
                self.calendars.insert(entity_id.to_string(), calendar.clone());
            }
            Entity::CalendarDate(cd) => {
                if let Some(exception) = cd.exception() {
                    self.exceptions
                        .entry(cd.service_id.clone())
                        .or_default()
                        .push((cd.date, exception));
                }
            }
            Entity::Trip(trip) => {
                *self
                    .routes
                    .entry(trip.route_id.clone())
                    .or_default()
                    .service_trips
                    .entry(trip.service_id.clone())
                    .or_default() += 1;
                self.trips.insert(
                    entity_id.to_string(),
                    TripKey {
                        route_id: trip.route_id.clone(),
                        service_id: trip.service_id.clone(),
                        direction_id: trip.direction(),
                    },
                );
            }
            Entity::StopTime(st) => {
                let (Some(key), Some(time)) =
                    (self.trips.get(&st.trip_id), st.departure_time.or(st.arrival_time))
                else {
                    return Ok(());
                };
                self.routes
                    .entry(key.route_id.clone())
                    .or_default()
                    .departures
                    .entry((key.direction_id, key.service_id.clone()))
                    .or_default()
                    .entry(st.stop_id.clone())
                    .or_default()
                    .push(time.seconds());
            }
            _ => {}
        }
        Ok(())
    }
}

impl Finalizer for RouteHeadwayBuilder {
    fn finalize(&mut self, ctx: &mut FinalizeContext<'_>) -> Result<(), CopierError> {
        let service_ids: BTreeSet<&String> = self
            .calendars
            .keys()
            .chain(self.exceptions.keys())
            .collect();
        let mut service_dates: HashMap<&str, BTreeSet<NaiveDate>> = HashMap::new();
        for service_id in service_ids {
            let exceptions = self
                .exceptions
                .get(service_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let dates = service_ops::service_dates(
                self.calendars.get(service_id),
                exceptions,
                SERVICE_WINDOW_DAYS,
            );
            service_dates.insert(service_id.as_str(), dates);
        }

        let mut route_ids: Vec<&String> = self.routes.keys().collect();
        route_ids.sort();
        let headways: Vec<Vec<RouteHeadway>> = route_ids
            .par_iter()
            .map(|route_id| route_headways(route_id, &self.routes[*route_id], &service_dates))
            .collect();

        let mut count = 0;
        for headway in headways.into_iter().flatten() {
            ctx.write(headway)?;
            count += 1;
        }
        log::info!("wrote {count} route headways");
        Ok(())
    }
}

fn route_headways(
    route_id: &str,
    route: &RouteDepartures,
    service_dates: &HashMap<&str, BTreeSet<NaiveDate>>,
) -> Vec<RouteHeadway> {
    let mut day_counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (service_id, trips) in route.service_trips.iter() {
        for date in service_dates.get(service_id.as_str()).into_iter().flatten() {
            *day_counts.entry(*date).or_default() += trips;
        }
    }
    let directions: BTreeSet<i32> = route.departures.keys().map(|(d, _)| *d).collect();

    let mut result = vec![];
    for (category, date) in select_category_dates(&day_counts) {
        for direction_id in directions.iter() {
            let mut stop_departures: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
            for ((dir, service_id), stops) in route.departures.iter() {
                let active = service_dates
                    .get(service_id.as_str())
                    .is_some_and(|dates| dates.contains(&date));
                if dir != direction_id || !active {
                    continue;
                }
                for (stop_id, times) in stops.iter() {
                    stop_departures
                        .entry(stop_id.as_str())
                        .or_default()
                        .extend(times.iter().copied());
                }
            }
            let Some((stop_id, mut departures)) = busiest_stop(stop_departures) else {
                log::debug!("route '{route_id}' direction {direction_id} has no departures on {date}");
                continue;
            };
            departures.sort_unstable();
            let stats = headway_stats(&departures);
            result.push(RouteHeadway {
                feed_version_id: 0,
                route_id: route_id.to_string(),
                selected_stop_id: stop_id.to_string(),
                direction_id: *direction_id,
                dow_category: category,
                service_date: date,
                stop_trip_count: departures.len(),
                headway_secs: stats.as_ref().map(|s| s.median),
                headway_min_secs: stats.as_ref().map(|s| s.min),
                headway_max_secs: stats.as_ref().map(|s| s.max),
                departures,
            });
        }
    }
    result
}

/// for each day-of-week category, the earliest date with the highest trip count.
pub fn select_category_dates(day_counts: &BTreeMap<NaiveDate, usize>) -> BTreeMap<i32, NaiveDate> {
    let mut best: BTreeMap<i32, (NaiveDate, usize)> = BTreeMap::new();
    for (date, count) in day_counts.iter() {
        if *count == 0 {
            continue;
        }
        let category = service_ops::dow_category(date);
        let better = match best.get(&category) {
            Some((_, best_count)) => *count > *best_count,
            None => true,
        };
        if better {
            best.insert(category, (*date, *count));
        }
    }
    [WEEKDAY, SATURDAY, SUNDAY]
        .into_iter()
        .filter_map(|c| best.get(&c).map(|(date, _)| (c, *date)))
        .collect()
}

/// the stop with the most departures. ties go to the smallest stop id.
fn busiest_stop(stops: BTreeMap<&str, Vec<u32>>) -> Option<(&str, Vec<u32>)> {
    let mut best: Option<(&str, Vec<u32>)> = None;
    for (stop_id, departures) in stops {
        let better = match &best {
            Some((_, b)) => departures.len() > b.len(),
            None => !departures.is_empty(),
        };
        if better {
            best = Some((stop_id, departures));
        }
    }
    best
}

/// min, median and max gap between consecutive sorted departures inside the
/// morning window. the median of an even sample is the upper middle value.
pub fn headway_stats(sorted_departures: &[u32]) -> Option<HeadwayStats> {
    let morning: Vec<u32> = sorted_departures
        .iter()
        .copied()
        .filter(|t| (MORNING_START..=MORNING_END).contains(t))
        .collect();
    let mut gaps: Vec<u32> = morning.windows(2).map(|w| w[1] - w[0]).collect();
    if gaps.len() < MIN_GAPS {
        return None;
    }
    gaps.sort_unstable();
    Some(HeadwayStats {
        min: gaps[0],
        median: gaps[gaps.len() / 2],
        max: gaps[gaps.len() - 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlimport_core::model::gtfs::{StopTime, Trip};
    use tlimport_core::model::WideTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_fewer_than_three_gaps_has_no_statistic() {
        let departures = vec![6 * 3600, 6 * 3600 + 600, 6 * 3600 + 1200];
        assert_eq!(headway_stats(&departures), None);
    }

    #[test]
    fn test_gaps_outside_morning_ignored() {
        let departures = vec![
            5 * 3600,
            6 * 3600,
            6 * 3600 + 600,
            6 * 3600 + 1500,
            6 * 3600 + 2100,
            6 * 3600 + 3300,
            11 * 3600,
        ];
        let stats = headway_stats(&departures).expect("four morning gaps");
        assert_eq!(
            stats,
            HeadwayStats {
                min: 600,
                median: 900,
                max: 1200
            }
        );
    }

    #[test]
    fn test_category_tie_picks_earlier_date() {
        let mut counts = BTreeMap::new();
        // 2024-03-04 and 2024-03-05 are weekdays with the same trip count
        counts.insert(date(2024, 3, 5), 10);
        counts.insert(date(2024, 3, 4), 10);
        counts.insert(date(2024, 3, 6), 4);
        counts.insert(date(2024, 3, 9), 2);
        let selected = select_category_dates(&counts);
        assert_eq!(selected.get(&WEEKDAY), Some(&date(2024, 3, 4)));
        assert_eq!(selected.get(&SATURDAY), Some(&date(2024, 3, 9)));
        assert_eq!(selected.get(&SUNDAY), None);
    }

    #[test]
    fn test_busiest_stop_tie_picks_smallest_id() {
        let mut stops = BTreeMap::new();
        stops.insert("b", vec![1, 2]);
        stops.insert("a", vec![3, 4]);
        stops.insert("c", vec![5]);
        assert_eq!(busiest_stop(stops).map(|(id, _)| id), Some("a"));
    }

    #[test]
    fn test_route_headway_from_written_entities() {
        let emap = EntityMap::new();
        let mut builder = RouteHeadwayBuilder::default();
        let mut calendar = Calendar::generated("wk", date(2024, 3, 4));
        calendar.monday = true;
        calendar.tuesday = true;
        calendar.end_date = date(2024, 3, 31);
        builder.after_write("wk", &calendar.into(), &emap).expect("ok");
        for i in 0..5u32 {
            let trip_id = format!("t{i}");
            let trip = Trip {
                trip_id: trip_id.clone(),
                route_id: String::from("r1"),
                service_id: String::from("wk"),
                ..Default::default()
            };
            builder.after_write(&trip_id, &trip.into(), &emap).expect("ok");
            for (stop_id, offset) in [("s1", 0), ("s2", 300)] {
                let st = StopTime {
                    trip_id: trip_id.clone(),
                    stop_id: stop_id.to_string(),
                    departure_time: Some(WideTime::from_seconds(7 * 3600 + i * 600 + offset)),
                    ..Default::default()
                };
                builder.after_write("", &st.into(), &emap).expect("ok");
            }
        }
        let dates: HashMap<&str, BTreeSet<NaiveDate>> = builder
            .calendars
            .iter()
            .map(|(id, c)| {
                let d = service_ops::service_dates(Some(c), &[], SERVICE_WINDOW_DAYS);
                (id.as_str(), d)
            })
            .collect();
        let headways = route_headways("r1", &builder.routes["r1"], &dates);
        assert_eq!(headways.len(), 1);
        let h = &headways[0];
        assert_eq!(h.dow_category, WEEKDAY);
        assert_eq!(h.service_date, date(2024, 3, 4));
        assert_eq!(h.selected_stop_id, "s1");
        assert_eq!(h.stop_trip_count, 5);
        assert_eq!(h.headway_secs, Some(600));
    }
}
