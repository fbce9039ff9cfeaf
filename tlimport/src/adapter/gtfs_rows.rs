//! raw rows as they appear in a GTFS archive. every column is read as text
//! so that malformed values become parse errors on the resulting entity
//! instead of failing the read.
use std::str::FromStr;

use chrono::NaiveDate;
use geo::{Coord, LineString};
use serde::Deserialize;
use tlimport_core::model::gtfs::{
    Agency, Calendar, CalendarDate, Route, Shape, Stop, StopTime, Trip,
};
use tlimport_core::model::{Entity, EntityError, EntityStatus, WideTime};
use tlimport_core::util::date_codec;

/// collects parse errors while converting the fields of one row.
#[derive(Default)]
struct FieldParser {
    errors: Vec<EntityError>,
}

impl FieldParser {
    fn optional<T: FromStr>(&mut self, field: &'static str, value: &Option<String>) -> Option<T> {
        let v = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        match v.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.parse_error(field, v);
                None
            }
        }
    }

    fn required<T: FromStr + Default>(&mut self, field: &'static str, value: &Option<String>) -> T {
        match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            None => {
                self.errors.push(EntityError::RequiredField(field));
                T::default()
            }
            Some(_) => self.optional(field, value).unwrap_or_default(),
        }
    }

    /// GTFS booleans are the integers 0 and 1.
    fn flag(&mut self, field: &'static str, value: &Option<String>) -> bool {
        match self.required::<i32>(field, value) {
            0 => false,
            1 => true,
            other => {
                self.errors
                    .push(EntityError::invalid(field, other, "must be 0 or 1"));
                false
            }
        }
    }

    fn date(&mut self, field: &'static str, value: &Option<String>) -> NaiveDate {
        match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            None => {
                self.errors.push(EntityError::RequiredField(field));
                NaiveDate::default()
            }
            Some(v) => date_codec::parse_gtfs_date(v).unwrap_or_else(|| {
                self.parse_error(field, v);
                NaiveDate::default()
            }),
        }
    }

    fn time(&mut self, field: &'static str, value: &Option<String>) -> Option<WideTime> {
        let v = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let parsed = WideTime::parse(v);
        if parsed.is_none() {
            self.parse_error(field, v);
        }
        parsed
    }

    fn parse_error(&mut self, field: &'static str, value: &str) {
        self.errors.push(EntityError::ParseError {
            field,
            value: value.to_string(),
        });
    }

    fn into_status(self) -> EntityStatus {
        EntityStatus {
            errors: self.errors,
            warnings: vec![],
        }
    }
}

fn text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
pub struct AgencyRow {
    #[serde(default)]
    agency_id: Option<String>,
    #[serde(default)]
    agency_name: Option<String>,
    #[serde(default)]
    agency_url: Option<String>,
    #[serde(default)]
    agency_timezone: Option<String>,
    #[serde(default)]
    agency_lang: Option<String>,
    #[serde(default)]
    agency_phone: Option<String>,
    #[serde(default)]
    agency_fare_url: Option<String>,
    #[serde(default)]
    agency_email: Option<String>,
}

impl From<AgencyRow> for Entity {
    fn from(row: AgencyRow) -> Self {
        Entity::Agency(Agency {
            agency_id: row.agency_id.unwrap_or_default(),
            agency_name: row.agency_name.unwrap_or_default(),
            agency_url: row.agency_url.unwrap_or_default(),
            agency_timezone: row.agency_timezone.unwrap_or_default(),
            agency_lang: text(row.agency_lang),
            agency_phone: text(row.agency_phone),
            agency_fare_url: text(row.agency_fare_url),
            agency_email: text(row.agency_email),
            status: EntityStatus::default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StopRow {
    #[serde(default)]
    stop_id: Option<String>,
    #[serde(default)]
    stop_code: Option<String>,
    #[serde(default)]
    stop_name: Option<String>,
    #[serde(default)]
    stop_desc: Option<String>,
    #[serde(default)]
    stop_lat: Option<String>,
    #[serde(default)]
    stop_lon: Option<String>,
    #[serde(default)]
    zone_id: Option<String>,
    #[serde(default)]
    stop_url: Option<String>,
    #[serde(default)]
    location_type: Option<String>,
    #[serde(default)]
    parent_station: Option<String>,
    #[serde(default)]
    stop_timezone: Option<String>,
    #[serde(default)]
    wheelchair_boarding: Option<String>,
    #[serde(default)]
    platform_code: Option<String>,
}

impl From<StopRow> for Entity {
    fn from(row: StopRow) -> Self {
        let mut p = FieldParser::default();
        let stop_lat = p.optional("stop_lat", &row.stop_lat);
        let stop_lon = p.optional("stop_lon", &row.stop_lon);
        let location_type = p.optional("location_type", &row.location_type).unwrap_or(0);
        let wheelchair_boarding = p.optional("wheelchair_boarding", &row.wheelchair_boarding);
        Entity::Stop(Stop {
            stop_id: row.stop_id.unwrap_or_default(),
            stop_code: text(row.stop_code),
            stop_name: text(row.stop_name),
            stop_desc: text(row.stop_desc),
            stop_lat,
            stop_lon,
            zone_id: text(row.zone_id),
            stop_url: text(row.stop_url),
            location_type,
            parent_station: text(row.parent_station),
            stop_timezone: text(row.stop_timezone),
            wheelchair_boarding,
            platform_code: text(row.platform_code),
            status: p.into_status(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteRow {
    #[serde(default)]
    route_id: Option<String>,
    #[serde(default)]
    agency_id: Option<String>,
    #[serde(default)]
    route_short_name: Option<String>,
    #[serde(default)]
    route_long_name: Option<String>,
    #[serde(default)]
    route_desc: Option<String>,
    #[serde(default)]
    route_type: Option<String>,
    #[serde(default)]
    route_url: Option<String>,
    #[serde(default)]
    route_color: Option<String>,
    #[serde(default)]
    route_text_color: Option<String>,
    #[serde(default)]
    route_sort_order: Option<String>,
}

impl From<RouteRow> for Entity {
    fn from(row: RouteRow) -> Self {
        let mut p = FieldParser::default();
        let route_type = p.required("route_type", &row.route_type);
        let route_sort_order = p.optional("route_sort_order", &row.route_sort_order);
        Entity::Route(Route {
            route_id: row.route_id.unwrap_or_default(),
            agency_id: row.agency_id.unwrap_or_default(),
            route_short_name: text(row.route_short_name),
            route_long_name: text(row.route_long_name),
            route_desc: text(row.route_desc),
            route_type,
            route_url: text(row.route_url),
            route_color: text(row.route_color),
            route_text_color: text(row.route_text_color),
            route_sort_order,
            status: p.into_status(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CalendarRow {
    #[serde(default)]
    service_id: Option<String>,
    #[serde(default)]
    monday: Option<String>,
    #[serde(default)]
    tuesday: Option<String>,
    #[serde(default)]
    wednesday: Option<String>,
    #[serde(default)]
    thursday: Option<String>,
    #[serde(default)]
    friday: Option<String>,
    #[serde(default)]
    saturday: Option<String>,
    #[serde(default)]
    sunday: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

impl From<CalendarRow> for Entity {
    fn from(row: CalendarRow) -> Self {
        let mut p = FieldParser::default();
        let calendar = Calendar {
            monday: p.flag("monday", &row.monday),
            tuesday: p.flag("tuesday", &row.tuesday),
            wednesday: p.flag("wednesday", &row.wednesday),
            thursday: p.flag("thursday", &row.thursday),
            friday: p.flag("friday", &row.friday),
            saturday: p.flag("saturday", &row.saturday),
            sunday: p.flag("sunday", &row.sunday),
            start_date: p.date("start_date", &row.start_date),
            end_date: p.date("end_date", &row.end_date),
            service_id: row.service_id.unwrap_or_default(),
            generated: false,
            status: EntityStatus::default(),
        };
        Entity::Calendar(Calendar {
            status: p.into_status(),
            ..calendar
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CalendarDateRow {
    #[serde(default)]
    service_id: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    exception_type: Option<String>,
}

impl From<CalendarDateRow> for Entity {
    fn from(row: CalendarDateRow) -> Self {
        let mut p = FieldParser::default();
        let date = p.date("date", &row.date);
        let exception_type = p.required("exception_type", &row.exception_type);
        Entity::CalendarDate(CalendarDate {
            service_id: row.service_id.unwrap_or_default(),
            date,
            exception_type,
            status: p.into_status(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ShapeRow {
    #[serde(default)]
    pub shape_id: String,
    #[serde(default)]
    shape_pt_lat: Option<String>,
    #[serde(default)]
    shape_pt_lon: Option<String>,
    #[serde(default)]
    shape_pt_sequence: Option<String>,
    #[serde(default)]
    shape_dist_traveled: Option<String>,
}

/// assembles the rows of one shape_id into a single shape, ordered by
/// shape_pt_sequence. distances are kept only when every point has one.
pub fn shape_from_rows(shape_id: String, rows: Vec<ShapeRow>) -> Entity {
    let mut p = FieldParser::default();
    let mut points: Vec<(i64, Coord<f64>, Option<f64>)> = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        let seq: i64 = p.required("shape_pt_sequence", &row.shape_pt_sequence);
        let lat: Option<f64> = p.optional("shape_pt_lat", &row.shape_pt_lat);
        let lon: Option<f64> = p.optional("shape_pt_lon", &row.shape_pt_lon);
        let dist: Option<f64> = p.optional("shape_dist_traveled", &row.shape_dist_traveled);
        if let (Some(y), Some(x)) = (lat, lon) {
            points.push((seq, Coord { x, y }, dist));
        }
    }
    points.sort_by_key(|(seq, _, _)| *seq);
    let shape_dist_traveled: Option<Vec<f64>> = points.iter().map(|(_, _, d)| *d).collect();
    let geometry: LineString<f64> = points.into_iter().map(|(_, c, _)| c).collect();
    Entity::Shape(Shape {
        shape_id,
        geometry,
        shape_dist_traveled,
        generated: false,
        status: p.into_status(),
    })
}

#[derive(Debug, Deserialize)]
pub struct TripRow {
    #[serde(default)]
    route_id: Option<String>,
    #[serde(default)]
    service_id: Option<String>,
    #[serde(default)]
    trip_id: Option<String>,
    #[serde(default)]
    trip_headsign: Option<String>,
    #[serde(default)]
    trip_short_name: Option<String>,
    #[serde(default)]
    direction_id: Option<String>,
    #[serde(default)]
    block_id: Option<String>,
    #[serde(default)]
    shape_id: Option<String>,
    #[serde(default)]
    wheelchair_accessible: Option<String>,
    #[serde(default)]
    bikes_allowed: Option<String>,
}

impl From<TripRow> for Entity {
    fn from(row: TripRow) -> Self {
        let mut p = FieldParser::default();
        let direction_id = p.optional("direction_id", &row.direction_id);
        let wheelchair_accessible = p.optional("wheelchair_accessible", &row.wheelchair_accessible);
        let bikes_allowed = p.optional("bikes_allowed", &row.bikes_allowed);
        Entity::Trip(Trip {
            trip_id: row.trip_id.unwrap_or_default(),
            route_id: row.route_id.unwrap_or_default(),
            service_id: row.service_id.unwrap_or_default(),
            trip_headsign: text(row.trip_headsign),
            trip_short_name: text(row.trip_short_name),
            direction_id,
            block_id: text(row.block_id),
            shape_id: text(row.shape_id),
            wheelchair_accessible,
            bikes_allowed,
            status: p.into_status(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StopTimeRow {
    #[serde(default)]
    pub trip_id: String,
    #[serde(default)]
    arrival_time: Option<String>,
    #[serde(default)]
    departure_time: Option<String>,
    #[serde(default)]
    stop_id: Option<String>,
    #[serde(default)]
    stop_sequence: Option<String>,
    #[serde(default)]
    stop_headsign: Option<String>,
    #[serde(default)]
    pickup_type: Option<String>,
    #[serde(default)]
    drop_off_type: Option<String>,
    #[serde(default)]
    shape_dist_traveled: Option<String>,
    #[serde(default)]
    timepoint: Option<String>,
}

impl From<StopTimeRow> for StopTime {
    fn from(row: StopTimeRow) -> Self {
        let mut p = FieldParser::default();
        StopTime {
            stop_sequence: p.required("stop_sequence", &row.stop_sequence),
            arrival_time: p.time("arrival_time", &row.arrival_time),
            departure_time: p.time("departure_time", &row.departure_time),
            pickup_type: p.optional("pickup_type", &row.pickup_type),
            drop_off_type: p.optional("drop_off_type", &row.drop_off_type),
            shape_dist_traveled: p.optional("shape_dist_traveled", &row.shape_dist_traveled),
            timepoint: p.optional("timepoint", &row.timepoint),
            trip_id: row.trip_id,
            stop_id: row.stop_id.unwrap_or_default(),
            stop_headsign: text(row.stop_headsign),
            interpolated: false,
            status: p.into_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_stop_time_parse_errors_are_attached() {
        let row = StopTimeRow {
            trip_id: String::from("t1"),
            arrival_time: some("8:00"),
            departure_time: some("08:00:00"),
            stop_id: some("a"),
            stop_sequence: some("x"),
            stop_headsign: None,
            pickup_type: None,
            drop_off_type: None,
            shape_dist_traveled: some(""),
            timepoint: None,
        };
        let st = StopTime::from(row);
        assert_eq!(st.arrival_time, None);
        assert_eq!(st.departure_time, Some(WideTime::from_hms(8, 0, 0)));
        assert_eq!(st.shape_dist_traveled, None);
        assert_eq!(st.status.errors.len(), 2);
    }

    #[test]
    fn test_shape_rows_sorted_by_sequence() {
        let rows = vec![
            ShapeRow {
                shape_id: String::from("s"),
                shape_pt_lat: some("1.0"),
                shape_pt_lon: some("0.0"),
                shape_pt_sequence: some("2"),
                shape_dist_traveled: some("10"),
            },
            ShapeRow {
                shape_id: String::from("s"),
                shape_pt_lat: some("0.0"),
                shape_pt_lon: some("0.0"),
                shape_pt_sequence: some("1"),
                shape_dist_traveled: None,
            },
        ];
        match shape_from_rows(String::from("s"), rows) {
            Entity::Shape(shape) => {
                assert_eq!(shape.geometry.0[0], Coord { x: 0.0, y: 0.0 });
                assert_eq!(shape.geometry.0[1], Coord { x: 0.0, y: 1.0 });
                assert_eq!(shape.shape_dist_traveled, None);
                assert!(shape.status.errors.is_empty());
            }
            other => panic!("expected shape, found {other:?}"),
        }
    }
}
