//! builders derive records from the entities written during an import. each
//! one observes the pass through [`crate::copier::AfterWrite`] and writes its
//! records when finalized.
mod agency_place_builder;
mod convex_hull_builder;
mod onestop_id_builder;
pub mod onestop_ops;
mod place_index;
mod route_geometry_builder;
mod route_headway_builder;
mod route_stop_builder;
mod route_visits;
pub mod service_ops;

use std::path::Path;

pub use agency_place_builder::AgencyPlaceBuilder;
pub use convex_hull_builder::{convex_hull, ConvexHullBuilder};
pub use onestop_id_builder::OnestopIdBuilder;
pub use place_index::{Place, PlaceIndex};
pub use route_geometry_builder::{select_shapes, RouteGeometryBuilder, ShapeSelection};
pub use route_headway_builder::{headway_stats, select_category_dates, HeadwayStats, RouteHeadwayBuilder};
pub use route_stop_builder::RouteStopBuilder;
pub use route_visits::RouteVisits;

use crate::config::{BuilderKind, ImportConfiguration};
use crate::copier::{CopierError, Extension};

/// constructs a fresh builder for each kind listed in the configuration, in
/// the order listed. the agency place builder is left out, with a warning,
/// when no places file is configured.
pub fn build_extensions(conf: &ImportConfiguration) -> Result<Vec<Box<dyn Extension>>, CopierError> {
    let mut extensions: Vec<Box<dyn Extension>> = vec![];
    for kind in conf.builders.iter() {
        let extension: Box<dyn Extension> = match kind {
            BuilderKind::RouteGeometry => Box::new(RouteGeometryBuilder::default()),
            BuilderKind::RouteHeadway => Box::new(RouteHeadwayBuilder::default()),
            BuilderKind::ConvexHull => Box::new(ConvexHullBuilder::default()),
            BuilderKind::OnestopId => Box::new(OnestopIdBuilder::new()?),
            BuilderKind::RouteStop => Box::new(RouteStopBuilder::default()),
            BuilderKind::AgencyPlace => match &conf.places_file {
                Some(f) => Box::new(AgencyPlaceBuilder::new(PlaceIndex::from_csv(Path::new(f))?)),
                None => {
                    log::warn!("no places_file configured, skipping agency place builder");
                    continue;
                }
            },
        };
        extensions.push(extension);
    }
    Ok(extensions)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use geo::Coord;
    use tlimport_core::model::derived::{
        AgencyGeometry, AgencyOnestopId, AgencyPlace, FeedVersionGeometry, RouteGeometry, RouteHeadway,
        RouteOnestopId, RouteStop, StopOnestopId,
    };
    use tlimport_core::model::gtfs::{Shape, StopTime, Trip};
    use tlimport_core::model::Entity;

    use super::*;
    use crate::adapter::{GtfsArchive, MemoryWriter};
    use crate::copier::{Copier, CopierOptions};

    fn resources() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join("resources")
    }

    fn import() -> MemoryWriter {
        let conf = ImportConfiguration {
            feed_version_id: 42,
            places_file: Some(resources().join("places.csv").to_string_lossy().to_string()),
            ..Default::default()
        };
        let mut archive =
            GtfsArchive::new(&resources().join("test_feed"), conf.group_chunk_size, conf.read_ahead)
                .expect("fixture exists");
        let mut writer = MemoryWriter::new();
        let extensions = build_extensions(&conf).expect("builders");
        assert_eq!(extensions.len(), BuilderKind::ALL.len());
        let result = Copier::new(&mut archive, &mut writer, CopierOptions::from(&conf), extensions).copy();
        assert!(result.is_ok(), "import failed: {:?}", result.error);
        assert_eq!(result.inserted_count(Trip::FILENAME), 10);
        assert_eq!(result.inserted_count(StopTime::FILENAME), 30);
        writer
    }

    #[test]
    fn test_import_route_geometry_prefers_busiest_shape() {
        let writer = import();
        let shape_ids: Vec<&str> = writer
            .get(Shape::FILENAME)
            .iter()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(shape_ids.len(), 2);

        let geometries = writer.get(RouteGeometry::FILENAME);
        assert_eq!(geometries.len(), 1);
        let Entity::RouteGeometry(g) = &geometries[0].1 else {
            panic!("expected a route geometry");
        };
        assert_eq!(g.feed_version_id, 42);
        assert!(!g.generated);
        // S1 ends at the castro stop, S2 at octavia
        assert_eq!(g.geometry.0.last(), Some(&Coord { x: -122.4050, y: 37.7730 }));
        assert_eq!(g.combined_geometry.0.len(), 2);
        assert_eq!(g.combined_geometry.0[0], g.geometry);
        assert_eq!(
            g.combined_geometry.0[1].0.last(),
            Some(&Coord { x: -122.4100, y: 37.7728 })
        );
    }

    #[test]
    fn test_import_route_headway() {
        let writer = import();
        let headways = writer.get(RouteHeadway::FILENAME);
        assert_eq!(headways.len(), 1);
        let Entity::RouteHeadway(h) = &headways[0].1 else {
            panic!("expected a route headway");
        };
        assert_eq!(h.dow_category, service_ops::WEEKDAY);
        assert_eq!(h.service_date.to_string(), "2024-01-01");
        assert_eq!(h.stop_trip_count, 10);
        assert_eq!(h.headway_min_secs, Some(300));
        assert_eq!(h.headway_secs, Some(900));
        assert_eq!(h.headway_max_secs, Some(1200));
    }

    #[test]
    fn test_import_agency_and_stop_records() {
        let writer = import();
        assert_eq!(writer.count(FeedVersionGeometry::FILENAME), 1);
        assert_eq!(writer.count(AgencyGeometry::FILENAME), 1);
        assert_eq!(writer.count(RouteStop::FILENAME), 4);
        assert_eq!(writer.count(StopOnestopId::FILENAME), 4);
        assert_eq!(writer.count(RouteOnestopId::FILENAME), 1);

        let Entity::AgencyOnestopId(agency) = &writer.get(AgencyOnestopId::FILENAME)[0].1 else {
            panic!("expected an agency onestop id");
        };
        assert!(agency.onestop_id.starts_with("o-9q8y"));
        assert!(agency.onestop_id.ends_with("-metrotransit"));

        let places: Vec<(Option<&str>, f64)> = writer
            .get(AgencyPlace::FILENAME)
            .iter()
            .filter_map(|(_, e)| match e {
                Entity::AgencyPlace(p) => Some((p.name.as_deref(), p.rank)),
                _ => None,
            })
            .collect();
        assert_eq!(places, vec![(Some("Castro"), 0.25), (Some("San Francisco West"), 0.75)]);
    }

    #[test]
    fn test_agency_place_builder_skipped_without_places() {
        let conf = ImportConfiguration::default();
        let extensions = build_extensions(&conf).expect("builders");
        let names: Vec<&str> = extensions.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                "route_geometry_builder",
                "route_headway_builder",
                "convex_hull_builder",
                "onestop_id_builder",
                "route_stop_builder"
            ]
        );
    }
}
