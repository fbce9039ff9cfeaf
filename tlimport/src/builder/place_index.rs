use std::path::Path;

use csv::ReaderBuilder;
use geo::{BoundingRect, Geometry, Intersects, MultiPolygon, Point};
use kdam::tqdm;
use rstar::{RTree, RTreeObject, AABB};
use serde::Deserialize;
use wkt::TryFromWkt;

use crate::copier::CopierError;

/// a row of the places file. `geometry` is a WKT POLYGON or MULTIPOLYGON.
#[derive(Debug, Deserialize)]
struct PlaceRow {
    name: Option<String>,
    adm0_name: Option<String>,
    adm1_name: Option<String>,
    geometry: String,
}

/// a named administrative area.
#[derive(Debug, Clone)]
pub struct Place {
    pub name: Option<String>,
    pub adm0_name: Option<String>,
    pub adm1_name: Option<String>,
    pub geometry: MultiPolygon<f64>,
    bbox: AABB<Point<f64>>,
}

impl RTreeObject for Place {
    type Envelope = AABB<Point<f64>>;

    fn envelope(&self) -> Self::Envelope {
        self.bbox
    }
}

impl TryFrom<PlaceRow> for Place {
    type Error = CopierError;

    fn try_from(row: PlaceRow) -> Result<Self, Self::Error> {
        let geometry: Geometry<f64> = Geometry::try_from_wkt_str(&row.geometry).map_err(|e| {
            CopierError::ConfigurationError(format!(
                "place '{}' has invalid WKT geometry: {e}",
                row.name.as_deref().unwrap_or_default()
            ))
        })?;
        let geometry = match geometry {
            Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            Geometry::MultiPolygon(mp) => mp,
            other => {
                return Err(CopierError::ConfigurationError(format!(
                    "place '{}' must be a POLYGON or MULTIPOLYGON, found {other:?}",
                    row.name.as_deref().unwrap_or_default()
                )))
            }
        };
        let Some(rect) = geometry.bounding_rect() else {
            return Err(CopierError::ConfigurationError(format!(
                "place '{}' has an empty geometry",
                row.name.as_deref().unwrap_or_default()
            )));
        };
        Ok(Place {
            bbox: AABB::from_corners(rect.min().into(), rect.max().into()),
            name: row.name,
            adm0_name: row.adm0_name,
            adm1_name: row.adm1_name,
            geometry,
        })
    }
}

/// spatial index over a set of places, queried by point.
pub struct PlaceIndex {
    lookup: RTree<Place>,
}

impl PlaceIndex {
    pub fn new(places: Vec<Place>) -> PlaceIndex {
        PlaceIndex {
            lookup: RTree::bulk_load(places),
        }
    }

    /// reads a csv with `name`, `adm0_name`, `adm1_name` and `geometry` columns.
    pub fn from_csv(path: &Path) -> Result<PlaceIndex, CopierError> {
        let file = path.to_string_lossy().to_string();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|source| CopierError::CsvReadError {
                file: file.clone(),
                source,
            })?;
        let mut places = vec![];
        for row in tqdm!(rdr.deserialize::<PlaceRow>(), desc = "read places") {
            let row = row.map_err(|source| CopierError::CsvReadError {
                file: file.clone(),
                source,
            })?;
            places.push(Place::try_from(row)?);
        }
        eprintln!();
        log::info!("loaded {} places from {file}", places.len());
        Ok(PlaceIndex::new(places))
    }

    /// places whose geometry contains or touches the point.
    pub fn places_at(&self, point: Point<f64>) -> impl Iterator<Item = &Place> + '_ {
        self.lookup
            .locate_in_envelope_intersecting(&AABB::from_point(point))
            .filter(move |place| place.geometry.intersects(&point))
    }

    pub fn len(&self) -> usize {
        self.lookup.size()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.size() == 0
    }
}
