//! geometries are written as WKT strings so that they fit in a single csv column.
use serde::Serializer;
use wkt::ToWkt;

pub fn serialize<G, S>(geometry: &G, serializer: S) -> Result<S::Ok, S::Error>
where
    G: ToWkt<f64>,
    S: Serializer,
{
    serializer.serialize_str(&geometry.wkt_string())
}
