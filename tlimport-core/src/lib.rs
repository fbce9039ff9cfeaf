//! core data structures for importing a GTFS feed version: the entity model
//! written by the copier, the [`emap::EntityMap`] used to rewrite references
//! as entities are assigned new identifiers, and the [`geom::GeomCache`]
//! which supports stop time interpolation and derived geometries.
pub mod emap;
pub mod geom;
pub mod model;
pub mod util;
