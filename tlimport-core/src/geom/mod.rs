//! point and polyline storage for stops and shapes, along with the
//! projection and interpolation routines used to fill in missing stop times.
mod geom_cache;
mod geom_error;
mod interpolate;
pub mod line_ops;
mod shape_info;

pub use geom_cache::{GeomCache, StopGeom};
pub use geom_error::GeomError;
pub use interpolate::interpolate_gaps;
pub use shape_info::ShapeInfo;
