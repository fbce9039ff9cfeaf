//! imports a static GTFS feed version in a single pass. entities are read
//! from a [`adapter::Reader`], validated, re-identified and handed to a
//! [`adapter::Writer`], while registered builders observe the pass and
//! write derived records once the source is exhausted.
pub mod adapter;
pub mod app;
pub mod builder;
pub mod config;
pub mod copier;
