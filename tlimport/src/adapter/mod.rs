//! sources and sinks for the copier.
mod csv_writer;
mod gtfs_archive;
mod gtfs_rows;
mod memory_reader;
mod memory_writer;
mod reader;
mod writer;

pub use csv_writer::CsvDirectoryWriter;
pub use gtfs_archive::GtfsArchive;
pub use memory_reader::MemoryReader;
pub use memory_writer::MemoryWriter;
pub use reader::{EntityCallback, Reader, StopTimeGroupCallback};
pub use writer::Writer;
