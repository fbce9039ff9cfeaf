use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::QuoteStyle;
use tlimport_core::model::Entity;

use super::writer::Writer;
use crate::copier::CopierError;

/// writes one csv file per GTFS file or derived table in an output directory.
/// source entities keep their original identifiers; entities without an
/// identifier are assigned their row number.
pub struct CsvDirectoryWriter {
    directory: PathBuf,
    overwrite: bool,
    writers: HashMap<&'static str, (csv::Writer<BufWriter<File>>, usize)>,
}

impl CsvDirectoryWriter {
    pub fn new(directory: &Path, overwrite: bool) -> Result<CsvDirectoryWriter, CopierError> {
        if !directory.is_dir() {
            std::fs::create_dir_all(directory).map_err(|e| {
                CopierError::ConfigurationError(format!(
                    "unable to create directory {}: {e}",
                    directory.display()
                ))
            })?;
        }
        Ok(CsvDirectoryWriter {
            directory: directory.to_path_buf(),
            overwrite,
            writers: HashMap::new(),
        })
    }

    /// source files keep their .txt name, derived tables are written as .csv.
    fn output_filename(file: &str) -> String {
        if file.ends_with(".txt") {
            file.to_string()
        } else {
            format!("{file}.csv")
        }
    }

    fn create_writer(&self, file: &str) -> Result<csv::Writer<BufWriter<File>>, CopierError> {
        let filepath = self.directory.join(CsvDirectoryWriter::output_filename(file));
        if filepath.exists() && !self.overwrite {
            return Err(CopierError::WriterError {
                file: file.to_string(),
                message: format!("{} exists and overwrite is false", filepath.display()),
            });
        }
        let file = File::create(filepath)?;
        let writer = csv::WriterBuilder::new()
            .has_headers(true)
            .quote_style(QuoteStyle::Necessary)
            .from_writer(BufWriter::new(file));
        Ok(writer)
    }
}

impl Writer for CsvDirectoryWriter {
    fn add_entity(&mut self, entity: &Entity) -> Result<String, CopierError> {
        let file = entity.filename();
        if !self.writers.contains_key(file) {
            let writer = self.create_writer(file)?;
            self.writers.insert(file, (writer, 0));
        }
        let (writer, rows) = self
            .writers
            .get_mut(file)
            .ok_or_else(|| CopierError::InternalError(format!("missing writer for {file}")))?;
        writer
            .serialize(entity)
            .map_err(|source| CopierError::CsvWriteError {
                file: file.to_string(),
                source,
            })?;
        *rows += 1;
        match entity.entity_id() {
            "" => Ok(rows.to_string()),
            id => Ok(id.to_string()),
        }
    }

    fn flush(&mut self) -> Result<(), CopierError> {
        for (writer, _) in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlimport_core::model::derived::RouteStop;
    use tlimport_core::model::gtfs::Agency;

    #[test]
    fn test_writes_source_and_derived_files() {
        let dir = std::env::temp_dir().join(format!("tlimport-csv-writer-{}", std::process::id()));
        let mut writer = CsvDirectoryWriter::new(&dir, true).expect("create output directory");
        let agency = Agency {
            agency_id: String::from("A"),
            agency_name: String::from("Metro, Inc"),
            agency_url: String::from("https://example.com"),
            agency_timezone: String::from("America/Denver"),
            ..Default::default()
        };
        let id = writer.add_entity(&agency.into()).expect("write agency");
        assert_eq!(id, "A");
        let route_stop = RouteStop {
            feed_version_id: 1,
            route_id: String::from("1"),
            agency_id: String::from("A"),
            stop_id: String::from("2"),
        };
        writer.add_entity(&route_stop.into()).expect("write route stop");
        writer.flush().expect("flush");

        let agency_csv = std::fs::read_to_string(dir.join("agency.txt")).expect("agency.txt");
        let mut lines = agency_csv.lines();
        assert_eq!(
            lines.next(),
            Some("agency_id,agency_name,agency_url,agency_timezone,agency_lang,agency_phone,agency_fare_url,agency_email")
        );
        assert_eq!(
            lines.next(),
            Some("A,\"Metro, Inc\",https://example.com,America/Denver,,,,")
        );
        let route_stops = std::fs::read_to_string(dir.join("tl_route_stops.csv")).expect("route stops");
        assert_eq!(route_stops, "feed_version_id,route_id,agency_id,stop_id\n1,1,A,2\n");
        let _ = std::fs::remove_dir_all(dir);
    }
}
