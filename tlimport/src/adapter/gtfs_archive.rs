use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use csv::{ReaderBuilder, StringRecord};
use kdam::tqdm;
use serde::de::DeserializeOwned;
use tlimport_core::model::gtfs::{
    Agency, Calendar, CalendarDate, Route, Shape, Stop, StopTime, Trip,
};
use tlimport_core::model::Entity;
use zip::ZipArchive;

use super::gtfs_rows::{self, AgencyRow, CalendarDateRow, CalendarRow, RouteRow, ShapeRow, StopRow, StopTimeRow, TripRow};
use super::reader::{EntityCallback, Reader, StopTimeGroupCallback};
use crate::copier::CopierError;

/// where the files of a GTFS archive live.
#[derive(Debug, Clone)]
enum ArchiveSource {
    Directory(PathBuf),
    Zip(PathBuf),
}

impl ArchiveSource {
    /// opens a file of the archive and passes it to `f`. returns None when
    /// the archive has no such file. zip entries may be nested in a folder.
    fn with_file<T>(
        &self,
        filename: &str,
        f: impl FnOnce(&mut dyn Read) -> Result<T, CopierError>,
    ) -> Result<Option<T>, CopierError> {
        match self {
            ArchiveSource::Directory(dir) => {
                let path = dir.join(filename);
                if !path.is_file() {
                    return Ok(None);
                }
                let mut file = File::open(path)?;
                f(&mut file).map(Some)
            }
            ArchiveSource::Zip(path) => {
                let file = File::open(path)?;
                let mut archive = ZipArchive::new(file)?;
                let suffix = format!("/{filename}");
                let entry_name = archive
                    .file_names()
                    .find(|n| *n == filename || n.ends_with(&suffix))
                    .map(String::from);
                match entry_name {
                    None => Ok(None),
                    Some(name) => {
                        let mut entry = archive.by_name(&name)?;
                        f(&mut entry).map(Some)
                    }
                }
            }
        }
    }

    /// deserializes every row of a file. rows with too few columns are padded
    /// with empty values and bytes that are not UTF-8 are replaced, so that
    /// these problems surface as errors on the entity rather than dropping it.
    fn each_row<R: DeserializeOwned>(
        &self,
        filename: &str,
        callback: &mut dyn FnMut(R) -> Result<(), CopierError>,
    ) -> Result<(), CopierError> {
        let read_error = |source: csv::Error| CopierError::CsvReadError {
            file: filename.to_string(),
            source,
        };
        let found = self.with_file(filename, |file| {
            let mut rdr = ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .trim(csv::Trim::Headers)
                .from_reader(file);
            let headers = rdr.headers().map_err(read_error)?.clone();
            let rows = tqdm!(rdr.byte_records(), desc = format!("read {filename}"));
            for (idx, row) in rows.enumerate() {
                let raw = row.map_err(read_error)?;
                let mut record: StringRecord = raw.iter().map(String::from_utf8_lossy).collect();
                while record.len() < headers.len() {
                    record.push_field("");
                }
                match record.deserialize::<R>(Some(&headers)) {
                    Ok(r) => callback(r)?,
                    Err(e) => log::warn!("skipping malformed row {} of {filename}: {e}", idx + 1),
                }
            }
            eprintln!();
            Ok(())
        })?;
        if found.is_none() {
            log::debug!("archive has no {filename}");
        }
        Ok(())
    }

    /// groups rows sharing a key, emitting groups in order of each key's first
    /// appearance. at most `chunk_size` groups are held in memory at a time,
    /// so the file is read once to collect keys and once more per chunk.
    fn each_group<R, K>(
        &self,
        filename: &str,
        chunk_size: usize,
        key: K,
        callback: &mut dyn FnMut(String, Vec<R>) -> Result<(), CopierError>,
    ) -> Result<(), CopierError>
    where
        R: DeserializeOwned,
        K: Fn(&R) -> &str,
    {
        let mut keys: Vec<String> = vec![];
        let mut seen: HashSet<String> = HashSet::new();
        self.each_row(filename, &mut |row: R| {
            let k = key(&row);
            if !seen.contains(k) {
                seen.insert(k.to_string());
                keys.push(k.to_string());
            }
            Ok(())
        })?;
        drop(seen);

        for chunk in keys.chunks(chunk_size.max(1)) {
            let index: HashMap<&str, usize> = chunk
                .iter()
                .enumerate()
                .map(|(i, k)| (k.as_str(), i))
                .collect();
            let mut groups: Vec<Vec<R>> = chunk.iter().map(|_| vec![]).collect();
            self.each_row(filename, &mut |row: R| {
                if let Some(i) = index.get(key(&row)) {
                    groups[*i].push(row);
                }
                Ok(())
            })?;
            for (k, rows) in chunk.iter().zip(groups) {
                callback(k.clone(), rows)?;
            }
        }
        Ok(())
    }
}

/// reads a GTFS feed from a directory of .txt files or a .zip archive.
pub struct GtfsArchive {
    source: ArchiveSource,
    group_chunk_size: usize,
    read_ahead: usize,
}

impl GtfsArchive {
    pub fn new(path: &Path, group_chunk_size: usize, read_ahead: usize) -> Result<GtfsArchive, CopierError> {
        let source = if path.is_dir() {
            ArchiveSource::Directory(path.to_path_buf())
        } else if path.is_file() && path.extension().is_some_and(|e| e == "zip") {
            ArchiveSource::Zip(path.to_path_buf())
        } else {
            return Err(CopierError::ConfigurationError(format!(
                "input must be a directory or .zip file: {}",
                path.display()
            )));
        };
        Ok(GtfsArchive {
            source,
            group_chunk_size,
            read_ahead: read_ahead.max(1),
        })
    }
}

impl Reader for GtfsArchive {
    fn each(&mut self, file: &'static str, callback: EntityCallback<'_>) -> Result<(), CopierError> {
        match file {
            Agency::FILENAME => self
                .source
                .each_row(file, &mut |r: AgencyRow| callback(r.into())),
            Stop::FILENAME => self.source.each_row(file, &mut |r: StopRow| callback(r.into())),
            Route::FILENAME => self.source.each_row(file, &mut |r: RouteRow| callback(r.into())),
            Calendar::FILENAME => self
                .source
                .each_row(file, &mut |r: CalendarRow| callback(r.into())),
            CalendarDate::FILENAME => self
                .source
                .each_row(file, &mut |r: CalendarDateRow| callback(r.into())),
            Trip::FILENAME => self.source.each_row(file, &mut |r: TripRow| callback(r.into())),
            Shape::FILENAME => self.source.each_group(
                file,
                self.group_chunk_size,
                |r: &ShapeRow| r.shape_id.as_str(),
                &mut |shape_id, rows| callback(gtfs_rows::shape_from_rows(shape_id, rows)),
            ),
            StopTime::FILENAME => Err(CopierError::InternalError(String::from(
                "stop times are read by trip",
            ))),
            other => Err(CopierError::InternalError(format!(
                "unsupported GTFS file {other}"
            ))),
        }
    }

    fn stop_times_by_trip(&mut self, callback: StopTimeGroupCallback<'_>) -> Result<(), CopierError> {
        let source = self.source.clone();
        let chunk_size = self.group_chunk_size;
        let (tx, rx) = mpsc::sync_channel::<Result<Vec<StopTime>, CopierError>>(self.read_ahead);
        let handle = thread::spawn(move || {
            let result = source.each_group(
                StopTime::FILENAME,
                chunk_size,
                |r: &StopTimeRow| r.trip_id.as_str(),
                &mut |_, rows| {
                    let mut group: Vec<StopTime> = rows.into_iter().map(StopTime::from).collect();
                    group.sort_by_key(|st| st.stop_sequence);
                    tx.send(Ok(group))
                        .map_err(|e| CopierError::ReadAheadError(e.to_string()))
                },
            );
            if let Err(e) = result {
                // the receiver may already be gone, in which case the copier has its own error
                let _ = tx.send(Err(e));
            }
        });

        for group in rx {
            callback(group?)?;
        }
        handle
            .join()
            .map_err(|_| CopierError::ReadAheadError(String::from("stop time reader panicked")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlimport_core::model::EntityError;

    fn test_feed() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("src")
            .join("resources")
            .join("test_feed")
    }

    #[test]
    fn test_groups_stop_times_across_chunks() {
        let mut archive = GtfsArchive::new(&test_feed(), 1, 2).expect("fixture exists");
        let mut groups: Vec<(String, Vec<u32>)> = vec![];
        archive
            .stop_times_by_trip(&mut |g| {
                let trip_id = g[0].trip_id.clone();
                groups.push((trip_id, g.iter().map(|st| st.stop_sequence).collect()));
                Ok(())
            })
            .expect("read stop times");
        assert_eq!(groups.len(), 10);
        for (_, seqs) in groups.iter() {
            assert!(seqs.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_reads_shapes_as_lines() {
        let mut archive = GtfsArchive::new(&test_feed(), 100, 2).expect("fixture exists");
        let mut shapes: Vec<(String, usize)> = vec![];
        archive
            .each(Shape::FILENAME, &mut |e| {
                if let Entity::Shape(s) = e {
                    shapes.push((s.shape_id, s.geometry.0.len()));
                }
                Ok(())
            })
            .expect("read shapes");
        assert_eq!(shapes, vec![(String::from("S1"), 3), (String::from("S2"), 3)]);
    }

    /// writes a single stop_times.txt to a fresh directory.
    fn stop_times_feed(name: &str, contents: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tlimport-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create feed directory");
        std::fs::write(dir.join(StopTime::FILENAME), contents).expect("write stop times");
        dir
    }

    fn read_groups(dir: &Path) -> Vec<Vec<StopTime>> {
        let mut archive = GtfsArchive::new(dir, 100, 2).expect("feed exists");
        let mut groups = vec![];
        archive
            .stop_times_by_trip(&mut |g| {
                groups.push(g);
                Ok(())
            })
            .expect("read stop times");
        groups
    }

    #[test]
    fn test_overflowing_time_becomes_parse_error() {
        let dir = stop_times_feed(
            "overflow",
            b"trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
              T1,2000000:00:00,2000000:00:00,a,1\n\
              T1,08:10:00,08:10:00,b,2\n\
              T2,08:00:00,08:00:00,a,1\n",
        );
        let groups = read_groups(&dir);
        assert_eq!(groups.len(), 2);
        let first = &groups[0][0];
        assert_eq!(first.trip_id, "T1");
        assert_eq!(first.arrival_time, None);
        assert_eq!(first.status.errors.len(), 2);
        assert!(matches!(
            first.status.errors[0],
            EntityError::ParseError { field: "arrival_time", .. }
        ));
        assert_eq!(groups[1][0].trip_id, "T2");
    }

    #[test]
    fn test_short_and_undecodable_rows_are_kept() {
        let dir = stop_times_feed(
            "short",
            b"trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
              T1,08:00:00,08:00:00,a,1\n\
              T1,08:10:00\n\
              T2,08:00:00,08:00:00,caf\xe9,1,extra\n",
        );
        let groups = read_groups(&dir);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        let short = &groups[0][0];
        assert_eq!(short.stop_id, "");
        assert_eq!(short.departure_time, None);
        assert!(short.status.errors.contains(&EntityError::RequiredField("stop_sequence")));
        assert_eq!(groups[0][1].stop_sequence, 1);
        assert_eq!(groups[1][0].stop_id, "caf\u{FFFD}");
        assert!(groups[1][0].status.errors.is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let mut archive = GtfsArchive::new(&test_feed(), 100, 2).expect("fixture exists");
        let mut count = 0;
        archive
            .each(CalendarDate::FILENAME, &mut |_| {
                count += 1;
                Ok(())
            })
            .expect("missing file is not an error");
        assert_eq!(count, 0);
    }
}
