use std::path::Path;

use clap::Subcommand;
use serde::{Deserialize, Serialize};

use crate::adapter::{CsvDirectoryWriter, GtfsArchive};
use crate::builder;
use crate::config::ImportConfiguration;
use crate::copier::{Copier, CopierError, CopierOptions};

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum ImportOperation {
    /// import a GTFS archive (.zip) or directory, writing every copied and
    /// derived record as csv
    Import {
        /// a GTFS .zip archive or a directory of GTFS .txt files
        #[arg(long)]
        input: String,
        /// directory receiving one csv per GTFS file and derived table
        #[arg(long)]
        output_directory: String,
        /// optional .toml or .json import configuration
        #[arg(long)]
        configuration_file: Option<String>,
        /// overrides the feed_version_id of the configuration
        #[arg(long)]
        feed_version_id: Option<i64>,
        /// replace existing csv files in the output directory
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
}

impl ImportOperation {
    pub fn run(&self) -> Result<(), CopierError> {
        match self {
            ImportOperation::Import {
                input,
                output_directory,
                configuration_file,
                feed_version_id,
                overwrite,
            } => {
                let mut conf = match configuration_file {
                    Some(f) => ImportConfiguration::try_from(f)?,
                    None => ImportConfiguration::default(),
                };
                if let Some(id) = feed_version_id {
                    conf.feed_version_id = *id;
                }
                import(input, output_directory, &conf, *overwrite)
            }
        }
    }
}

/// runs a single import with fresh builders, returning the terminal error
/// of the pass, if any.
pub fn import(
    input: &str,
    output_directory: &str,
    conf: &ImportConfiguration,
    overwrite: bool,
) -> Result<(), CopierError> {
    let mut reader = GtfsArchive::new(Path::new(input), conf.group_chunk_size, conf.read_ahead)?;
    let mut writer = CsvDirectoryWriter::new(Path::new(output_directory), overwrite)?;
    let extensions = builder::build_extensions(conf)?;
    let result = Copier::new(&mut reader, &mut writer, CopierOptions::from(conf), extensions).copy();
    result.log_summary();
    match result.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_writes_csv_directory() {
        let input = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("src")
            .join("resources")
            .join("test_feed");
        let output = std::env::temp_dir().join(format!("tlimport-op-{}", std::process::id()));
        let op = ImportOperation::Import {
            input: input.to_string_lossy().to_string(),
            output_directory: output.to_string_lossy().to_string(),
            configuration_file: None,
            feed_version_id: Some(9),
            overwrite: true,
        };
        op.run().expect("import succeeds");
        let trips = std::fs::read_to_string(output.join("trips.txt")).expect("trips written");
        assert_eq!(trips.lines().count(), 11);
        let geometries =
            std::fs::read_to_string(output.join("tl_route_geometries.csv")).expect("geometries written");
        assert!(geometries.lines().nth(1).is_some_and(|l| l.starts_with("9,")));
        std::fs::remove_dir_all(&output).expect("cleanup");
    }
}
