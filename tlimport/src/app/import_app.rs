use super::ImportOperation;
use clap::Parser;

/// command line tool for importing a static GTFS feed version
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct ImportApp {
    #[command(subcommand)]
    pub op: ImportOperation,
}
