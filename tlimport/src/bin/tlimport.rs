//! imports a GTFS archive or directory, writing source and derived records
//! as csv files to an output directory.
use clap::Parser;
use tlimport::app::ImportApp;

fn main() {
    env_logger::init();
    let args = ImportApp::parse();
    if let Err(e) = args.op.run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
