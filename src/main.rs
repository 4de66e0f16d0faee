// Entrypoint: set up logging, then parse the command line and dispatch.

use scicat_ingest::{cli, logging};

fn main() {
    logging::init_logging();

    if let Err(err) = cli::run_from_args() {
        eprintln!("scicat-ingest error: {:#}", err);
        std::process::exit(1);
    }
}
