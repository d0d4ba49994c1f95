use clap::Parser;
use trafd_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible.
    let logging_ready = match logging::init_logging(cli.verbose) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("trafd: {:#}", err);
            false
        }
    };

    if let Err(err) = cli.run().await {
        if logging_ready {
            tracing::error!("{:#}", err);
        } else {
            eprintln!("trafd error: {:#}", err);
        }
        std::process::exit(1);
    }
}
