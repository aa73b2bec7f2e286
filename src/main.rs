//! tsv-export command-line tool
//!
//! Streams JSON Lines records into delimited text suitable for bulk loading.
//!
//! # Usage
//!
//! ```bash
//! # Export to a file
//! tsv-export rows.jsonl -s id:bigint,name:text,created:timestamp -o rows.tsv
//!
//! # Read stdin, write stdout
//! cat rows.jsonl | tsv-export -s id:int,name:text > rows.tsv
//! ```

use tracing::Level;

use tsv_export::cli::CliInterface;
use tsv_export::error::Result;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or run the export
///
/// # Returns
/// * `Result<()>` - Success or error
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    cli.run_export()?;
    Ok(())
}

/// Initialize logging system
///
/// Logs go to stderr so they never mix with exported rows on stdout.
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
