//! Fatal error reporting

use crate::error::Error;
use tracing::error;

/// Print a fatal error and exit with status 1
///
/// - `verbose = 0`: the message and its immediate cause
/// - `verbose >= 1`: the full error chain
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);
    eprintln!("Error: {error}");

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    } else if let Some(cause) = error.chain().nth(1) {
        eprintln!("Caused by: {cause}");
    }

    match error.downcast_ref::<Error>() {
        Some(Error::Config(_)) => eprintln!("Check the file passed with --config"),
        Some(e) if e.is_fatal() => eprintln!("No workflow files were processed"),
        _ => {}
    }

    std::process::exit(1)
}
