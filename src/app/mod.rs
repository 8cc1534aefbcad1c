//! Application module
//!
//! Binary-level concerns shared by every subcommand:
//! - Verbosity and log filter selection
//! - Logging setup
//! - Fatal error reporting

pub mod config;
pub mod error_handling;
pub mod logging;

pub use config::AppConfig;
pub use error_handling::handle_fatal_error;
pub use logging::init_logging;
