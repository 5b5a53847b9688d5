//! BoardGameGeek Cache Library
//!
//! This library provides functionality for fetching board game metadata and user
//! collections from the BoardGameGeek XML API and keeping them in a local,
//! time-bounded cache. It includes modules for API communication, the master game
//! table reconciliation, collection filtering, and the CLI operations built on top.
//!
//! # Modules
//!
//! - `bgg` - BoardGameGeek XML API client and parsers
//! - `catalog` - Discovery and refresh passes over the master game table
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `filter` - Predicate filtering over a user's collection
//! - `management` - Snapshot storage, state files and the collection owner
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use bggcache::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> bggcache::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod bgg;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod filter;
pub mod management;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the CLI glue where errors from several layers meet. Library
/// modules return their own error enums instead.
///
/// # Example
///
/// ```
/// use bggcache::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Example
///
/// ```
/// info!("Fetching collection for {}", username);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Found {} new games", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the program with exit code 1 right after printing. Only use it
/// for fatal errors where recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues, e.g. a batch request that failed during a
/// long discovery run.
///
/// # Example
///
/// ```
/// warning!("Batch starting at id {} failed: {}", first, err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
