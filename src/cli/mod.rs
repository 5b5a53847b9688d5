//! # CLI Module
//!
//! This module provides the command-line interface layer for bggcache. It
//! implements all user-facing commands and coordinates between the API
//! client, the snapshot stores and the batch passes over the master table.
//!
//! ## Command Categories
//!
//! ### Collections
//!
//! - [`collection`] - Shows a user's collection, narrowed by any filter flags
//! - [`buddies`] - Lists a user's geekbuddies
//!
//! ### Games
//!
//! - [`show_games`] - Fetches and prints games by id, bypassing the master table
//! - [`discover_games`] - Appends unknown ids below the guard to the master table
//! - [`refresh_games`] - Re-fetches the next window of the master table
//!
//! ### Classifications
//!
//! - [`classifications`] - Lists the categories or mechanisms from the browse pages
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Management / Catalog Layer (snapshots, master table, batch passes)
//!     ↓
//! BGG Layer (XML API client and parsers)
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! ## Caching Strategy
//!
//! - **Collections and buddies**: one snapshot per user, reused while younger
//!   than the cutoff (7 days unless configured otherwise)
//! - **Master table**: one current `all-to-{maxid}.json` plus backups
//! - **Guard and cursor**: plain integers in the state directory, only
//!   written after a pass that obtained at least one record
//!
//! ## Error Handling
//!
//! Fatal problems (unknown user, unreadable master table) go through
//! `error!`, which exits with status 1. Failed batches inside a long pass
//! only produce a warning so the pass can finish.

mod browse;
mod collection;
mod games;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use browse::classifications;
pub use collection::buddies;
pub use collection::collection;
pub use games::discover_games;
pub use games::refresh_games;
pub use games::show_games;

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
