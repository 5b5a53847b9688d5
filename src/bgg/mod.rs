//! # BoardGameGeek Integration Module
//!
//! This module is the integration layer between bggcache and BoardGameGeek's
//! XML API (`xmlapi2`) plus the public browse pages. It owns all HTTP
//! communication, the "request queued" polling and the conversion of raw XML
//! into the typed records in [`crate::types`].
//!
//! ## Architecture
//!
//! ```text
//! CLI / Management / Catalog
//!          ↓
//! BGG Integration Layer
//!     ├── client      (GET, 202 polling, 404 handling, bearer auth)
//!     ├── xml         (optional field lookup, upstream error detection)
//!     ├── games       (thing items → GameRecord)
//!     ├── collection  (collection items → CollectionEntry)
//!     ├── users       (geekbuddies)
//!     └── browse      (category and mechanism pages)
//!          ↓
//! HTTP Layer (reqwest)
//! ```
//!
//! ## Upstream Quirks
//!
//! - Collections and user requests are queued: the API answers `202 Accepted`
//!   until the data is ready. The client sleeps and polls again with no upper
//!   bound on attempts.
//! - Expansions show up with `subtype="boardgame"` unless they are requested
//!   separately, so a collection is always fetched in two calls.
//! - Multi-id `thing` requests can drop descriptions for every item after the
//!   first. [`crate::types::GameFetchMode::Probe`] requests items one by one.
//! - The buddy list is capped at the first page (1000 entries).
//!
//! ## Error Types
//!
//! Every function returns [`BggError`]. Upstream error payloads (bad username,
//! missing collection) arrive as [`BggError::Upstream`] with the message text
//! the API sent.

pub mod browse;
pub mod client;
pub mod collection;
pub mod games;
pub mod users;
pub mod xml;

use std::fmt;

pub use client::{BggClient, Fetched};

use crate::management::StoreError;

#[derive(Debug)]
pub enum BggError {
    /// The API answered 404.
    NotFound,
    /// The API answered with an error payload; carries its message.
    Upstream(String),
    /// An authenticated endpoint was called without a token.
    MissingToken,
    Http(reqwest::Error),
    Xml(roxmltree::Error),
    Store(StoreError),
}

impl fmt::Display for BggError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BggError::NotFound => write!(f, "Page not found"),
            BggError::Upstream(message) => write!(f, "{}", message),
            BggError::MissingToken => write!(
                f,
                "No BGG token found. Put it into the file named by BGG_TOKEN_FILE"
            ),
            BggError::Http(e) => write!(f, "HTTP error: {}", e),
            BggError::Xml(e) => write!(f, "Malformed XML: {}", e),
            BggError::Store(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for BggError {}

impl From<reqwest::Error> for BggError {
    fn from(err: reqwest::Error) -> Self {
        BggError::Http(err)
    }
}

impl From<roxmltree::Error> for BggError {
    fn from(err: roxmltree::Error) -> Self {
        BggError::Xml(err)
    }
}

impl From<StoreError> for BggError {
    fn from(err: StoreError) -> Self {
        BggError::Store(err)
    }
}
