//! SQLite-backed cache for fetched content collections.
//!
//! This module provides a persistent cache using SQLite with async access
//! via tokio-rusqlite. It supports:
//!
//! - One entry per (resource, serialized params) pair, keyed by SHA-256
//! - A freshness timestamp per entry, evaluated against a caller-supplied
//!   maximum age
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Serve-stale-on-error fetching via [`fetch_cached`]

pub mod connection;
pub mod entries;
pub mod fetch;
pub mod keys;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CacheStats, Entry};
pub use fetch::{Fetched, fetch_cached};
