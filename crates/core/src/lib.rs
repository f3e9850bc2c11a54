//! Core types and shared functionality for wisp.
//!
//! This crate provides:
//! - The on-disk content cache with SQLite backend
//! - The cache-or-fetch wrapper with stale fallback
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, Entry, Fetched, fetch_cached};
pub use config::AppConfig;
pub use error::Error;
