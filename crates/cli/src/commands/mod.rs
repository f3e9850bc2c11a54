//! Subcommand implementations.

pub mod build;
pub mod cache;
pub mod fetch;
pub mod serve;
