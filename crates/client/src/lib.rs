//! Content client and normalizers for wisp.
//!
//! This crate provides the Ghost Content API client and the pure
//! collection transforms (domain stripping, date coercion, cross-linking)
//! shared by the build tool.

pub mod content;
pub mod normalize;

pub use content::{BrowseParams, ContentClient, ContentConfig, ContentError};
pub use normalize::{Author, AuthorRef, Normalizer, Page, Post, Site, Tag, TagRef};
