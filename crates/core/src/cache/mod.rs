//! SQLite-backed namespaced response cache.
//!
//! This module provides a persistent key→response store using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Multiple concurrent namespaces (versioned shell, data, cdn)
//! - Content-addressed entry keys using SHA-256
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::StoredResponse;
pub use hash::compute_entry_key;
