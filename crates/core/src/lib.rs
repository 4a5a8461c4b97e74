//! Core types and shared functionality for the salah workspace.
//!
//! This crate provides:
//! - The namespaced response cache with SQLite backend
//! - The astronomical prayer-time engine
//! - Unified error types
//! - Configuration structures

pub mod astro;
pub mod cache;
pub mod config;
pub mod error;
pub mod times;

pub use cache::{CacheDb, StoredResponse};
pub use config::AppConfig;
pub use error::Error;
pub use times::{AsrSchool, CalculationMethod, ClockTime, Coordinate, PrayerTimeSet};
