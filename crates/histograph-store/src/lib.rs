//! Histograph Store - SQLite persistence for commits and snapshots
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - `SqliteRepository`, a durable implementation of the core `Repository`

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repository;

pub use errors::Result;
pub use repository::SqliteRepository;
