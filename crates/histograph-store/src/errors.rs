//! Error helpers for histograph-store
//!
//! Every failure is a core `ExError`, so repository errors propagate through
//! the commit pipeline unchanged.

use histograph_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// An applied migration whose SQL has since changed
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Stored JSON or text that cannot be encoded or decoded
pub fn serialization_error(op: &str, err: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(op.to_string())
        .with_message(err.to_string())
}

/// Numbers SQLite cannot hold as a signed 64-bit integer
pub fn out_of_range(op: &str, what: &str, value: u64) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(op.to_string())
        .with_message(format!("{} {} exceeds the storable range", what, value))
}

/// Concurrent writer left the connection unusable
pub fn lock_poisoned(op: &str) -> ExError {
    ExError::new(ExErrorKind::Concurrency)
        .with_op(op.to_string())
        .with_message("connection lock poisoned")
}
