//! Versioned document storage.
//!
//! Operators talk to storage through the [`DocumentStore`] trait: BSON
//! documents validated against a per-collection [`Schema`], keyed by object
//! id, each carrying a version that increments on every replace. A writer
//! hands back the version it read; a stale one is rejected instead of
//! silently overwritten.
//!
//! [`MemoryStore`] is the bundled implementation, a process-local store that
//! enforces the same field, uniqueness, and timestamp rules a backing
//! database would.

mod in_memory;
mod query;
mod schema;
mod store;

use std::fmt;

use bson::Document;

/// Storage-layer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No document with the given id exists in the collection.
    NotFound { collection: String, id: String },
    /// A write would duplicate a value held by another document in a unique
    /// field.
    DuplicateValue {
        collection: String,
        field: &'static str,
        value: String,
    },
    /// A replace carried a version that no longer matches the stored
    /// document.
    VersionConflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    /// A document carried a top-level field its schema does not declare.
    UndeclaredField { collection: String, field: String },
    /// A collection lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
    /// A stored document is structurally unusable.
    Malformed(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { collection, id } => {
                write!(f, "document not found: {}:{}", collection, id)
            }
            StoreError::DuplicateValue {
                collection,
                field,
                value,
            } => {
                write!(f, "duplicate value for {}.{}: {}", collection, field, value)
            }
            StoreError::VersionConflict {
                collection,
                id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "stale version for {}:{}: expected {}, actual {}",
                    collection, id, expected, actual
                )
            }
            StoreError::UndeclaredField { collection, field } => {
                write!(f, "collection {} does not declare field {}", collection, field)
            }
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Malformed(detail) => write!(f, "malformed document: {}", detail),
        }
    }
}

impl std::error::Error for StoreError {}

/// A stored document paired with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDoc {
    pub doc: Document,
    pub version: u64,
}

pub use in_memory::MemoryStore;
pub use query::Query;
pub use schema::Schema;
pub use store::DocumentStore;
