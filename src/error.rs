use std::fmt;

use crate::entity::RecordId;
use crate::store::StoreError;

/// Domain-level error for model and operator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// An operation that needs populated data was called on an empty model.
    EmptyData { operation: &'static str },
    /// The initial `set_data` input lacks a required field.
    IncompleteData {
        entity: &'static str,
        field: &'static str,
    },
    /// A reference or tag identifier is already attached to the record.
    DuplicateRelation { kind: &'static str, id: RecordId },
    /// A reference or tag identifier to remove is not attached to the record.
    UnknownRelation { kind: &'static str, id: RecordId },
    /// A related model was passed in before it was ever saved.
    NeverPersisted { entity: &'static str },
    /// A tag was linked to its own identifier.
    SelfLink,
    /// A statistic decrement was attempted at zero.
    CounterAtZero { counter: &'static str },
    /// `reload` was called on a model that was never saved or loaded.
    NeverLoaded,
    /// An identifier string is not a valid record id.
    InvalidId { value: String },
    /// A `find_all` field name does not exist on the entity.
    UnknownField { field: String },
    /// No record with the given identifier exists.
    NotFound { collection: String, id: String },
    /// The operation has no implementation yet.
    NotImplemented { operation: &'static str },
    /// Any other storage-layer failure, passed through unchanged.
    Store(StoreError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptyData { operation } => {
                write!(f, "cannot {} on a model with empty data", operation)
            }
            ModelError::IncompleteData { entity, field } => {
                write!(f, "incomplete {} data: missing required field {}", entity, field)
            }
            ModelError::DuplicateRelation { kind, id } => {
                write!(f, "{} {} already belongs to the record", kind, id)
            }
            ModelError::UnknownRelation { kind, id } => {
                write!(f, "{} {} does not belong to the record", kind, id)
            }
            ModelError::NeverPersisted { entity } => {
                write!(f, "the {} has never been saved to storage", entity)
            }
            ModelError::SelfLink => write!(f, "cannot link a record to itself"),
            ModelError::CounterAtZero { counter } => {
                write!(f, "{} has already reached 0", counter)
            }
            ModelError::NeverLoaded => {
                write!(f, "cannot reload: the model was never saved or loaded")
            }
            ModelError::InvalidId { value } => write!(f, "invalid record id: {}", value),
            ModelError::UnknownField { field } => write!(f, "unknown field: {}", field),
            ModelError::NotFound { collection, id } => {
                write!(f, "record not found: {}:{}", collection, id)
            }
            ModelError::NotImplemented { operation } => {
                write!(f, "{} is not implemented", operation)
            }
            ModelError::Store(err) => write!(f, "storage error: {}", err),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ModelError {
    fn from(err: StoreError) -> Self {
        match err {
            // The driver's not-found becomes the uniform domain signal.
            StoreError::NotFound { collection, id } => ModelError::NotFound { collection, id },
            other => ModelError::Store(other),
        }
    }
}
