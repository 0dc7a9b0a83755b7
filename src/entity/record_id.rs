use std::fmt;

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Domain-side record identifier: the hex string form of a storage `ObjectId`.
///
/// Models and their data only ever see `RecordId`s; conversion to the raw
/// `ObjectId` happens inside the transcoding layer and is fallible, so an
/// identifier of unknown origin fails late with `ModelError::InvalidId`
/// instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into the raw storage identifier.
    pub fn object_id(&self) -> Result<ObjectId, ModelError> {
        ObjectId::parse_str(&self.0).map_err(|_| ModelError::InvalidId {
            value: self.0.clone(),
        })
    }
}

impl From<ObjectId> for RecordId {
    fn from(oid: ObjectId) -> Self {
        RecordId(oid.to_hex())
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
