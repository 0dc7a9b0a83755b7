//! The knowledge-base models.
//!
//! Five entities share the same machinery: [`Bulb`] is the unit of content,
//! [`Category`] files bulbs into broad contexts, [`Tag`] labels them in a
//! parent-linked hierarchy, and [`Reference`] / [`ReferenceSource`] record
//! the material a bulb draws on. Each model wraps an entity over its data
//! type and exposes domain edits that validate before mutating anything:
//!
//! ```ignore
//! let mut bulb = Bulb::new();
//! bulb.set_data(BulbInput {
//!     title: Some("Power and Responsibility".to_string()),
//!     content: Some("With great power...".to_string()),
//!     category: Some(&reflections),
//! })?;
//! bulb.add_tag(&good_movies)?;
//! bulb.save(&store)?;
//! ```

mod bulb;
mod category;
mod reference;
mod reference_source;
mod tag;

use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Field, RecordId};
use crate::error::ModelError;

/// Usage counters kept on categories, references, and reference sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStatistics {
    pub total_bulbs: u64,
}

/// The medium a reference source comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Print,
    #[serde(rename = "Web Page")]
    WebPage,
    Image,
    Video,
    Audio,
    Music,
    Software,
    Bulb,
}

impl SourceKind {
    /// The stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Print => "Print",
            SourceKind::WebPage => "Web Page",
            SourceKind::Image => "Image",
            SourceKind::Video => "Video",
            SourceKind::Audio => "Audio",
            SourceKind::Music => "Music",
            SourceKind::Software => "Software",
            SourceKind::Bulb => "Bulb",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "Print" => Some(SourceKind::Print),
            "Web Page" => Some(SourceKind::WebPage),
            "Image" => Some(SourceKind::Image),
            "Video" => Some(SourceKind::Video),
            "Audio" => Some(SourceKind::Audio),
            "Music" => Some(SourceKind::Music),
            "Software" => Some(SourceKind::Software),
            "Bulb" => Some(SourceKind::Bulb),
            _ => None,
        }
    }
}

// Raw document helpers shared by the entity transcoders. Reads are lenient
// on purpose: a projected document decodes the same way a full one does,
// with everything missing coming back absent.

pub(crate) fn read_id(doc: &Document) -> Option<RecordId> {
    doc.get_object_id("_id").ok().map(RecordId::from)
}

pub(crate) fn read_object_id(doc: &Document, key: &str) -> Option<RecordId> {
    doc.get_object_id(key).ok().map(RecordId::from)
}

pub(crate) fn read_string(doc: &Document, key: &str) -> Option<String> {
    doc.get_str(key).ok().map(str::to_string)
}

pub(crate) fn read_datetime(doc: &Document, key: &str) -> Option<DateTime<Utc>> {
    match doc.get(key) {
        Some(Bson::DateTime(dt)) => Some(dt.to_chrono()),
        _ => None,
    }
}

pub(crate) fn read_u64(doc: &Document, key: &str) -> Option<u64> {
    match doc.get(key) {
        Some(Bson::Int64(i)) => u64::try_from(*i).ok(),
        Some(Bson::Int32(i)) => u64::try_from(*i).ok(),
        _ => None,
    }
}

pub(crate) fn read_id_list(doc: &Document, key: &str) -> Option<Vec<RecordId>> {
    match doc.get(key)? {
        Bson::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Bson::ObjectId(oid) => Some(RecordId::from(*oid)),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Decode a nullable field: missing stays absent, `null` stays null.
pub(crate) fn read_field<T>(
    doc: &Document,
    key: &str,
    convert: fn(&Bson) -> Option<T>,
) -> Field<T> {
    match doc.get(key) {
        None => Field::Absent,
        Some(Bson::Null) => Field::Null,
        Some(value) => convert(value).map(Field::Value).unwrap_or(Field::Absent),
    }
}

pub(crate) fn string_value(value: &Bson) -> Option<String> {
    match value {
        Bson::String(s) => Some(s.clone()),
        _ => None,
    }
}

pub(crate) fn object_id_value(value: &Bson) -> Option<RecordId> {
    match value {
        Bson::ObjectId(oid) => Some(RecordId::from(*oid)),
        _ => None,
    }
}

/// Encode a nullable field: absent writes nothing, null writes `null`.
pub(crate) fn put_field<T: Clone + Into<Bson>>(doc: &mut Document, key: &str, field: &Field<T>) {
    match field {
        Field::Absent => {}
        Field::Null => {
            doc.insert(key, Bson::Null);
        }
        Field::Value(value) => {
            doc.insert(key, value.clone());
        }
    }
}

pub(crate) fn put_datetime(doc: &mut Document, key: &str, value: &DateTime<Utc>) {
    doc.insert(key, bson::DateTime::from_chrono(*value));
}

/// Convert identifiers into raw object ids for a membership query.
pub(crate) fn object_ids(ids: &[RecordId]) -> Result<Vec<Bson>, ModelError> {
    ids.iter()
        .map(|id| id.object_id().map(Bson::ObjectId))
        .collect()
}

pub use bulb::{Bulb, BulbData, BulbFilter, BulbInput, BulbPatch, BulbReference, PastVersion};
pub use category::{Category, CategoryData, CategoryFilter, CategoryInput, CategoryPatch};
pub use reference::{Reference, ReferenceData, ReferenceFilter, ReferenceInput, ReferencePatch};
pub use reference_source::{
    ReferenceSource, ReferenceSourceData, ReferenceSourceFilter, ReferenceSourceInput,
    ReferenceSourcePatch,
};
pub use tag::{Tag, TagData, TagFilter, TagInput, TagPatch, TagStatistics};
