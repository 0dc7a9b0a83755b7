use bson::{doc, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Field, RecordId};
use crate::error::ModelError;
use crate::impl_model;
use crate::operator::{EntityData, Operator};
use crate::store::{DocumentStore, Query, Schema};

use super::{
    put_datetime, put_field, read_datetime, read_field, read_id, read_string, read_u64,
    string_value, ContextStatistics, SourceKind,
};

static REFERENCE_SOURCE_SCHEMA: Schema = Schema {
    collection: "reference_sources",
    fields: &[
        "name",
        "type",
        "locator",
        "image_url",
        "description",
        "statistics",
        "deleted_at",
    ],
    unique: &["name"],
};

/// A source bulbs can cite: a book, a web page, a piece of music, another
/// bulb. `locator` points at wherever the source lives (a URL, an ISBN).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSourceData {
    pub id: Option<RecordId>,
    pub name: String,
    pub kind: SourceKind,
    pub locator: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub statistics: ContextStatistics,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial form of a reference source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSourcePatch {
    pub id: Option<RecordId>,
    pub name: Option<String>,
    pub kind: Option<SourceKind>,
    pub locator: Field<String>,
    pub image_url: Field<String>,
    pub description: Field<String>,
    pub statistics: Option<ContextStatistics>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for [`ReferenceSource::set_data`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceSourceInput {
    pub name: Option<String>,
    pub kind: Option<SourceKind>,
    pub locator: Field<String>,
    pub image_url: Field<String>,
    pub description: Field<String>,
}

/// Search conditions for [`ReferenceSource::find_all`]. The name fragment
/// matches case-insensitively; `kind` matches exactly.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSourceFilter {
    pub name: Option<String>,
    pub kind: Option<SourceKind>,
}

impl EntityData for ReferenceSourceData {
    type Patch = ReferenceSourcePatch;
    type Filter = ReferenceSourceFilter;

    fn schema() -> &'static Schema {
        &REFERENCE_SOURCE_SCHEMA
    }

    fn to_patch(&self) -> ReferenceSourcePatch {
        ReferenceSourcePatch {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            kind: Some(self.kind),
            locator: Field::from_option(self.locator.clone()),
            image_url: Field::from_option(self.image_url.clone()),
            description: Field::from_option(self.description.clone()),
            statistics: Some(self.statistics),
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_patch(patch: ReferenceSourcePatch) -> Result<Self, ModelError> {
        Ok(ReferenceSourceData {
            id: patch.id,
            name: patch.name.ok_or(ModelError::IncompleteData {
                entity: "reference source",
                field: "name",
            })?,
            kind: patch.kind.ok_or(ModelError::IncompleteData {
                entity: "reference source",
                field: "kind",
            })?,
            locator: patch.locator.into_option(),
            image_url: patch.image_url.into_option(),
            description: patch.description.into_option(),
            statistics: patch.statistics.unwrap_or_default(),
            deleted_at: patch.deleted_at,
            created_at: patch.created_at,
            updated_at: patch.updated_at,
        })
    }

    fn to_document(patch: &ReferenceSourcePatch) -> Result<Document, ModelError> {
        let mut doc = Document::new();
        if let Some(name) = &patch.name {
            doc.insert("name", name.clone());
        }
        if let Some(kind) = &patch.kind {
            doc.insert("type", kind.as_str());
        }
        put_field(&mut doc, "locator", &patch.locator);
        put_field(&mut doc, "image_url", &patch.image_url);
        put_field(&mut doc, "description", &patch.description);
        if let Some(statistics) = &patch.statistics {
            doc.insert(
                "statistics",
                doc! { "total_bulbs": statistics.total_bulbs as i64 },
            );
        }
        if let Some(deleted_at) = &patch.deleted_at {
            put_datetime(&mut doc, "deleted_at", deleted_at);
        }
        Ok(doc)
    }

    fn from_document(doc: &Document) -> ReferenceSourcePatch {
        ReferenceSourcePatch {
            id: read_id(doc),
            name: read_string(doc, "name"),
            kind: read_string(doc, "type").and_then(|raw| SourceKind::parse(&raw)),
            locator: read_field(doc, "locator", string_value),
            image_url: read_field(doc, "image_url", string_value),
            description: read_field(doc, "description", string_value),
            statistics: doc
                .get_document("statistics")
                .ok()
                .map(|stats| ContextStatistics {
                    total_bulbs: read_u64(stats, "total_bulbs").unwrap_or(0),
                }),
            deleted_at: read_datetime(doc, "deleted_at"),
            created_at: read_datetime(doc, "created_at"),
            updated_at: read_datetime(doc, "updated_at"),
        }
    }

    fn raw_field(field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("_id"),
            "name" => Some("name"),
            "kind" => Some("type"),
            "locator" => Some("locator"),
            "image_url" => Some("image_url"),
            "description" => Some("description"),
            "statistics" => Some("statistics"),
            "deleted_at" => Some("deleted_at"),
            "created_at" => Some("created_at"),
            "updated_at" => Some("updated_at"),
            _ => None,
        }
    }

    fn filter_query(filter: &ReferenceSourceFilter) -> Result<Query, ModelError> {
        let mut query = Query::new();
        if let Some(name) = &filter.name {
            query = query.contains("name", name);
        }
        if let Some(kind) = &filter.kind {
            query = query.equals("type", kind.as_str());
        }
        Ok(query)
    }
}

/// A citable source of material.
#[derive(Debug, Default)]
pub struct ReferenceSource {
    entity: Entity<ReferenceSourceData>,
}

impl ReferenceSource {
    pub fn new() -> Self {
        ReferenceSource::default()
    }

    /// A reference source pre-populated from complete data. Counts as an
    /// unsaved edit, so the model starts dirty.
    pub fn with_data(data: ReferenceSourceData) -> Self {
        ReferenceSource {
            entity: Entity::from_data(data),
        }
    }

    /// Populate or update the editable fields.
    ///
    /// The first population must carry a name and a kind. Statistics start
    /// at zero and are not writable from input.
    pub fn set_data(&mut self, input: ReferenceSourceInput) -> Result<&mut Self, ModelError> {
        self.entity.edit(|current, _| match current {
            None => Ok(ReferenceSourceData {
                id: None,
                name: input.name.ok_or(ModelError::IncompleteData {
                    entity: "reference source",
                    field: "name",
                })?,
                kind: input.kind.ok_or(ModelError::IncompleteData {
                    entity: "reference source",
                    field: "kind",
                })?,
                locator: input.locator.into_option(),
                image_url: input.image_url.into_option(),
                description: input.description.into_option(),
                statistics: ContextStatistics::default(),
                deleted_at: None,
                created_at: None,
                updated_at: None,
            }),
            Some(current) => {
                let mut next = current.clone();
                if let Some(name) = input.name {
                    next.name = name;
                }
                if let Some(kind) = input.kind {
                    next.kind = kind;
                }
                input.locator.apply_to(&mut next.locator);
                input.image_url.apply_to(&mut next.image_url);
                input.description.apply_to(&mut next.description);
                Ok(next)
            }
        })?;
        Ok(self)
    }

    /// Bump the bulb counter.
    pub fn increase_total_bulbs(&mut self) -> Result<&mut Self, ModelError> {
        self.entity.edit(|current, _| {
            let current = current.ok_or(ModelError::EmptyData {
                operation: "increase_total_bulbs",
            })?;
            let mut next = current.clone();
            next.statistics.total_bulbs += 1;
            Ok(next)
        })?;
        Ok(self)
    }

    /// Drop the bulb counter, failing at zero.
    pub fn decrease_total_bulbs(&mut self) -> Result<&mut Self, ModelError> {
        self.entity.edit(|current, _| {
            let current = current.ok_or(ModelError::EmptyData {
                operation: "decrease_total_bulbs",
            })?;
            let mut next = current.clone();
            next.statistics.total_bulbs =
                next.statistics
                    .total_bulbs
                    .checked_sub(1)
                    .ok_or(ModelError::CounterAtZero {
                        counter: "total_bulbs",
                    })?;
            Ok(next)
        })?;
        Ok(self)
    }

    /// Every reference source matching `filter`, optionally projected to
    /// `fields`.
    pub fn find_all<S: DocumentStore>(
        store: &S,
        filter: Option<&ReferenceSourceFilter>,
        fields: Option<&[&str]>,
    ) -> Result<Vec<ReferenceSourcePatch>, ModelError> {
        Operator::<ReferenceSourceData>::find_all(store, filter, fields)
    }
}

impl_model!(ReferenceSource, ReferenceSourceData, entity);
