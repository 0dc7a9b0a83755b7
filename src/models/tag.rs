use bson::{doc, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Field, Identified, RecordId};
use crate::error::ModelError;
use crate::impl_model;
use crate::operator::{EntityData, Operator};
use crate::store::{DocumentStore, Query, Schema};

use super::{
    object_id_value, object_ids, put_datetime, put_field, read_datetime, read_field, read_id,
    read_string, read_u64, string_value,
};

static TAG_SCHEMA: Schema = Schema {
    collection: "tags",
    fields: &["label", "parent_id", "description", "statistics", "deleted_at"],
    unique: &["label"],
};

/// Usage counters kept on tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStatistics {
    pub total_bulbs: u64,
    pub total_children: u64,
}

/// A label in the tag hierarchy. `parent_id` links one level up; a root tag
/// has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagData {
    pub id: Option<RecordId>,
    pub label: String,
    pub parent_id: Option<RecordId>,
    pub description: Option<String>,
    pub statistics: TagStatistics,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial form of a tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagPatch {
    pub id: Option<RecordId>,
    pub label: Option<String>,
    pub parent_id: Field<RecordId>,
    pub description: Field<String>,
    pub statistics: Option<TagStatistics>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for [`Tag::set_data`]. The parent link is managed
/// through [`Tag::link_to`], not here.
#[derive(Debug, Clone, Default)]
pub struct TagInput {
    pub label: Option<String>,
    pub description: Field<String>,
}

/// Search conditions for [`Tag::find_all`]. String fragments match
/// case-insensitively; `parents` matches tags whose parent is any of the
/// given tags.
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    pub label: Option<String>,
    pub description: Option<String>,
    pub parents: Option<Vec<RecordId>>,
}

impl EntityData for TagData {
    type Patch = TagPatch;
    type Filter = TagFilter;

    fn schema() -> &'static Schema {
        &TAG_SCHEMA
    }

    fn to_patch(&self) -> TagPatch {
        TagPatch {
            id: self.id.clone(),
            label: Some(self.label.clone()),
            parent_id: Field::from_option(self.parent_id.clone()),
            description: Field::from_option(self.description.clone()),
            statistics: Some(self.statistics),
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_patch(patch: TagPatch) -> Result<Self, ModelError> {
        Ok(TagData {
            id: patch.id,
            label: patch.label.ok_or(ModelError::IncompleteData {
                entity: "tag",
                field: "label",
            })?,
            parent_id: patch.parent_id.into_option(),
            description: patch.description.into_option(),
            statistics: patch.statistics.unwrap_or_default(),
            deleted_at: patch.deleted_at,
            created_at: patch.created_at,
            updated_at: patch.updated_at,
        })
    }

    fn to_document(patch: &TagPatch) -> Result<Document, ModelError> {
        let mut doc = Document::new();
        if let Some(label) = &patch.label {
            doc.insert("label", label.clone());
        }
        match &patch.parent_id {
            Field::Absent => {}
            Field::Null => {
                doc.insert("parent_id", bson::Bson::Null);
            }
            Field::Value(id) => {
                doc.insert("parent_id", id.object_id()?);
            }
        }
        put_field(&mut doc, "description", &patch.description);
        if let Some(statistics) = &patch.statistics {
            doc.insert(
                "statistics",
                doc! {
                    "total_bulbs": statistics.total_bulbs as i64,
                    "total_children": statistics.total_children as i64,
                },
            );
        }
        if let Some(deleted_at) = &patch.deleted_at {
            put_datetime(&mut doc, "deleted_at", deleted_at);
        }
        Ok(doc)
    }

    fn from_document(doc: &Document) -> TagPatch {
        TagPatch {
            id: read_id(doc),
            label: read_string(doc, "label"),
            parent_id: read_field(doc, "parent_id", object_id_value),
            description: read_field(doc, "description", string_value),
            statistics: doc.get_document("statistics").ok().map(|stats| TagStatistics {
                total_bulbs: read_u64(stats, "total_bulbs").unwrap_or(0),
                total_children: read_u64(stats, "total_children").unwrap_or(0),
            }),
            deleted_at: read_datetime(doc, "deleted_at"),
            created_at: read_datetime(doc, "created_at"),
            updated_at: read_datetime(doc, "updated_at"),
        }
    }

    fn raw_field(field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("_id"),
            "label" => Some("label"),
            "parent_id" => Some("parent_id"),
            "description" => Some("description"),
            "statistics" => Some("statistics"),
            "deleted_at" => Some("deleted_at"),
            "created_at" => Some("created_at"),
            "updated_at" => Some("updated_at"),
            _ => None,
        }
    }

    fn filter_query(filter: &TagFilter) -> Result<Query, ModelError> {
        let mut query = Query::new();
        if let Some(label) = &filter.label {
            query = query.contains("label", label);
        }
        if let Some(description) = &filter.description {
            query = query.contains("description", description);
        }
        if let Some(parents) = &filter.parents {
            query = query.any_of("parent_id", object_ids(parents)?);
        }
        Ok(query)
    }
}

/// A hierarchical label for bulbs.
#[derive(Debug, Default)]
pub struct Tag {
    entity: Entity<TagData>,
}

impl Tag {
    pub fn new() -> Self {
        Tag::default()
    }

    /// A tag pre-populated from complete data. Counts as an unsaved edit, so
    /// the model starts dirty.
    pub fn with_data(data: TagData) -> Self {
        Tag {
            entity: Entity::from_data(data),
        }
    }

    /// Populate or update the editable fields.
    ///
    /// The first population must carry a label. Statistics start at zero and
    /// are not writable from input.
    pub fn set_data(&mut self, input: TagInput) -> Result<&mut Self, ModelError> {
        self.entity.edit(|current, _| match current {
            None => Ok(TagData {
                id: None,
                label: input.label.ok_or(ModelError::IncompleteData {
                    entity: "tag",
                    field: "label",
                })?,
                parent_id: None,
                description: input.description.into_option(),
                statistics: TagStatistics::default(),
                deleted_at: None,
                created_at: None,
                updated_at: None,
            }),
            Some(current) => {
                let mut next = current.clone();
                if let Some(label) = input.label {
                    next.label = label;
                }
                input.description.apply_to(&mut next.description);
                Ok(next)
            }
        })?;
        Ok(self)
    }

    /// Point this tag at a parent tag, or at nothing to make it a root.
    ///
    /// The parent must have been saved at least once, and a tag can never be
    /// its own parent.
    pub fn link_to(&mut self, parent: Option<&dyn Identified>) -> Result<&mut Self, ModelError> {
        let parent_id = match parent {
            None => None,
            Some(parent) => Some(parent.id().ok_or(ModelError::NeverPersisted {
                entity: "parent tag",
            })?),
        };

        self.entity.edit(|current, _| {
            let current = current.ok_or(ModelError::EmptyData {
                operation: "link_to",
            })?;
            if parent_id.is_some() && current.id == parent_id {
                return Err(ModelError::SelfLink);
            }
            let mut next = current.clone();
            next.parent_id = parent_id;
            Ok(next)
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

    /// Bump the child counter.
    pub fn increase_total_children(&mut self) -> Result<&mut Self, ModelError> {
        self.entity.edit(|current, _| {
            let current = current.ok_or(ModelError::EmptyData {
                operation: "increase_total_children",
            })?;
            let mut next = current.clone();
            next.statistics.total_children += 1;
            Ok(next)
        })?;
        Ok(self)
    }

    /// Drop the child counter, failing at zero.
    pub fn decrease_total_children(&mut self) -> Result<&mut Self, ModelError> {
        self.entity.edit(|current, _| {
            let current = current.ok_or(ModelError::EmptyData {
                operation: "decrease_total_children",
            })?;
            let mut next = current.clone();
            next.statistics.total_children =
                next.statistics
                    .total_children
                    .checked_sub(1)
                    .ok_or(ModelError::CounterAtZero {
                        counter: "total_children",
                    })?;
            Ok(next)
        })?;
        Ok(self)
    }

    /// Every tag matching `filter`, optionally projected to `fields`.
    pub fn find_all<S: DocumentStore>(
        store: &S,
        filter: Option<&TagFilter>,
        fields: Option<&[&str]>,
    ) -> Result<Vec<TagPatch>, ModelError> {
        Operator::<TagData>::find_all(store, filter, fields)
    }
}

impl_model!(Tag, TagData, entity);
