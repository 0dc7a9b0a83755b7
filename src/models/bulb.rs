use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, Identified, RecordId};
use crate::error::ModelError;
use crate::impl_model;
use crate::operator::{EntityData, Operator};
use crate::store::{DocumentStore, Query, Schema};

use super::{
    object_ids, put_datetime, read_datetime, read_id, read_id_list, read_object_id, read_string,
};

static BULB_SCHEMA: Schema = Schema {
    collection: "bulbs",
    fields: &[
        "title",
        "category_id",
        "content",
        "references",
        "tag_ids",
        "past_versions",
        "deleted_at",
    ],
    unique: &[],
};

/// One citation on a bulb: the source, plus an optional free-form detail
/// such as a page or a movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulbReference {
    pub source_id: RecordId,
    pub detail: Option<String>,
}

/// A superseded body of a bulb, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastVersion {
    pub archived_at: DateTime<Utc>,
    pub content: String,
}

/// The unit of content: one thought, filed under a category, carrying its
/// citations, tags, and archived past versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulbData {
    pub id: Option<RecordId>,
    pub title: String,
    pub category_id: RecordId,
    pub content: String,
    pub references: Vec<BulbReference>,
    pub tag_ids: Vec<RecordId>,
    pub past_versions: Vec<PastVersion>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial form of a bulb.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulbPatch {
    pub id: Option<RecordId>,
    pub title: Option<String>,
    pub category_id: Option<RecordId>,
    pub content: Option<String>,
    pub references: Option<Vec<BulbReference>>,
    pub tag_ids: Option<Vec<RecordId>>,
    pub past_versions: Option<Vec<PastVersion>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for [`Bulb::set_data`]. The category is any
/// persisted model, usually a [`Category`].
///
/// [`Category`]: super::Category
#[derive(Clone, Default)]
pub struct BulbInput<'a> {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<&'a dyn Identified>,
}

/// Search conditions for [`Bulb::find_all`]. String fragments match
/// case-insensitively; the identifier lists match bulbs filed under any of
/// the given categories, citing any of the given sources, or carrying any of
/// the given tags.
#[derive(Debug, Clone, Default)]
pub struct BulbFilter {
    pub title: Option<String>,
    pub content: Option<String>,
    pub categories: Option<Vec<RecordId>>,
    pub references: Option<Vec<RecordId>>,
    pub tags: Option<Vec<RecordId>>,
}

impl EntityData for BulbData {
    type Patch = BulbPatch;
    type Filter = BulbFilter;

    fn schema() -> &'static Schema {
        &BULB_SCHEMA
    }

    fn to_patch(&self) -> BulbPatch {
        BulbPatch {
            id: self.id.clone(),
            title: Some(self.title.clone()),
            category_id: Some(self.category_id.clone()),
            content: Some(self.content.clone()),
            references: Some(self.references.clone()),
            tag_ids: Some(self.tag_ids.clone()),
            past_versions: Some(self.past_versions.clone()),
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_patch(patch: BulbPatch) -> Result<Self, ModelError> {
        Ok(BulbData {
            id: patch.id,
            title: patch.title.ok_or(ModelError::IncompleteData {
                entity: "bulb",
                field: "title",
            })?,
            content: patch.content.ok_or(ModelError::IncompleteData {
                entity: "bulb",
                field: "content",
            })?,
            category_id: patch.category_id.ok_or(ModelError::IncompleteData {
                entity: "bulb",
                field: "category_id",
            })?,
            references: patch.references.unwrap_or_default(),
            tag_ids: patch.tag_ids.unwrap_or_default(),
            past_versions: patch.past_versions.unwrap_or_default(),
            deleted_at: patch.deleted_at,
            created_at: patch.created_at,
            updated_at: patch.updated_at,
        })
    }

    fn to_document(patch: &BulbPatch) -> Result<Document, ModelError> {
        let mut doc = Document::new();
        if let Some(title) = &patch.title {
            doc.insert("title", title.clone());
        }
        if let Some(category_id) = &patch.category_id {
            doc.insert("category_id", category_id.object_id()?);
        }
        if let Some(content) = &patch.content {
            doc.insert("content", content.clone());
        }
        if let Some(references) = &patch.references {
            let mut items = Vec::with_capacity(references.len());
            for reference in references {
                let mut item = doc! { "source_id": reference.source_id.object_id()? };
                if let Some(detail) = &reference.detail {
                    item.insert("detail", detail.clone());
                }
                items.push(Bson::Document(item));
            }
            doc.insert("references", items);
        }
        if let Some(tag_ids) = &patch.tag_ids {
            doc.insert("tag_ids", object_ids(tag_ids)?);
        }
        if let Some(past_versions) = &patch.past_versions {
            let items: Vec<Bson> = past_versions
                .iter()
                .map(|version| {
                    Bson::Document(doc! {
                        "archived_at": bson::DateTime::from_chrono(version.archived_at),
                        "content": version.content.clone(),
                    })
                })
                .collect();
            doc.insert("past_versions", items);
        }
        if let Some(deleted_at) = &patch.deleted_at {
            put_datetime(&mut doc, "deleted_at", deleted_at);
        }
        Ok(doc)
    }

    fn from_document(doc: &Document) -> BulbPatch {
        let references = match doc.get("references") {
            Some(Bson::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Bson::Document(item) => Some(BulbReference {
                            source_id: read_object_id(item, "source_id")?,
                            detail: read_string(item, "detail"),
                        }),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        };

        let past_versions = match doc.get("past_versions") {
            Some(Bson::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Bson::Document(item) => Some(PastVersion {
                            archived_at: read_datetime(item, "archived_at")?,
                            content: read_string(item, "content")?,
                        }),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        };

        BulbPatch {
            id: read_id(doc),
            title: read_string(doc, "title"),
            category_id: read_object_id(doc, "category_id"),
            content: read_string(doc, "content"),
            references,
            tag_ids: read_id_list(doc, "tag_ids"),
            past_versions,
            deleted_at: read_datetime(doc, "deleted_at"),
            created_at: read_datetime(doc, "created_at"),
            updated_at: read_datetime(doc, "updated_at"),
        }
    }

    fn raw_field(field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("_id"),
            "title" => Some("title"),
            "category_id" => Some("category_id"),
            "content" => Some("content"),
            "references" => Some("references"),
            "tag_ids" => Some("tag_ids"),
            "past_versions" => Some("past_versions"),
            "deleted_at" => Some("deleted_at"),
            "created_at" => Some("created_at"),
            "updated_at" => Some("updated_at"),
            _ => None,
        }
    }

    fn filter_query(filter: &BulbFilter) -> Result<Query, ModelError> {
        let mut query = Query::new();
        if let Some(title) = &filter.title {
            query = query.contains("title", title);
        }
        if let Some(content) = &filter.content {
            query = query.contains("content", content);
        }
        if let Some(categories) = &filter.categories {
            query = query.any_of("category_id", object_ids(categories)?);
        }
        if let Some(references) = &filter.references {
            query = query.any_of("references.source_id", object_ids(references)?);
        }
        if let Some(tags) = &filter.tags {
            query = query.any_of("tag_ids", object_ids(tags)?);
        }
        Ok(query)
    }
}

/// One recorded thought.
#[derive(Debug, Default)]
pub struct Bulb {
    entity: Entity<BulbData>,
}

impl Bulb {
    pub fn new() -> Self {
        Bulb::default()
    }

    /// A bulb pre-populated from complete data. Counts as an unsaved edit,
    /// so the model starts dirty.
    pub fn with_data(data: BulbData) -> Self {
        Bulb {
            entity: Entity::from_data(data),
        }
    }

    /// Populate or update the editable fields.
    ///
    /// The first population must carry a title, content, and a persisted
    /// category. References, tags, and past versions start empty and are
    /// managed through their own methods.
    pub fn set_data(&mut self, input: BulbInput<'_>) -> Result<&mut Self, ModelError> {
        let category_id = match input.category {
            None => None,
            Some(category) => Some(category.id().ok_or(ModelError::NeverPersisted {
                entity: "category",
            })?),
        };

        self.entity.edit(|current, _| match current {
            None => Ok(BulbData {
                id: None,
                title: input.title.ok_or(ModelError::IncompleteData {
                    entity: "bulb",
                    field: "title",
                })?,
                content: input.content.ok_or(ModelError::IncompleteData {
                    entity: "bulb",
                    field: "content",
                })?,
                category_id: category_id.ok_or(ModelError::IncompleteData {
                    entity: "bulb",
                    field: "category",
                })?,
                references: Vec::new(),
                tag_ids: Vec::new(),
                past_versions: Vec::new(),
                deleted_at: None,
                created_at: None,
                updated_at: None,
            }),
            Some(current) => {
                let mut next = current.clone();
                if let Some(title) = input.title {
                    next.title = title;
                }
                if let Some(content) = input.content {
                    next.content = content;
                }
                if let Some(category_id) = category_id {
                    next.category_id = category_id;
                }
                Ok(next)
            }
        })?;
        Ok(self)
    }

    /// Cite a persisted source, with an optional free-form detail. A source
    /// can only be cited once per bulb.
    pub fn add_reference(
        &mut self,
        source: &dyn Identified,
        detail: Option<String>,
    ) -> Result<&mut Self, ModelError> {
        let source_id = source.id().ok_or(ModelError::NeverPersisted {
            entity: "reference source",
        })?;

        self.entity.edit(|current, _| {
            let current = current.ok_or(ModelError::EmptyData {
                operation: "add_reference",
            })?;
            if current
                .references
                .iter()
                .any(|reference| reference.source_id == source_id)
            {
                return Err(ModelError::DuplicateRelation {
                    kind: "reference",
                    id: source_id,
                });
            }
            let mut next = current.clone();
            next.references.push(BulbReference { source_id, detail });
            Ok(next)
        })?;
        Ok(self)
    }

    /// Drop the citation of a source.
    pub fn remove_reference(&mut self, source: &dyn Identified) -> Result<&mut Self, ModelError> {
        let source_id = source.id().ok_or(ModelError::NeverPersisted {
            entity: "reference source",
        })?;

        self.entity.edit(|current, _| {
            let current = current.ok_or(ModelError::EmptyData {
                operation: "remove_reference",
            })?;
            let position = current
                .references
                .iter()
                .position(|reference| reference.source_id == source_id)
                .ok_or(ModelError::UnknownRelation {
                    kind: "reference",
                    id: source_id,
                })?;
            let mut next = current.clone();
            next.references.remove(position);
            Ok(next)
        })?;
        Ok(self)
    }

    /// Attach a persisted tag. A tag can only be attached once per bulb.
    pub fn add_tag(&mut self, tag: &dyn Identified) -> Result<&mut Self, ModelError> {
        let tag_id = tag.id().ok_or(ModelError::NeverPersisted { entity: "tag" })?;

        self.entity.edit(|current, _| {
            let current = current.ok_or(ModelError::EmptyData {
                operation: "add_tag",
            })?;
            if current.tag_ids.contains(&tag_id) {
                return Err(ModelError::DuplicateRelation {
                    kind: "tag",
                    id: tag_id,
                });
            }
            let mut next = current.clone();
            next.tag_ids.push(tag_id);
            Ok(next)
        })?;
        Ok(self)
    }

    /// Detach a tag.
    pub fn remove_tag(&mut self, tag: &dyn Identified) -> Result<&mut Self, ModelError> {
        let tag_id = tag.id().ok_or(ModelError::NeverPersisted { entity: "tag" })?;

        self.entity.edit(|current, _| {
            let current = current.ok_or(ModelError::EmptyData {
                operation: "remove_tag",
            })?;
            let position = current
                .tag_ids
                .iter()
                .position(|id| *id == tag_id)
                .ok_or(ModelError::UnknownRelation {
                    kind: "tag",
                    id: tag_id,
                })?;
            let mut next = current.clone();
            next.tag_ids.remove(position);
            Ok(next)
        })?;
        Ok(self)
    }

    /// Snapshot the current content onto the front of the past versions,
    /// ahead of a rewrite.
    pub fn archive_current_version(&mut self) -> Result<&mut Self, ModelError> {
        self.entity.edit(|current, _| {
            let current = current.ok_or(ModelError::EmptyData {
                operation: "archive_current_version",
            })?;
            let mut next = current.clone();
            next.past_versions.insert(
                0,
                PastVersion {
                    archived_at: Utc::now(),
                    content: next.content.clone(),
                },
            );
            Ok(next)
        })?;
        Ok(self)
    }

    /// Every bulb matching `filter`, optionally projected to `fields`.
    pub fn find_all<S: DocumentStore>(
        store: &S,
        filter: Option<&BulbFilter>,
        fields: Option<&[&str]>,
    ) -> Result<Vec<BulbPatch>, ModelError> {
        Operator::<BulbData>::find_all(store, filter, fields)
    }
}

impl_model!(Bulb, BulbData, entity);
