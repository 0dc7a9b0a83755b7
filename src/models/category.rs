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
    string_value, ContextStatistics,
};

static CATEGORY_SCHEMA: Schema = Schema {
    collection: "categories",
    fields: &["name", "description", "statistics", "deleted_at"],
    unique: &["name"],
};

/// A broad context bulbs are filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    pub id: Option<RecordId>,
    pub name: String,
    pub description: Option<String>,
    pub statistics: ContextStatistics,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial form of a category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub id: Option<RecordId>,
    pub name: Option<String>,
    pub description: Field<String>,
    pub statistics: Option<ContextStatistics>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for [`Category::set_data`].
#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: Option<String>,
    pub description: Field<String>,
}

/// Search conditions for [`Category::find_all`]. String fragments match
/// case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl EntityData for CategoryData {
    type Patch = CategoryPatch;
    type Filter = CategoryFilter;

    fn schema() -> &'static Schema {
        &CATEGORY_SCHEMA
    }

    fn to_patch(&self) -> CategoryPatch {
        CategoryPatch {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            description: Field::from_option(self.description.clone()),
            statistics: Some(self.statistics),
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn from_patch(patch: CategoryPatch) -> Result<Self, ModelError> {
        Ok(CategoryData {
            id: patch.id,
            name: patch.name.ok_or(ModelError::IncompleteData {
                entity: "category",
                field: "name",
            })?,
            description: patch.description.into_option(),
            statistics: patch.statistics.unwrap_or_default(),
            deleted_at: patch.deleted_at,
            created_at: patch.created_at,
            updated_at: patch.updated_at,
        })
    }

    fn to_document(patch: &CategoryPatch) -> Result<Document, ModelError> {
        let mut doc = Document::new();
        if let Some(name) = &patch.name {
            doc.insert("name", name.clone());
        }
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

    fn from_document(doc: &Document) -> CategoryPatch {
        CategoryPatch {
            id: read_id(doc),
            name: read_string(doc, "name"),
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
            "description" => Some("description"),
            "statistics" => Some("statistics"),
            "deleted_at" => Some("deleted_at"),
            "created_at" => Some("created_at"),
            "updated_at" => Some("updated_at"),
            _ => None,
        }
    }

    fn filter_query(filter: &CategoryFilter) -> Result<Query, ModelError> {
        let mut query = Query::new();
        if let Some(name) = &filter.name {
            query = query.contains("name", name);
        }
        if let Some(description) = &filter.description {
            query = query.contains("description", description);
        }
        Ok(query)
    }
}

/// A broad context for filing bulbs.
#[derive(Debug, Default)]
pub struct Category {
    entity: Entity<CategoryData>,
}

impl Category {
    pub fn new() -> Self {
        Category::default()
    }

    /// A category pre-populated from complete data. Counts as an unsaved
    /// edit, so the model starts dirty.
    pub fn with_data(data: CategoryData) -> Self {
        Category {
            entity: Entity::from_data(data),
        }
    }

    /// Populate or update the editable fields.
    ///
    /// The first population must carry a name. Statistics start at zero and
    /// are not writable from input. On an already populated model, absent
    /// input fields keep their current values and null clears them.
    pub fn set_data(&mut self, input: CategoryInput) -> Result<&mut Self, ModelError> {
        self.entity.edit(|current, _| match current {
            None => Ok(CategoryData {
                id: None,
                name: input.name.ok_or(ModelError::IncompleteData {
                    entity: "category",
                    field: "name",
                })?,
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

    /// Every category matching `filter`, optionally projected to `fields`.
    pub fn find_all<S: DocumentStore>(
        store: &S,
        filter: Option<&CategoryFilter>,
        fields: Option<&[&str]>,
    ) -> Result<Vec<CategoryPatch>, ModelError> {
        Operator::<CategoryData>::find_all(store, filter, fields)
    }
}

impl_model!(Category, CategoryData, entity);
