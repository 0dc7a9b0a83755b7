use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bson::oid::ObjectId;
use bson::{Bson, Document};
use tracing::{debug, trace};

use super::{DocumentStore, Query, Schema, StoreError, VersionedDoc};

/// Store-owned top-level keys, stamped on write and never writable by
/// callers.
const META_FIELDS: [&str; 3] = ["_id", "created_at", "updated_at"];

#[derive(Debug, Clone)]
struct StoredDoc {
    doc: Document,
    version: u64,
}

/// Process-local [`DocumentStore`] keeping every collection in memory.
///
/// Clones share the underlying collections, so one store can be handed to
/// any number of models and operators.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<&'static str, Vec<StoredDoc>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, schema: &Schema, doc: Document) -> Result<VersionedDoc, StoreError> {
        validate_fields(schema, &doc)?;

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("insert"))?;
        let docs = collections.entry(schema.collection).or_default();

        check_unique(schema, docs, &doc, None)?;

        let id = ObjectId::new();
        let now = bson::DateTime::now();
        let mut stored_doc = Document::new();
        stored_doc.insert("_id", id);
        for (key, value) in doc {
            stored_doc.insert(key, value);
        }
        stored_doc.insert("created_at", now);
        stored_doc.insert("updated_at", now);

        let stored = StoredDoc {
            doc: stored_doc,
            version: 1,
        };
        let result = VersionedDoc {
            doc: stored.doc.clone(),
            version: stored.version,
        };
        docs.push(stored);

        debug!(collection = schema.collection, id = %id, "inserted document");
        Ok(result)
    }

    fn fetch(&self, schema: &Schema, id: &ObjectId) -> Result<VersionedDoc, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("fetch"))?;

        collections
            .get(schema.collection)
            .and_then(|docs| docs.iter().find(|stored| stored_id(&stored.doc) == Some(*id)))
            .map(|stored| VersionedDoc {
                doc: stored.doc.clone(),
                version: stored.version,
            })
            .ok_or_else(|| StoreError::NotFound {
                collection: schema.collection.to_string(),
                id: id.to_hex(),
            })
    }

    fn replace(
        &self,
        schema: &Schema,
        id: &ObjectId,
        doc: Document,
        expected_version: u64,
    ) -> Result<VersionedDoc, StoreError> {
        let mut incoming = doc;
        for key in META_FIELDS {
            incoming.remove(key);
        }
        validate_fields(schema, &incoming)?;

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("replace"))?;
        let docs = collections.entry(schema.collection).or_default();

        let position = docs
            .iter()
            .position(|stored| stored_id(&stored.doc) == Some(*id))
            .ok_or_else(|| StoreError::NotFound {
                collection: schema.collection.to_string(),
                id: id.to_hex(),
            })?;

        if docs[position].version != expected_version {
            return Err(StoreError::VersionConflict {
                collection: schema.collection.to_string(),
                id: id.to_hex(),
                expected: expected_version,
                actual: docs[position].version,
            });
        }

        check_unique(schema, docs, &incoming, Some(*id))?;

        let stored = &mut docs[position];
        let mut next = Document::new();
        next.insert("_id", *id);
        for (key, value) in incoming {
            next.insert(key, value);
        }
        if let Some(created) = stored.doc.get("created_at").cloned() {
            next.insert("created_at", created);
        }
        next.insert("updated_at", bson::DateTime::now());

        stored.doc = next;
        stored.version += 1;

        debug!(collection = schema.collection, id = %id, version = stored.version, "replaced document");
        Ok(VersionedDoc {
            doc: stored.doc.clone(),
            version: stored.version,
        })
    }

    fn find(
        &self,
        schema: &Schema,
        query: &Query,
        fields: Option<&[&str]>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("find"))?;
        let docs = match collections.get(schema.collection) {
            Some(docs) => docs,
            None => return Ok(Vec::new()),
        };

        let results: Vec<Document> = docs
            .iter()
            .filter(|stored| query.matches(&stored.doc))
            .map(|stored| match fields {
                None => stored.doc.clone(),
                Some(fields) => project(&stored.doc, fields),
            })
            .collect();

        trace!(collection = schema.collection, matched = results.len(), "find");
        Ok(results)
    }
}

fn validate_fields(schema: &Schema, doc: &Document) -> Result<(), StoreError> {
    for key in doc.keys() {
        if !schema.declares(key) {
            return Err(StoreError::UndeclaredField {
                collection: schema.collection.to_string(),
                field: key.clone(),
            });
        }
    }
    Ok(())
}

/// Reject `doc` if any unique field holds a non-null value already taken by
/// a different document. `skip` excludes the document being replaced.
fn check_unique(
    schema: &Schema,
    docs: &[StoredDoc],
    doc: &Document,
    skip: Option<ObjectId>,
) -> Result<(), StoreError> {
    for &field in schema.unique {
        let value = match doc.get(field) {
            None | Some(Bson::Null) => continue,
            Some(value) => value,
        };

        let taken = docs.iter().any(|stored| {
            if skip.is_some() && stored_id(&stored.doc) == skip {
                return false;
            }
            stored.doc.get(field) == Some(value)
        });
        if taken {
            return Err(StoreError::DuplicateValue {
                collection: schema.collection.to_string(),
                field,
                value: display_value(value),
            });
        }
    }
    Ok(())
}

fn stored_id(doc: &Document) -> Option<ObjectId> {
    doc.get_object_id("_id").ok()
}

fn display_value(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn project(doc: &Document, fields: &[&str]) -> Document {
    let mut out = Document::new();
    if let Some(id) = doc.get("_id") {
        out.insert("_id", id.clone());
    }
    for &field in fields {
        if field == "_id" {
            continue;
        }
        if let Some(value) = doc.get(field) {
            out.insert(field, value.clone());
        }
    }
    out
}
