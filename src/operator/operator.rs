use std::marker::PhantomData;

use bson::oid::ObjectId;
use bson::Document;

use crate::entity::RecordId;
use crate::error::ModelError;
use crate::store::{DocumentStore, Query, StoreError, VersionedDoc};

use super::EntityData;

/// Binding between one stored record and its domain type.
///
/// An operator holds the record's identifier, the raw document as last read,
/// and the version of that read. Updates are applied on top of the held
/// document and pushed at the held version, so a concurrent writer surfaces
/// as a version conflict instead of being silently overwritten.
#[derive(Debug, Clone)]
pub struct Operator<D: EntityData> {
    id: ObjectId,
    doc: Document,
    version: u64,
    _marker: PhantomData<D>,
}

impl<D: EntityData> Operator<D> {
    /// Insert `data` as a new record and bind an operator to it.
    pub fn create<S: DocumentStore>(store: &S, data: &D) -> Result<Self, ModelError> {
        let doc = D::to_document(&data.to_patch())?;
        let stored = store.insert(D::schema(), doc)?;
        Self::bind(stored)
    }

    /// Bind an operator to an existing record.
    pub fn retrieve_one<S: DocumentStore>(store: &S, id: &RecordId) -> Result<Self, ModelError> {
        let object_id = id.object_id()?;
        let stored = store.fetch(D::schema(), &object_id)?;
        Self::bind(stored)
    }

    /// Fetch every record matching `filter`, decoded to patches.
    ///
    /// `fields` optionally projects the results down to the named domain
    /// fields; the identifier is always included. Naming a field the entity
    /// does not have is an error.
    pub fn find_all<S: DocumentStore>(
        store: &S,
        filter: Option<&D::Filter>,
        fields: Option<&[&str]>,
    ) -> Result<Vec<D::Patch>, ModelError> {
        let query = match filter {
            Some(filter) => D::filter_query(filter)?,
            None => Query::new(),
        };

        let raw_fields = match fields {
            Some(fields) => {
                let mut raw = Vec::with_capacity(fields.len());
                for &field in fields {
                    let mapped = D::raw_field(field).ok_or_else(|| ModelError::UnknownField {
                        field: field.to_string(),
                    })?;
                    raw.push(mapped);
                }
                Some(raw)
            }
            None => None,
        };

        let docs = store.find(D::schema(), &query, raw_fields.as_deref())?;
        Ok(docs.iter().map(D::from_document).collect())
    }

    fn bind(stored: VersionedDoc) -> Result<Self, ModelError> {
        let id = stored.doc.get_object_id("_id").map_err(|_| {
            ModelError::Store(StoreError::Malformed(
                "stored document has no _id".to_string(),
            ))
        })?;

        Ok(Operator {
            id,
            doc: stored.doc,
            version: stored.version,
            _marker: PhantomData,
        })
    }

    /// The bound record's identifier.
    pub fn record_id(&self) -> RecordId {
        RecordId::from(self.id)
    }

    /// Decode the held document into complete domain data.
    pub fn data(&self) -> Result<D, ModelError> {
        D::from_patch(D::from_document(&self.doc))
    }

    /// Re-read the bound record, adopting its current contents and version.
    pub fn refresh<S: DocumentStore>(&mut self, store: &S) -> Result<(), ModelError> {
        let stored = store.fetch(D::schema(), &self.id)?;
        self.doc = stored.doc;
        self.version = stored.version;
        Ok(())
    }

    /// Apply `patch` on top of the held document and push the result as a
    /// versioned replace.
    pub fn update<S: DocumentStore>(
        &mut self,
        store: &S,
        patch: &D::Patch,
    ) -> Result<(), ModelError> {
        let fragment = D::to_document(patch)?;

        let mut next = self.doc.clone();
        for (key, value) in fragment {
            next.insert(key, value);
        }

        let stored = store.replace(D::schema(), &self.id, next, self.version)?;
        self.doc = stored.doc;
        self.version = stored.version;
        Ok(())
    }

    /// Deleting records is not supported yet.
    // TODO: decide between hard deletes and flipping deleted_at before
    // wiring this to the store.
    pub fn delete(&self) -> Result<(), ModelError> {
        Err(ModelError::NotImplemented {
            operation: "delete",
        })
    }
}
