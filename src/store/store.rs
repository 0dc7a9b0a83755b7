use bson::oid::ObjectId;
use bson::Document;

use super::{Query, Schema, StoreError, VersionedDoc};

/// Persistence contract for schema-validated, versioned documents.
///
/// Implementations must be shareable across threads; every method takes
/// `&self` so one store can serve any number of operators.
pub trait DocumentStore: Send + Sync {
    /// Insert a new document into the schema's collection.
    ///
    /// Rejects undeclared top-level fields and unique-field collisions, then
    /// stamps `_id`, `created_at`, and `updated_at` and assigns version 1.
    /// Returns the document exactly as stored.
    fn insert(&self, schema: &Schema, doc: Document) -> Result<VersionedDoc, StoreError>;

    /// Fetch a document by id.
    fn fetch(&self, schema: &Schema, id: &ObjectId) -> Result<VersionedDoc, StoreError>;

    /// Replace the writable fields of an existing document.
    ///
    /// `expected_version` must match the stored version, otherwise the
    /// replace is rejected and the document left untouched. On success the
    /// store keeps `created_at`, re-stamps `updated_at`, and bumps the
    /// version. Store-owned keys in the payload are ignored.
    fn replace(
        &self,
        schema: &Schema,
        id: &ObjectId,
        doc: Document,
        expected_version: u64,
    ) -> Result<VersionedDoc, StoreError>;

    /// All documents matching `query`, in insertion order.
    ///
    /// `fields` optionally projects each result down to the named top-level
    /// fields; `_id` is always included.
    fn find(
        &self,
        schema: &Schema,
        query: &Query,
        fields: Option<&[&str]>,
    ) -> Result<Vec<Document>, StoreError>;
}
