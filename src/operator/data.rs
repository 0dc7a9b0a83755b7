use bson::Document;

use crate::error::ModelError;
use crate::store::{Query, Schema};

/// Transcoding contract between one entity's domain shape and its stored
/// document.
///
/// `Patch` is the entity's partial form, every field optional. It serves
/// both directions: the lenient decode of a stored document, and the payload
/// of an update. `to_document` is the single point where domain values
/// become raw BSON; it never emits `_id`, `created_at`, or `updated_at`,
/// which belong to the store. `from_document` is deliberately forgiving:
/// missing fields decode to absent, so a projected document decodes the same
/// way a full one does.
pub trait EntityData: Clone + Send + Sync + Sized {
    /// Partial form of the entity.
    type Patch: Clone + Default;
    /// Domain-level search conditions accepted by `find_all`.
    type Filter;

    /// The collection this entity persists to.
    fn schema() -> &'static Schema;

    /// The full data as a patch touching every writable field.
    fn to_patch(&self) -> Self::Patch;

    /// Build complete data from a patch, failing if a required field is
    /// missing.
    fn from_patch(patch: Self::Patch) -> Result<Self, ModelError>;

    /// Encode a patch as a raw document fragment.
    fn to_document(patch: &Self::Patch) -> Result<Document, ModelError>;

    /// Decode a stored, possibly projected, document into a patch.
    fn from_document(doc: &Document) -> Self::Patch;

    /// Map a domain field name to its stored name, or `None` if the entity
    /// has no such field.
    fn raw_field(field: &str) -> Option<&'static str>;

    /// Translate domain filter conditions into a raw query.
    fn filter_query(filter: &Self::Filter) -> Result<Query, ModelError>;
}
