mod config;
mod entity;
mod error;
mod models;
mod operator;
mod store;

pub use config::{Config, ConfigCache, ConfigError, DbConfig};
pub use entity::{Entity, Field, Identified, Model, ModelStatus, RecordId};
pub use error::ModelError;
pub use models::{
    Bulb, BulbData, BulbFilter, BulbInput, BulbPatch, BulbReference, Category, CategoryData,
    CategoryFilter, CategoryInput, CategoryPatch, ContextStatistics, PastVersion, Reference,
    ReferenceData, ReferenceFilter, ReferenceInput, ReferencePatch, ReferenceSource,
    ReferenceSourceData, ReferenceSourceFilter, ReferenceSourceInput, ReferenceSourcePatch,
    SourceKind, Tag, TagData, TagFilter, TagInput, TagPatch, TagStatistics,
};
pub use operator::{EntityData, Operator};
pub use store::{DocumentStore, MemoryStore, Query, Schema, StoreError, VersionedDoc};
