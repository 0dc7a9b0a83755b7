//! Lifecycle-tracked models.
//!
//! An [`Entity`] carries a record's data together with its status: `Empty`
//! until populated, `Dirty` while it holds unsaved edits, `Pristine` once it
//! mirrors the stored record. All mutation funnels through [`Entity::edit`],
//! which validates before touching state, so a failed edit never leaves a
//! half-applied model behind.
//!
//! Concrete models wrap an `Entity` and pick up the shared surface through
//! [`Model`]:
//!
//! ```ignore
//! let mut category = Category::new();
//! category.set_data(CategoryInput {
//!     name: Some("Hobbies".to_string()),
//!     ..CategoryInput::default()
//! })?;
//! category.save(&store)?;
//! assert_eq!(category.status(), ModelStatus::Pristine);
//! ```

mod entity;
mod field;
mod model;
mod record_id;
mod status;

pub use entity::Entity;
pub use field::Field;
pub use model::{Identified, Model};
pub use record_id::RecordId;
pub use status::ModelStatus;
