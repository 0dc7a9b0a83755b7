use crate::error::ModelError;
use crate::operator::EntityData;
use crate::store::DocumentStore;

use super::{Entity, ModelStatus, RecordId};

/// Implemented by every concrete model.
///
/// A model owns an [`Entity`] for its data type and exposes it through the
/// two accessors; everything else is provided. Use [`impl_model!`] to wire a
/// model struct up.
///
/// [`impl_model!`]: crate::impl_model
pub trait Model {
    type Data: EntityData;

    fn entity(&self) -> &Entity<Self::Data>;
    fn entity_mut(&mut self) -> &mut Entity<Self::Data>;

    fn data(&self) -> Option<&Self::Data> {
        self.entity().data()
    }

    fn status(&self) -> ModelStatus {
        self.entity().status()
    }

    fn clear(&mut self) {
        self.entity_mut().clear();
    }

    fn save<S: DocumentStore>(&mut self, store: &S) -> Result<(), ModelError> {
        self.entity_mut().save(store)
    }

    fn load<S: DocumentStore>(&mut self, store: &S, id: &RecordId) -> Result<(), ModelError> {
        self.entity_mut().load(store, id)
    }

    fn reload<S: DocumentStore>(&mut self, store: &S) -> Result<(), ModelError> {
        self.entity_mut().reload(store)
    }
}

/// Something with a storage identity.
///
/// Object safe, so models of different types can stand in for one another
/// wherever only the identifier matters (linking a bulb to its category, a
/// tag to its parent).
pub trait Identified {
    /// The storage-assigned identifier, if the record has one yet.
    fn id(&self) -> Option<RecordId>;
}

impl<M: Model> Identified for M {
    fn id(&self) -> Option<RecordId> {
        self.entity().id()
    }
}

/// Implements [`Model`] for a struct holding an [`Entity`] field.
///
/// ```ignore
/// pub struct Category {
///     entity: Entity<CategoryData>,
/// }
///
/// impl_model!(Category, CategoryData, entity);
/// ```
#[macro_export]
macro_rules! impl_model {
    ($model:ty, $data:ty, $field:ident) => {
        impl $crate::Model for $model {
            type Data = $data;

            fn entity(&self) -> &$crate::Entity<$data> {
                &self.$field
            }

            fn entity_mut(&mut self) -> &mut $crate::Entity<$data> {
                &mut self.$field
            }
        }
    };
}
