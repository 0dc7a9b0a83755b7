use crate::error::ModelError;
use crate::operator::{EntityData, Operator};
use crate::store::DocumentStore;

use super::{ModelStatus, RecordId};

/// Generic lifecycle engine for one domain record.
///
/// Holds the record's data, its dirty-tracking status, and the operator bound
/// to its persisted form (if any). Concrete models wrap an `Entity` and build
/// their domain edits on [`Entity::edit`].
#[derive(Debug)]
pub struct Entity<D: EntityData> {
    data: Option<D>,
    status: ModelStatus,
    operator: Option<Operator<D>>,
}

impl<D: EntityData> Default for Entity<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: EntityData> Entity<D> {
    /// Create an empty model: no data, no bound record.
    pub fn new() -> Self {
        Entity {
            data: None,
            status: ModelStatus::Empty,
            operator: None,
        }
    }

    /// Create a model pre-populated with data. The data counts as an unsaved
    /// edit, so the model starts out dirty.
    pub fn from_data(data: D) -> Self {
        Entity {
            data: Some(data),
            status: ModelStatus::Dirty,
            operator: None,
        }
    }

    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    pub fn status(&self) -> ModelStatus {
        self.status
    }

    /// The storage-assigned identifier, known once the model has been saved
    /// or loaded.
    pub fn id(&self) -> Option<RecordId> {
        self.operator.as_ref().map(Operator::record_id)
    }

    /// Reset all state and return to empty.
    pub fn clear(&mut self) {
        self.data = None;
        self.status = ModelStatus::Empty;
        self.operator = None;
    }

    /// Run an edit closure against the current data and status.
    ///
    /// On success the returned data replaces the current data and the model
    /// becomes dirty. On failure nothing changes: the closure's precondition
    /// checks run before any mutation.
    pub fn edit<F>(&mut self, edit: F) -> Result<(), ModelError>
    where
        F: FnOnce(Option<&D>, ModelStatus) -> Result<D, ModelError>,
    {
        let next = edit(self.data.as_ref(), self.status)?;

        self.data = Some(next);
        self.status = ModelStatus::Dirty;

        Ok(())
    }

    /// Persist the model's data.
    ///
    /// An unbound model inserts a new record and binds its operator; a bound
    /// model pushes the full current state as an update. Either way the data
    /// is re-synced from the stored document afterwards, so the identifier and
    /// the store-stamped timestamps become visible through [`Entity::data`].
    pub fn save<S: DocumentStore>(&mut self, store: &S) -> Result<(), ModelError> {
        let data = match (&self.data, self.status) {
            (Some(data), status) if status != ModelStatus::Empty => data,
            _ => return Err(ModelError::EmptyData { operation: "save" }),
        };

        match self.operator.as_mut() {
            None => {
                // Never persisted: insert and bind the new operator.
                let operator = Operator::create(store, data)?;
                self.data = Some(operator.data()?);
                self.operator = Some(operator);
            }
            Some(operator) => {
                // Already bound: push the full state as an update.
                operator.update(store, &data.to_patch())?;
                self.data = Some(operator.data()?);
            }
        }

        self.status = ModelStatus::Pristine;
        Ok(())
    }

    /// Fetch a record by identifier and populate the model from it.
    ///
    /// Loading the identifier the model is already bound to refreshes the
    /// bound record in place instead of rebinding.
    pub fn load<S: DocumentStore>(&mut self, store: &S, id: &RecordId) -> Result<(), ModelError> {
        match self.operator.as_mut() {
            Some(operator) if operator.record_id() == *id => {
                operator.refresh(store)?;
                self.data = Some(operator.data()?);
            }
            _ => {
                let operator = Operator::retrieve_one(store, id)?;
                self.data = Some(operator.data()?);
                self.operator = Some(operator);
            }
        }

        self.status = ModelStatus::Pristine;
        Ok(())
    }

    /// Re-fetch the bound record. Fails if the model was never saved or
    /// loaded.
    pub fn reload<S: DocumentStore>(&mut self, store: &S) -> Result<(), ModelError> {
        let id = self.id().ok_or(ModelError::NeverLoaded)?;
        self.load(store, &id)
    }
}
