/// Lifecycle status of an entity model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    /// The model holds no data at all.
    Empty,
    /// The data has not been edited since it was last synced with storage.
    Pristine,
    /// The data has been edited and the change is not yet saved.
    Dirty,
}
