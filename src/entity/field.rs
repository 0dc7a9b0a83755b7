/// Tri-state value for a nullable field in a partial update.
///
/// A nullable field in a patch carries three meanings that `Option` cannot
/// distinguish on its own: the field was not supplied at all (`Absent`), the
/// field should be cleared to null (`Null`), or the field should take a value.
/// Transcoders emit nothing for `Absent` and an explicit null for `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// The field was not supplied; leave it untouched.
    #[default]
    Absent,
    /// The field is explicitly null.
    Null,
    /// The field has a value.
    Value(T),
}

impl<T> Field<T> {
    /// Treat a populated model's `Option` as an explicit value-or-null.
    pub fn from_option(opt: Option<T>) -> Self {
        match opt {
            Some(value) => Field::Value(value),
            None => Field::Null,
        }
    }

    /// Collapse to an `Option`, folding `Absent` and `Null` together.
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Value(value) => Field::Value(value),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Field<U> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Value(value) => Field::Value(f(value)),
        }
    }

    /// Apply the patch meaning onto an existing `Option` slot:
    /// `Absent` keeps the current value, `Null` clears it, `Value` replaces it.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Field::Absent => {}
            Field::Null => *slot = None,
            Field::Value(value) => *slot = Some(value),
        }
    }
}
