use bson::{Bson, Document};

/// One field condition.
#[derive(Debug, Clone)]
enum Cond {
    /// Case-insensitive substring match against a string field.
    Contains(String),
    /// Exact equality.
    Equals(Bson),
    /// Membership: the field value, or any element of an array field, equals
    /// one of the candidates.
    AnyOf(Vec<Bson>),
}

impl Cond {
    fn matches(&self, value: &Bson) -> bool {
        // An array field matches when any of its elements does.
        if let Bson::Array(items) = value {
            if items.iter().any(|item| self.matches_scalar(item)) {
                return true;
            }
        }
        self.matches_scalar(value)
    }

    fn matches_scalar(&self, value: &Bson) -> bool {
        match self {
            Cond::Contains(needle) => match value {
                Bson::String(s) => s.to_lowercase().contains(needle),
                _ => false,
            },
            Cond::Equals(expected) => value == expected,
            Cond::AnyOf(candidates) => candidates.iter().any(|candidate| candidate == value),
        }
    }
}

/// A conjunction of field conditions.
///
/// Field paths use dots to descend into nested documents; a path segment
/// applied to an array descends into each element, so
/// `references.source_id` reaches into every reference subdocument.
#[derive(Debug, Clone, Default)]
pub struct Query {
    conds: Vec<(String, Cond)>,
}

impl Query {
    /// An empty query, matching every document.
    pub fn new() -> Self {
        Query::default()
    }

    /// Require `field` to contain `needle`, ignoring case.
    pub fn contains(mut self, field: &str, needle: &str) -> Self {
        self.conds
            .push((field.to_string(), Cond::Contains(needle.to_lowercase())));
        self
    }

    /// Require `field` to equal `value` exactly.
    pub fn equals(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.conds
            .push((field.to_string(), Cond::Equals(value.into())));
        self
    }

    /// Require `field` to hold one of `values`.
    pub fn any_of(mut self, field: &str, values: Vec<Bson>) -> Self {
        self.conds.push((field.to_string(), Cond::AnyOf(values)));
        self
    }

    /// Whether every condition holds for `doc`.
    pub(crate) fn matches(&self, doc: &Document) -> bool {
        self.conds.iter().all(|(path, cond)| {
            let segments: Vec<&str> = path.split('.').collect();
            let mut leaves = Vec::new();
            if let Some(value) = doc.get(segments[0]) {
                collect(value, &segments[1..], &mut leaves);
            }
            leaves.iter().any(|value| cond.matches(value))
        })
    }
}

/// Gather the values reached by following `path` from `value`. Arrays are
/// descended element by element without consuming a path segment.
fn collect<'a>(value: &'a Bson, path: &[&str], out: &mut Vec<&'a Bson>) {
    match path.split_first() {
        None => out.push(value),
        Some((head, rest)) => match value {
            Bson::Document(doc) => {
                if let Some(inner) = doc.get(*head) {
                    collect(inner, rest, out);
                }
            }
            Bson::Array(items) => {
                for item in items {
                    collect(item, path, out);
                }
            }
            _ => {}
        },
    }
}
