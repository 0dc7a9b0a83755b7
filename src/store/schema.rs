/// Declared shape of one collection.
///
/// `fields` lists the writable top-level fields; a document carrying anything
/// else is rejected outright. `unique` names the fields whose non-null values
/// may not repeat across the collection. The store owns `_id`, `created_at`,
/// and `updated_at`, so schemas never declare those.
#[derive(Debug)]
pub struct Schema {
    pub collection: &'static str,
    pub fields: &'static [&'static str],
    pub unique: &'static [&'static str],
}

impl Schema {
    pub fn declares(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}
