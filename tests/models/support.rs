//! Builders for the small knowledge base the suites share.

use filament::{
    Bulb, BulbInput, Category, CategoryInput, Field, MemoryStore, Model, ReferenceSource,
    ReferenceSourceInput, SourceKind, Tag, TagInput,
};

pub fn category(store: &MemoryStore, name: &str, description: Option<&str>) -> Category {
    let mut category = Category::new();
    category
        .set_data(CategoryInput {
            name: Some(name.to_string()),
            description: Field::from_option(description.map(str::to_string)),
        })
        .unwrap();
    category.save(store).unwrap();
    category
}

pub fn source(
    store: &MemoryStore,
    name: &str,
    kind: SourceKind,
    locator: Option<&str>,
) -> ReferenceSource {
    let mut source = ReferenceSource::new();
    source
        .set_data(ReferenceSourceInput {
            name: Some(name.to_string()),
            kind: Some(kind),
            locator: Field::from_option(locator.map(str::to_string)),
            ..ReferenceSourceInput::default()
        })
        .unwrap();
    source.save(store).unwrap();
    source
}

pub fn tag(store: &MemoryStore, label: &str) -> Tag {
    let mut tag = Tag::new();
    tag.set_data(TagInput {
        label: Some(label.to_string()),
        ..TagInput::default()
    })
    .unwrap();
    tag.save(store).unwrap();
    tag
}

pub fn child_tag(store: &MemoryStore, label: &str, parent: &Tag) -> Tag {
    let mut tag = Tag::new();
    tag.set_data(TagInput {
        label: Some(label.to_string()),
        ..TagInput::default()
    })
    .unwrap();
    tag.link_to(Some(parent)).unwrap();
    tag.save(store).unwrap();
    tag
}

pub fn bulb(store: &MemoryStore, title: &str, content: &str, category: &Category) -> Bulb {
    let mut bulb = Bulb::new();
    bulb.set_data(BulbInput {
        title: Some(title.to_string()),
        content: Some(content.to_string()),
        category: Some(category),
    })
    .unwrap();
    bulb.save(store).unwrap();
    bulb
}
