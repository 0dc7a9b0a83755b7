use filament::{
    EntityData, Field, Identified, MemoryStore, Model, ReferenceSource, ReferenceSourceData,
    ReferenceSourceFilter, ReferenceSourceInput, SourceKind,
};

use crate::support;

fn seed_catalog(store: &MemoryStore) {
    support::source(store, "The Republic", SourceKind::Print, None);
    support::source(store, "Eine Kleine Nachtmusik", SourceKind::Music, None);
    support::source(
        store,
        "Spider-Man Official Trailer",
        SourceKind::Video,
        Some("https://youtu.be/t06RUxPbp_c"),
    );
    support::source(store, "Smooth Criminal", SourceKind::Music, None);
}

#[test]
fn kind_filter_matches_exactly() {
    let store = MemoryStore::new();
    seed_catalog(&store);

    let filter = ReferenceSourceFilter {
        kind: Some(SourceKind::Music),
        ..ReferenceSourceFilter::default()
    };
    let mut names: Vec<String> = ReferenceSource::find_all(&store, Some(&filter), None)
        .unwrap()
        .into_iter()
        .filter_map(|row| row.name)
        .collect();
    names.sort();
    assert_eq!(names, ["Eine Kleine Nachtmusik", "Smooth Criminal"]);
}

#[test]
fn name_fragment_and_kind_combine() {
    let store = MemoryStore::new();
    seed_catalog(&store);

    let filter = ReferenceSourceFilter {
        name: Some("smooth".to_string()),
        kind: Some(SourceKind::Music),
    };
    assert_eq!(
        ReferenceSource::find_all(&store, Some(&filter), None)
            .unwrap()
            .len(),
        1
    );

    let filter = ReferenceSourceFilter {
        name: Some("smooth".to_string()),
        kind: Some(SourceKind::Print),
    };
    assert!(ReferenceSource::find_all(&store, Some(&filter), None)
        .unwrap()
        .is_empty());
}

#[test]
fn locator_round_trips_through_storage() {
    let store = MemoryStore::new();
    seed_catalog(&store);

    let filter = ReferenceSourceFilter {
        name: Some("spider-man".to_string()),
        ..ReferenceSourceFilter::default()
    };
    let rows = ReferenceSource::find_all(&store, Some(&filter), None).unwrap();
    let trailer = ReferenceSourceData::from_patch(rows[0].clone()).unwrap();

    assert_eq!(trailer.kind, SourceKind::Video);
    assert_eq!(trailer.locator.as_deref(), Some("https://youtu.be/t06RUxPbp_c"));
    assert_eq!(trailer.image_url, None);
}

#[test]
fn nullable_fields_update_and_clear() {
    let store = MemoryStore::new();
    let mut source = support::source(&store, "The Republic", SourceKind::Print, None);

    source
        .set_data(ReferenceSourceInput {
            description: Field::Value("Plato's dialogue on justice.".to_string()),
            ..ReferenceSourceInput::default()
        })
        .unwrap();
    source.save(&store).unwrap();

    let mut fresh = ReferenceSource::new();
    fresh.load(&store, &source.id().unwrap()).unwrap();
    assert_eq!(
        fresh.data().unwrap().description.as_deref(),
        Some("Plato's dialogue on justice.")
    );

    fresh
        .set_data(ReferenceSourceInput {
            description: Field::Null,
            ..ReferenceSourceInput::default()
        })
        .unwrap();
    fresh.save(&store).unwrap();
    fresh.reload(&store).unwrap();
    assert_eq!(fresh.data().unwrap().description, None);
}

#[test]
fn projection_translates_domain_field_names() {
    let store = MemoryStore::new();
    seed_catalog(&store);

    let filter = ReferenceSourceFilter {
        name: Some("nachtmusik".to_string()),
        ..ReferenceSourceFilter::default()
    };
    let rows =
        ReferenceSource::find_all(&store, Some(&filter), Some(&["name", "kind"])).unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert!(row.id.is_some());
    assert_eq!(row.name.as_deref(), Some("Eine Kleine Nachtmusik"));
    assert_eq!(row.kind, Some(SourceKind::Music));
    assert!(row.locator.is_absent());
    assert_eq!(row.statistics, None);
}
