use filament::{
    Bulb, BulbData, BulbFilter, BulbInput, Category, EntityData, Identified, MemoryStore, Model,
    ModelError, ReferenceSource, SourceKind, Tag,
};

use crate::support;

struct Seed {
    store: MemoryStore,
    reflections: Category,
    random_stuffs: Category,
    spiderman: ReferenceSource,
    nachtmusik: ReferenceSource,
    criminal: ReferenceSource,
    art: Tag,
    mozart_tag: Tag,
    good_movies: Tag,
    mozart_bulb: Bulb,
}

/// The three seeded bulbs: "New book unlocked" under Hobbies, "Power and
/// Responsibility" under Reflections citing the Spider-Man trailer, and
/// "If Mozart lives in today" under RandomStuffs citing two pieces of music.
fn seed() -> Seed {
    let store = MemoryStore::new();

    let hobbies = support::category(&store, "Hobbies", Some("About things I like to do."));
    let reflections = support::category(&store, "Reflections", None);
    support::category(&store, "WorkStuffs", None);
    let random_stuffs = support::category(&store, "RandomStuffs", None);

    support::source(&store, "The Republic", SourceKind::Print, None);
    let nachtmusik = support::source(&store, "Eine Kleine Nachtmusik", SourceKind::Music, None);
    let spiderman = support::source(
        &store,
        "Spider-Man Official Trailer",
        SourceKind::Video,
        Some("https://youtu.be/t06RUxPbp_c"),
    );
    let criminal = support::source(&store, "Smooth Criminal", SourceKind::Music, None);

    let art = support::tag(&store, "Art");
    let classical = support::tag(&store, "Classical Music");
    support::tag(&store, "Good Read");
    let mozart_tag = support::child_tag(&store, "Mozart", &classical);
    let good_movies = support::tag(&store, "Good Movies");

    support::bulb(
        &store,
        "New book unlocked",
        "Finished reading The Republic today.",
        &hobbies,
    );

    let mut power = Bulb::new();
    power
        .set_data(BulbInput {
            title: Some("Power and Responsibility".to_string()),
            content: Some("With great power comes great responsibility.".to_string()),
            category: Some(&reflections),
        })
        .unwrap();
    power.add_reference(&spiderman, None).unwrap();
    power.add_tag(&good_movies).unwrap();
    power.save(&store).unwrap();

    let mut mozart_bulb = Bulb::new();
    mozart_bulb
        .set_data(BulbInput {
            title: Some("If Mozart lives in today".to_string()),
            content: Some("He would probably produce film scores.".to_string()),
            category: Some(&random_stuffs),
        })
        .unwrap();
    mozart_bulb
        .add_reference(&nachtmusik, Some("the second movement".to_string()))
        .unwrap();
    mozart_bulb.add_reference(&criminal, None).unwrap();
    mozart_bulb.add_tag(&art).unwrap();
    mozart_bulb.add_tag(&mozart_tag).unwrap();
    mozart_bulb.save(&store).unwrap();

    Seed {
        store,
        reflections,
        random_stuffs,
        spiderman,
        nachtmusik,
        criminal,
        art,
        mozart_tag,
        good_movies,
        mozart_bulb,
    }
}

#[test]
fn a_full_bulb_round_trips_through_find_all() {
    let seed = seed();

    let filter = BulbFilter {
        title: Some("if mozart".to_string()),
        ..BulbFilter::default()
    };
    let rows = Bulb::find_all(&seed.store, Some(&filter), None).unwrap();
    assert_eq!(rows.len(), 1);

    let rebuilt = BulbData::from_patch(rows[0].clone()).unwrap();
    assert_eq!(Some(&rebuilt), seed.mozart_bulb.data());
    assert_eq!(rebuilt.references.len(), 2);
    assert_eq!(
        rebuilt.references[0].detail.as_deref(),
        Some("the second movement")
    );
    assert!(rebuilt.past_versions.is_empty());
}

#[test]
fn title_and_content_fragments_match() {
    let seed = seed();

    let filter = BulbFilter {
        title: Some("mozart".to_string()),
        ..BulbFilter::default()
    };
    let rows = Bulb::find_all(&seed.store, Some(&filter), None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title.as_deref(), Some("If Mozart lives in today"));

    let filter = BulbFilter {
        content: Some("great power".to_string()),
        ..BulbFilter::default()
    };
    let rows = Bulb::find_all(&seed.store, Some(&filter), None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title.as_deref(), Some("Power and Responsibility"));
}

#[test]
fn categories_filter_matches_any_listed_category() {
    let seed = seed();

    let filter = BulbFilter {
        categories: Some(vec![seed.random_stuffs.id().unwrap()]),
        ..BulbFilter::default()
    };
    let rows = Bulb::find_all(&seed.store, Some(&filter), None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title.as_deref(), Some("If Mozart lives in today"));

    let filter = BulbFilter {
        categories: Some(vec![
            seed.reflections.id().unwrap(),
            seed.random_stuffs.id().unwrap(),
        ]),
        ..BulbFilter::default()
    };
    assert_eq!(
        Bulb::find_all(&seed.store, Some(&filter), None).unwrap().len(),
        2
    );
}

#[test]
fn references_filter_reaches_into_citations() {
    let seed = seed();

    let filter = BulbFilter {
        references: Some(vec![seed.criminal.id().unwrap()]),
        ..BulbFilter::default()
    };
    let rows = Bulb::find_all(&seed.store, Some(&filter), None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title.as_deref(), Some("If Mozart lives in today"));

    let filter = BulbFilter {
        references: Some(vec![seed.spiderman.id().unwrap()]),
        ..BulbFilter::default()
    };
    let rows = Bulb::find_all(&seed.store, Some(&filter), None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title.as_deref(), Some("Power and Responsibility"));
}

#[test]
fn tags_filter_matches_any_listed_tag() {
    let seed = seed();

    let filter = BulbFilter {
        tags: Some(vec![seed.good_movies.id().unwrap()]),
        ..BulbFilter::default()
    };
    let rows = Bulb::find_all(&seed.store, Some(&filter), None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title.as_deref(), Some("Power and Responsibility"));

    let filter = BulbFilter {
        tags: Some(vec![
            seed.art.id().unwrap(),
            seed.good_movies.id().unwrap(),
        ]),
        ..BulbFilter::default()
    };
    assert_eq!(
        Bulb::find_all(&seed.store, Some(&filter), None).unwrap().len(),
        2
    );

    let filter = BulbFilter {
        tags: Some(vec![seed.mozart_tag.id().unwrap()]),
        ..BulbFilter::default()
    };
    assert_eq!(
        Bulb::find_all(&seed.store, Some(&filter), None).unwrap().len(),
        1
    );
}

#[test]
fn conditions_combine_as_a_conjunction() {
    let seed = seed();

    let filter = BulbFilter {
        title: Some("mozart".to_string()),
        tags: Some(vec![seed.good_movies.id().unwrap()]),
        ..BulbFilter::default()
    };
    assert!(Bulb::find_all(&seed.store, Some(&filter), None)
        .unwrap()
        .is_empty());
}

#[test]
fn projection_returns_only_the_requested_fields() {
    let seed = seed();

    let rows = Bulb::find_all(&seed.store, None, Some(&["title"])).unwrap();
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert!(row.id.is_some());
        assert!(row.title.is_some());
        assert_eq!(row.category_id, None);
        assert_eq!(row.content, None);
        assert_eq!(row.references, None);
        assert_eq!(row.tag_ids, None);
        assert_eq!(row.created_at, None);
    }
}

#[test]
fn unknown_projection_fields_are_rejected() {
    let seed = seed();

    let err = Bulb::find_all(&seed.store, None, Some(&["title", "color"])).unwrap_err();
    assert_eq!(
        err,
        ModelError::UnknownField {
            field: "color".to_string(),
        }
    );
}

#[test]
fn archived_versions_survive_storage() {
    let seed = seed();
    let mut bulb = seed.mozart_bulb;

    bulb.archive_current_version().unwrap();
    bulb.set_data(BulbInput {
        content: Some("He would score films and tour arenas.".to_string()),
        ..BulbInput::default()
    })
    .unwrap();
    bulb.save(&seed.store).unwrap();

    let mut fresh = Bulb::new();
    fresh.load(&seed.store, &bulb.id().unwrap()).unwrap();
    let data = fresh.data().unwrap();

    assert_eq!(data.content, "He would score films and tour arenas.");
    assert_eq!(data.past_versions.len(), 1);
    assert_eq!(
        data.past_versions[0].content,
        "He would probably produce film scores."
    );
    assert_eq!(fresh.data(), bulb.data());
}

#[test]
fn removing_a_reference_persists() {
    let seed = seed();
    let mut bulb = seed.mozart_bulb;

    bulb.remove_reference(&seed.nachtmusik).unwrap();
    bulb.save(&seed.store).unwrap();

    let mut fresh = Bulb::new();
    fresh.load(&seed.store, &bulb.id().unwrap()).unwrap();
    let references = &fresh.data().unwrap().references;
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].source_id, seed.criminal.id().unwrap());
}
