use bson::oid::ObjectId;
use filament::{
    Category, CategoryData, CategoryInput, ContextStatistics, Field, Identified, MemoryStore,
    Model, ModelError, ModelStatus, RecordId, StoreError,
};

use crate::support;

#[test]
fn a_fresh_model_is_empty_and_refuses_empty_operations() {
    let store = MemoryStore::new();
    let mut category = Category::new();

    assert_eq!(category.status(), ModelStatus::Empty);
    assert_eq!(category.data(), None);
    assert_eq!(category.id(), None);

    let err = category.save(&store).unwrap_err();
    assert_eq!(err, ModelError::EmptyData { operation: "save" });

    let err = category.reload(&store).unwrap_err();
    assert_eq!(err, ModelError::NeverLoaded);

    assert_eq!(category.status(), ModelStatus::Empty);
}

#[test]
fn edits_mark_dirty_and_saves_mark_pristine() {
    let store = MemoryStore::new();
    let mut category = Category::new();

    category
        .set_data(CategoryInput {
            name: Some("Hobbies".to_string()),
            ..CategoryInput::default()
        })
        .unwrap();
    assert_eq!(category.status(), ModelStatus::Dirty);
    assert_eq!(category.id(), None);

    category.save(&store).unwrap();
    assert_eq!(category.status(), ModelStatus::Pristine);
    assert!(category.id().is_some());
    assert!(category.data().unwrap().created_at.is_some());

    category
        .set_data(CategoryInput {
            description: Field::Value("About things I like to do.".to_string()),
            ..CategoryInput::default()
        })
        .unwrap();
    assert_eq!(category.status(), ModelStatus::Dirty);

    category.save(&store).unwrap();
    assert_eq!(category.status(), ModelStatus::Pristine);
}

#[test]
fn with_data_starts_dirty_and_saves_as_a_new_record() {
    let store = MemoryStore::new();
    let mut category = Category::with_data(CategoryData {
        id: None,
        name: "Imported".to_string(),
        description: None,
        statistics: ContextStatistics::default(),
        deleted_at: None,
        created_at: None,
        updated_at: None,
    });

    assert_eq!(category.status(), ModelStatus::Dirty);
    category.save(&store).unwrap();
    assert_eq!(category.status(), ModelStatus::Pristine);
    assert!(category.id().is_some());
}

#[test]
fn loading_an_already_loaded_record_refreshes_in_place() {
    let store = MemoryStore::new();
    let saved = support::category(&store, "Hobbies", None);
    let id = saved.id().unwrap();

    let mut reader = Category::new();
    reader.load(&store, &id).unwrap();
    assert_eq!(reader.data().unwrap().description, None);

    let mut editor = Category::new();
    editor.load(&store, &id).unwrap();
    editor
        .set_data(CategoryInput {
            description: Field::Value("About things I like to do.".to_string()),
            ..CategoryInput::default()
        })
        .unwrap();
    editor.save(&store).unwrap();

    reader.load(&store, &id).unwrap();
    assert_eq!(
        reader.data().unwrap().description.as_deref(),
        Some("About things I like to do.")
    );
    assert_eq!(reader.status(), ModelStatus::Pristine);
    assert_eq!(reader.data(), editor.data());
}

#[test]
fn loading_a_missing_record_reports_not_found() {
    let store = MemoryStore::new();
    support::category(&store, "Hobbies", None);

    let missing = RecordId::from(ObjectId::new());
    let mut category = Category::new();
    let err = category.load(&store, &missing).unwrap_err();

    assert_eq!(
        err,
        ModelError::NotFound {
            collection: "categories".to_string(),
            id: missing.to_string(),
        }
    );
    assert_eq!(category.status(), ModelStatus::Empty);
    assert_eq!(category.data(), None);
}

#[test]
fn stale_saves_conflict_until_reloaded() {
    let store = MemoryStore::new();
    let saved = support::category(&store, "Hobbies", None);
    let id = saved.id().unwrap();

    let mut a = Category::new();
    a.load(&store, &id).unwrap();
    let mut b = Category::new();
    b.load(&store, &id).unwrap();

    a.set_data(CategoryInput {
        description: Field::Value("About things I like to do.".to_string()),
        ..CategoryInput::default()
    })
    .unwrap();
    a.save(&store).unwrap();

    b.set_data(CategoryInput {
        name: Some("Pastimes".to_string()),
        ..CategoryInput::default()
    })
    .unwrap();
    let err = b.save(&store).unwrap_err();
    assert!(matches!(
        err,
        ModelError::Store(StoreError::VersionConflict { .. })
    ));
    assert_eq!(b.status(), ModelStatus::Dirty);

    b.reload(&store).unwrap();
    assert_eq!(b.status(), ModelStatus::Pristine);
    assert_eq!(b.data().unwrap().name, "Hobbies");
    assert_eq!(
        b.data().unwrap().description.as_deref(),
        Some("About things I like to do.")
    );

    b.set_data(CategoryInput {
        name: Some("Pastimes".to_string()),
        ..CategoryInput::default()
    })
    .unwrap();
    b.save(&store).unwrap();

    let mut fresh = Category::new();
    fresh.load(&store, &id).unwrap();
    assert_eq!(fresh.data().unwrap().name, "Pastimes");
    assert_eq!(
        fresh.data().unwrap().description.as_deref(),
        Some("About things I like to do.")
    );
}

#[test]
fn a_failed_edit_leaves_data_and_status_untouched() {
    let store = MemoryStore::new();
    let mut category = support::category(&store, "Hobbies", None);
    assert_eq!(category.status(), ModelStatus::Pristine);

    let err = category.decrease_total_bulbs().unwrap_err();
    assert_eq!(
        err,
        ModelError::CounterAtZero {
            counter: "total_bulbs",
        }
    );
    assert_eq!(category.status(), ModelStatus::Pristine);
    assert_eq!(category.data().unwrap().statistics.total_bulbs, 0);
}

#[test]
fn clear_resets_to_the_empty_state() {
    let store = MemoryStore::new();
    let mut category = support::category(&store, "Hobbies", None);
    assert_eq!(category.status(), ModelStatus::Pristine);

    category.clear();
    assert_eq!(category.status(), ModelStatus::Empty);
    assert_eq!(category.data(), None);
    assert_eq!(category.id(), None);

    let err = category.save(&store).unwrap_err();
    assert_eq!(err, ModelError::EmptyData { operation: "save" });
}
