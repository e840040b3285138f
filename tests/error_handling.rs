//! Error handling and edge case tests.

use model_change::{
    Attachable, ClassId, Controller, EventBus, EventKind, Model, ModelChangeConfig,
    ModelChangeError, ModelChangeFilter, ModelChangeTracker, ModelEvent, ModelStore, Result,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn item_config() -> ModelChangeConfig {
    ModelChangeConfig::for_classes(vec![ClassId::from("Item")])
}

// --- Handler Errors ---

#[test]
fn test_base_tracker_fails_on_change() {
    let bus = EventBus::new();
    let store = ModelStore::new(bus.clone());
    let tracker = ModelChangeTracker::new(bus.clone(), &item_config());

    let _scope = tracker.attach_scoped();
    let result = store.save(Model::new("Item").with("name", "some"));

    assert!(matches!(result, Err(ModelChangeError::Unimplemented(_))));
    // The row was written before the after-insert event fired
    assert_eq!(store.count(&ClassId::from("Item")), 1);
}

#[test]
fn test_base_tracker_ignores_noop_save() {
    let bus = EventBus::new();
    let store = ModelStore::new(bus.clone());
    let saved = store.save(Model::new("Item").with("name", "some")).unwrap();

    let tracker = ModelChangeTracker::new(bus.clone(), &item_config());
    let _scope = tracker.attach_scoped();

    // Filtered before the handler is reached
    assert!(store.save((*saved).clone()).is_ok());
}

#[test]
fn test_handler_error_reaches_action_caller() {
    let bus = EventBus::new();
    let store = ModelStore::new(bus.clone());
    let controller = Controller::new("item", bus.clone());

    let tracker = ModelChangeTracker::with_handler(
        bus.clone(),
        &item_config(),
        |event: &ModelEvent| -> Result<()> {
            Err(ModelChangeError::Handler(format!("rejected {}", event.kind())))
        },
    );
    let _scope = tracker.attach_scoped();

    let result = controller.run_action("create", |_| {
        store.save(Model::new("Item").with("name", "some"))?;
        Ok(())
    });

    match result {
        Err(ModelChangeError::Handler(message)) => assert_eq!(message, "rejected afterInsert"),
        other => panic!("Expected handler error, got {:?}", other),
    }
}

// --- No-op Configurations ---

#[test]
fn test_no_tracked_classes_is_noop() {
    let bus = EventBus::new();
    let store = ModelStore::new(bus.clone());
    let mut controller = Controller::new("site", bus.clone());
    let filter = Arc::new(ModelChangeFilter::new(
        &controller.context(),
        &ModelChangeConfig::default(),
    ));
    controller.attach_filter("modelChange", filter.clone());

    controller
        .run_action("create", |_| {
            assert!(bus.active_pairs().is_empty());
            store.save(Model::new("Item").with("name", "some"))?;
            Ok(())
        })
        .unwrap();

    assert!(filter.tracked_classes().is_empty());
    assert!(!filter.tracker().is_attached());
}

#[test]
fn test_empty_event_kinds_is_noop() {
    let bus = EventBus::new();
    let tracker = ModelChangeTracker::new(
        bus.clone(),
        &ModelChangeConfig {
            tracked_events: Vec::new(),
            ..item_config()
        },
    );

    tracker.attach();
    assert!(tracker.is_attached());
    assert!(bus.active_pairs().is_empty());
    tracker.detach();
}

#[test]
fn test_detach_without_attach() {
    let bus = EventBus::new();
    let tracker = ModelChangeTracker::new(bus.clone(), &item_config());

    tracker.detach();
    assert!(!tracker.is_attached());
    assert_eq!(tracker.registry().detach(), 0);
}

// --- Store Misuse ---

#[test]
fn test_update_missing_row() {
    let bus = EventBus::new();
    let store = ModelStore::new(bus);
    let saved = store.save(Model::new("Item").with("name", "some")).unwrap();
    store.delete(&saved).unwrap();

    let result = store.update((*saved).clone());
    assert!(matches!(
        result,
        Err(ModelChangeError::ModelNotFound { id: 1, .. })
    ));
}

#[test]
fn test_soft_delete_unsaved_model() {
    let store = ModelStore::new(EventBus::new());
    let result = store.soft_delete(Model::new("Item"));
    assert!(matches!(result, Err(ModelChangeError::NotPersisted(_))));
}

// --- Configuration Loading ---

#[test]
fn test_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model-change.json");
    fs::write(
        &path,
        r#"{
            "trackedClasses": ["app\\models\\Page", "app\\models\\MenuItem"],
            "trackedEvents": ["afterInsert", "afterDelete"],
            "except": ["index", "view"]
        }"#,
    )
    .unwrap();

    let config = ModelChangeConfig::from_json_file(&path).unwrap();
    assert_eq!(
        config.tracked_classes,
        Some(vec![
            ClassId::from("app\\models\\Page"),
            ClassId::from("app\\models\\MenuItem"),
        ])
    );
    assert_eq!(
        config.tracked_events,
        vec![EventKind::AfterInsert, EventKind::AfterDelete]
    );
    assert!(config.require_real_change);
    assert_eq!(config.except, vec!["index", "view"]);
}

#[test]
fn test_config_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = ModelChangeConfig::from_json_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ModelChangeError::Io(_))));
}

#[test]
fn test_config_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ trackedClasses: ").unwrap();

    let result = ModelChangeConfig::from_json_file(&path);
    assert!(matches!(result, Err(ModelChangeError::Serialization(_))));
}
