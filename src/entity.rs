//! Entities carried by raw model events.

use crate::types::ClassId;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Attribute name to value mapping.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// A domain entity whose lifecycle events can be tracked.
pub trait Entity: Any + Send + Sync + fmt::Debug {
    /// Class the entity belongs to; events are keyed by it.
    fn class_id(&self) -> ClassId;

    /// Primary key, if the entity has been persisted.
    fn primary_key(&self) -> Option<u64> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Shared reference to the entity instance that raised an event.
pub type EntityRef = Arc<dyn Entity>;

impl dyn Entity {
    /// Downcast to the concrete entity type.
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// A dynamic attribute record, used by [`ModelStore`](crate::store::ModelStore).
///
/// Tracks the attribute values as last persisted so that an update can report
/// which attributes actually changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    class: ClassId,
    id: Option<u64>,
    attributes: Attributes,
    /// Attribute values as last persisted (None = never saved).
    old_attributes: Option<Attributes>,
}

impl Model {
    /// Create a new, unsaved model.
    pub fn new(class: impl Into<ClassId>) -> Self {
        Self {
            class: class.into(),
            id: None,
            attributes: Attributes::new(),
            old_attributes: None,
        }
    }

    /// Builder-style attribute assignment.
    pub fn with(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<serde_json::Value>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    pub fn class(&self) -> &ClassId {
        &self.class
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn is_new_record(&self) -> bool {
        self.old_attributes.is_none()
    }

    /// Attributes whose value differs from the persisted one.
    ///
    /// Values are the old ones (null for attributes that did not exist), so a
    /// new record reports every attribute with a null old value.
    pub fn dirty_attributes(&self) -> Attributes {
        let empty = Attributes::new();
        let old = self.old_attributes.as_ref().unwrap_or(&empty);
        let mut dirty = Attributes::new();
        for (name, value) in &self.attributes {
            match old.get(name) {
                Some(previous) if previous == value => {}
                Some(previous) => {
                    dirty.insert(name.clone(), previous.clone());
                }
                None => {
                    dirty.insert(name.clone(), serde_json::Value::Null);
                }
            }
        }
        dirty
    }

    /// Record the model as persisted under `id` with its current attributes.
    pub(crate) fn mark_persisted(&mut self, id: u64) {
        self.id = Some(id);
        self.old_attributes = Some(self.attributes.clone());
    }

    pub(crate) fn from_row(class: ClassId, id: u64, attributes: Attributes) -> Self {
        Self {
            class,
            id: Some(id),
            old_attributes: Some(attributes.clone()),
            attributes,
        }
    }
}

impl Entity for Model {
    fn class_id(&self) -> ClassId {
        self.class.clone()
    }

    fn primary_key(&self) -> Option<u64> {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_model_is_fully_dirty() {
        let model = Model::new("Item").with("name", "some").with("categoryId", 1);
        assert!(model.is_new_record());

        let dirty = model.dirty_attributes();
        assert_eq!(dirty.len(), 2);
        assert_eq!(dirty.get("name"), Some(&json!(null)));
    }

    #[test]
    fn test_persisted_model_reports_only_changes() {
        let mut model = Model::new("Item").with("name", "some").with("categoryId", 1);
        model.mark_persisted(7);
        assert!(model.dirty_attributes().is_empty());

        model.set("name", "other");
        model.set("categoryId", 1);
        let dirty = model.dirty_attributes();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty.get("name"), Some(&json!("some")));
    }

    #[test]
    fn test_downcast_entity_ref() {
        let entity: EntityRef = Arc::new(Model::new("Item"));
        let model = entity.downcast_ref::<Model>().unwrap();
        assert_eq!(model.class().as_str(), "Item");
        assert_eq!(entity.primary_key(), None);
    }
}
