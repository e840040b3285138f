//! In-memory entity framework raising raw model events.

use crate::bus::{EventBus, ModelEvent};
use crate::entity::{Attributes, Model};
use crate::error::{ModelChangeError, Result};
use crate::types::{ClassId, EventKind};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Attribute flagging a soft-deleted row.
pub const SOFT_DELETE_ATTRIBUTE: &str = "isDeleted";

/// Key under which an insert reports the assigned primary key as changed.
pub const PRIMARY_KEY_ATTRIBUTE: &str = "id";

/// Rows of one class.
#[derive(Default)]
struct Table {
    next_id: u64,
    rows: BTreeMap<u64, Attributes>,
}

impl Table {
    fn insert(&mut self, attributes: Attributes) -> u64 {
        self.next_id += 1;
        self.rows.insert(self.next_id, attributes);
        self.next_id
    }
}

/// Stores [`Model`] rows per class and raises an event on `bus` after every
/// persistence operation.
///
/// The event sender is the `Arc<Model>` returned by the operation. Saves carry
/// a changed-attributes map keyed by attribute with the previous value (null
/// for new attributes and for the primary key on insert); an update that
/// changed nothing still raises `afterUpdate`, with an empty map.
pub struct ModelStore {
    bus: EventBus,
    tables: RwLock<HashMap<ClassId, Table>>,
}

impl ModelStore {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Insert rows directly, without raising events.
    pub fn seed(&self, class: &ClassId, rows: Vec<Attributes>) -> Vec<u64> {
        let mut tables = self.tables.write();
        let table = tables.entry(class.clone()).or_default();
        rows.into_iter().map(|row| table.insert(row)).collect()
    }

    pub fn find(&self, class: &ClassId, id: u64) -> Option<Model> {
        let tables = self.tables.read();
        let attributes = tables.get(class)?.rows.get(&id)?;
        Some(Model::from_row(class.clone(), id, attributes.clone()))
    }

    pub fn count(&self, class: &ClassId) -> usize {
        self.tables.read().get(class).map_or(0, |t| t.rows.len())
    }

    /// Insert a new model or update a persisted one.
    pub fn save(&self, model: Model) -> Result<Arc<Model>> {
        if model.is_new_record() {
            self.insert(model)
        } else {
            self.update(model)
        }
    }

    /// Insert a new row. The changed map always holds the primary key, so an
    /// insert is a real change even for a model without attributes.
    pub fn insert(&self, mut model: Model) -> Result<Arc<Model>> {
        let mut changed = model.dirty_attributes();
        changed
            .entry(PRIMARY_KEY_ATTRIBUTE.to_string())
            .or_insert(serde_json::Value::Null);
        let id = {
            let mut tables = self.tables.write();
            tables
                .entry(model.class().clone())
                .or_default()
                .insert(model.attributes().clone())
        };
        model.mark_persisted(id);

        let saved = Arc::new(model);
        self.bus.trigger(&ModelEvent::after_save(
            EventKind::AfterInsert,
            saved.clone(),
            Some(changed),
        ))?;
        Ok(saved)
    }

    pub fn update(&self, mut model: Model) -> Result<Arc<Model>> {
        let id = Self::persisted_id(&model)?;
        let changed = model.dirty_attributes();
        self.write_row(model.class(), id, |row| {
            for name in changed.keys() {
                if let Some(value) = model.get(name) {
                    row.insert(name.clone(), value.clone());
                }
            }
        })?;
        model.mark_persisted(id);

        let saved = Arc::new(model);
        self.bus.trigger(&ModelEvent::after_save(
            EventKind::AfterUpdate,
            saved.clone(),
            Some(changed),
        ))?;
        Ok(saved)
    }

    pub fn delete(&self, model: &Model) -> Result<Arc<Model>> {
        let id = Self::persisted_id(model)?;
        let removed = self
            .tables
            .write()
            .get_mut(model.class())
            .and_then(|t| t.rows.remove(&id));
        if removed.is_none() {
            return Err(ModelChangeError::ModelNotFound {
                class: model.class().clone(),
                id,
            });
        }

        let deleted = Arc::new(model.clone());
        self.bus
            .trigger(&ModelEvent::new(EventKind::AfterDelete, deleted.clone()))?;
        Ok(deleted)
    }

    /// Flag the row as deleted, keeping it in place.
    pub fn soft_delete(&self, model: Model) -> Result<Arc<Model>> {
        self.set_deleted_flag(model, true, EventKind::AfterSoftDelete)
    }

    /// Clear the soft-delete flag.
    pub fn restore(&self, model: Model) -> Result<Arc<Model>> {
        self.set_deleted_flag(model, false, EventKind::AfterRestore)
    }

    fn set_deleted_flag(
        &self,
        mut model: Model,
        deleted: bool,
        kind: EventKind,
    ) -> Result<Arc<Model>> {
        let id = Self::persisted_id(&model)?;
        self.write_row(model.class(), id, |row| {
            row.insert(SOFT_DELETE_ATTRIBUTE.to_string(), deleted.into());
        })?;
        model.set(SOFT_DELETE_ATTRIBUTE, deleted);
        model.mark_persisted(id);

        let saved = Arc::new(model);
        self.bus.trigger(&ModelEvent::new(kind, saved.clone()))?;
        Ok(saved)
    }

    fn persisted_id(model: &Model) -> Result<u64> {
        match model.id() {
            Some(id) if !model.is_new_record() => Ok(id),
            _ => Err(ModelChangeError::NotPersisted(model.class().clone())),
        }
    }

    fn write_row<F>(&self, class: &ClassId, id: u64, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Attributes),
    {
        let mut tables = self.tables.write();
        let row = tables
            .get_mut(class)
            .and_then(|t| t.rows.get_mut(&id))
            .ok_or_else(|| ModelChangeError::ModelNotFound {
                class: class.clone(),
                id,
            })?;
        apply(row);
        Ok(())
    }
}
