//! Handler table keyed by `(class, kind)`.

use crate::error::Result;
use crate::types::{ClassId, EventKind};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::event::ModelEvent;

/// A bus callback. Removal matches on the `Arc` allocation, so keep the
/// handle that was passed to [`EventBus::on`] to later pass to [`EventBus::off`].
pub type Handler = Arc<dyn Fn(&ModelEvent) -> Result<()> + Send + Sync>;

type HandlerKey = (ClassId, EventKind);

/// Class-keyed event bus shared by the entity framework and its observers.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<RwLock<HashMap<HandlerKey, Vec<Handler>>>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind` raised by instances of `class`.
    pub fn on(&self, class: &ClassId, kind: &EventKind, handler: Handler) {
        self.handlers
            .write()
            .entry((class.clone(), kind.clone()))
            .or_default()
            .push(handler);
    }

    /// Remove `handler` from `(class, kind)`.
    ///
    /// Only registrations sharing the handler's allocation are removed; other
    /// listeners on the same pair are untouched. Returns whether anything was
    /// removed.
    pub fn off(&self, class: &ClassId, kind: &EventKind, handler: &Handler) -> bool {
        let mut handlers = self.handlers.write();
        let key = (class.clone(), kind.clone());
        let Some(list) = handlers.get_mut(&key) else {
            return false;
        };

        let before = list.len();
        list.retain(|h| !Arc::ptr_eq(h, handler));
        let removed = list.len() != before;

        if list.is_empty() {
            handlers.remove(&key);
        }
        removed
    }

    /// Drop every registration.
    pub fn off_all(&self) {
        self.handlers.write().clear();
    }

    pub fn has_handlers(&self, class: &ClassId, kind: &EventKind) -> bool {
        self.handler_count(class, kind) > 0
    }

    pub fn handler_count(&self, class: &ClassId, kind: &EventKind) -> usize {
        self.handlers
            .read()
            .get(&(class.clone(), kind.clone()))
            .map_or(0, Vec::len)
    }

    /// Every `(class, kind)` pair with at least one handler.
    pub fn active_pairs(&self) -> Vec<(ClassId, EventKind)> {
        self.handlers
            .read()
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Deliver `event` to the handlers registered for its class and kind.
    ///
    /// Handlers run in registration order on the calling thread. The handler
    /// list is snapshotted first, so a handler may register or remove
    /// listeners without deadlocking. The first handler error stops delivery
    /// and is returned.
    pub fn trigger(&self, event: &ModelEvent) -> Result<()> {
        let key = (event.class(), event.kind().clone());
        let handlers: Vec<Handler> = match self.handlers.read().get(&key) {
            Some(list) => list.clone(),
            None => return Ok(()),
        };

        tracing::trace!(
            class = %key.0,
            kind = %key.1,
            handlers = handlers.len(),
            "dispatching model event"
        );

        for handler in handlers {
            handler(event)?;
        }
        Ok(())
    }
}
