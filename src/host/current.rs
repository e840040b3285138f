//! Shared slot holding the action a host is currently running.

use crate::types::ActionContext;
use parking_lot::RwLock;
use std::sync::Arc;

/// The running action of a host, shared with the notifiers it owns.
#[derive(Clone, Default)]
pub struct CurrentAction(Arc<RwLock<Option<Arc<ActionContext>>>>);

impl CurrentAction {
    pub fn get(&self) -> Option<Arc<ActionContext>> {
        self.0.read().clone()
    }

    pub fn set(&self, action: Arc<ActionContext>) {
        *self.0.write() = Some(action);
    }

    pub fn clear(&self) {
        *self.0.write() = None;
    }
}
