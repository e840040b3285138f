//! Change event types delivered to action hosts.

use crate::bus::ModelEvent;
use crate::entity::EntityRef;
use crate::types::ActionContext;
use std::sync::Arc;

/// Name under which change events are published on a host channel.
pub const EVENT_AFTER_MODEL_CHANGE: &str = "afterModelChange";

/// Callback receiving change events.
pub type ChangeCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// An action-scoped notification that a tracked model changed.
///
/// Built once per qualifying raw event and never modified afterwards.
#[derive(Clone, Debug)]
pub struct ChangeEvent {
    model_event: ModelEvent,
    action: Option<Arc<ActionContext>>,
}

impl ChangeEvent {
    pub fn new(model_event: ModelEvent, action: Option<Arc<ActionContext>>) -> Self {
        Self {
            model_event,
            action,
        }
    }

    /// The entity instance that changed.
    pub fn model(&self) -> &EntityRef {
        self.model_event.sender()
    }

    /// The raw event this notification was derived from.
    pub fn model_event(&self) -> &ModelEvent {
        &self.model_event
    }

    /// The action during which the change happened, if one was running.
    pub fn action(&self) -> Option<&ActionContext> {
        self.action.as_deref()
    }
}
