//! Change notifier: filters raw events and relays qualifying ones.

use crate::bus::ModelEvent;
use crate::error::{ModelChangeError, Result};
use crate::host::{CurrentAction, EventChannel};

use super::types::{ChangeCallback, ChangeEvent, EVENT_AFTER_MODEL_CHANGE};

/// Receives raw events that survived change filtering.
pub trait ModelChangeHandler: Send + Sync {
    fn after_model_change(&self, event: &ModelEvent) -> Result<()>;
}

impl<F> ModelChangeHandler for F
where
    F: Fn(&ModelEvent) -> Result<()> + Send + Sync,
{
    fn after_model_change(&self, event: &ModelEvent) -> Result<()> {
        self(event)
    }
}

/// Handler of the base tracker, which has no change logic of its own.
///
/// Every delivered event fails with [`ModelChangeError::Unimplemented`].
#[derive(Clone, Copy, Debug, Default)]
pub struct UnimplementedHandler;

impl ModelChangeHandler for UnimplementedHandler {
    fn after_model_change(&self, _event: &ModelEvent) -> Result<()> {
        Err(ModelChangeError::Unimplemented(
            "ModelChangeHandler::after_model_change".to_string(),
        ))
    }
}

/// Filters no-op saves before handing events to a handler.
pub struct ChangeNotifier<H> {
    /// Discard saves whose changed-attributes map is present but empty.
    require_real_change: bool,
    handler: H,
}

impl<H: ModelChangeHandler> ChangeNotifier<H> {
    pub fn new(handler: H, require_real_change: bool) -> Self {
        Self {
            require_real_change,
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn require_real_change(&self) -> bool {
        self.require_real_change
    }

    /// Bus entry point for every tracked event.
    pub fn on_model_event(&self, event: &ModelEvent) -> Result<()> {
        if self.is_noop_save(event) {
            tracing::trace!(
                class = %event.class(),
                kind = %event.kind(),
                "discarding save without changed attributes"
            );
            return Ok(());
        }

        self.handler.after_model_change(event)
    }

    fn is_noop_save(&self, event: &ModelEvent) -> bool {
        self.require_real_change
            && event.is_save()
            && event.changed_attributes().is_some_and(|changed| changed.is_empty())
    }
}

/// Publishes a [`ChangeEvent`] on the owning host's channel.
///
/// The event is published under [`EVENT_AFTER_MODEL_CHANGE`] first; the
/// optional callback then receives the same event.
pub struct ActionNotifier {
    channel: EventChannel,
    current_action: CurrentAction,
    on_change: Option<ChangeCallback>,
}

impl ActionNotifier {
    pub fn new(channel: EventChannel, current_action: CurrentAction) -> Self {
        Self {
            channel,
            current_action,
            on_change: None,
        }
    }

    pub fn with_callback(mut self, on_change: ChangeCallback) -> Self {
        self.on_change = Some(on_change);
        self
    }
}

impl ModelChangeHandler for ActionNotifier {
    fn after_model_change(&self, event: &ModelEvent) -> Result<()> {
        let change = ChangeEvent::new(event.clone(), self.current_action.get());

        self.channel.trigger(EVENT_AFTER_MODEL_CHANGE, &change);
        if let Some(on_change) = &self.on_change {
            on_change(&change);
        }
        Ok(())
    }
}
