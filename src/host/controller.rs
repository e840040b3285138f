//! Controller host running actions between filter hooks.

use crate::bus::EventBus;
use crate::error::Result;
use crate::subscriptions::ChangeEvent;
use crate::types::{ActionContext, ClassId};
use std::sync::Arc;

use super::channel::{EventChannel, ListenerId};
use super::current::CurrentAction;

/// Hooks run around every action of a [`Controller`].
pub trait ActionFilter: Send + Sync {
    fn before_action(&self, action: &ActionContext) -> Result<()>;

    fn after_action(&self, action: &ActionContext) -> Result<()>;
}

/// What a host shares with the filters it owns.
#[derive(Clone, Default)]
pub struct HostContext {
    pub bus: EventBus,
    pub channel: EventChannel,
    pub current_action: CurrentAction,
    /// Entity class the host declares, used when a filter tracks no
    /// explicit classes.
    pub model_class: Option<ClassId>,
}

impl HostContext {
    /// A context with a fresh channel and no declared model class.
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            ..Default::default()
        }
    }
}

/// A web-style controller: a named set of actions with filters.
pub struct Controller {
    id: String,
    context: HostContext,
    filters: Vec<(String, Arc<dyn ActionFilter>)>,
}

impl Controller {
    pub fn new(id: impl Into<String>, bus: EventBus) -> Self {
        Self {
            id: id.into(),
            context: HostContext::new(bus),
            filters: Vec::new(),
        }
    }

    /// Declare the entity class this controller manages.
    pub fn with_model_class(mut self, class: impl Into<ClassId>) -> Self {
        self.context.model_class = Some(class.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model_class(&self) -> Option<&ClassId> {
        self.context.model_class.as_ref()
    }

    pub fn bus(&self) -> &EventBus {
        &self.context.bus
    }

    pub fn channel(&self) -> &EventChannel {
        &self.context.channel
    }

    /// Handles for filters that need to reach back into this controller.
    pub fn context(&self) -> HostContext {
        self.context.clone()
    }

    pub fn current_action(&self) -> Option<Arc<ActionContext>> {
        self.context.current_action.get()
    }

    /// Listen on this controller's channel.
    pub fn on<F>(&self, name: &str, callback: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.context.channel.on(name, callback)
    }

    /// Add a filter; filters run in attachment order before an action and
    /// in reverse order after it.
    pub fn attach_filter(&mut self, name: impl Into<String>, filter: Arc<dyn ActionFilter>) {
        let name = name.into();
        self.filters.retain(|(existing, _)| *existing != name);
        self.filters.push((name, filter));
    }

    pub fn detach_filter(&mut self, name: &str) -> Option<Arc<dyn ActionFilter>> {
        let index = self.filters.iter().position(|(existing, _)| existing == name)?;
        Some(self.filters.remove(index).1)
    }

    /// Run an action.
    ///
    /// The after-action hooks of every filter whose before-action hook ran
    /// are called on every exit path: success, error, or panic in `body`.
    pub fn run_action<R, F>(&self, action_id: &str, body: F) -> Result<R>
    where
        F: FnOnce(&ActionContext) -> Result<R>,
    {
        let action = Arc::new(ActionContext::new(&self.id, action_id));
        self.context.current_action.set(Arc::clone(&action));

        let mut scope = ActionScope {
            controller: self,
            action: Arc::clone(&action),
            entered: Vec::new(),
            finished: false,
        };

        for (_, filter) in &self.filters {
            filter.before_action(&action)?;
            scope.entered.push(Arc::clone(filter));
        }

        tracing::trace!(action = %action.unique_id(), "running action");
        let result = body(action.as_ref());
        let cleanup = scope.finish();

        let value = result?;
        cleanup?;
        Ok(value)
    }
}

/// Runs the after-action hooks of entered filters when the action ends.
struct ActionScope<'a> {
    controller: &'a Controller,
    action: Arc<ActionContext>,
    entered: Vec<Arc<dyn ActionFilter>>,
    finished: bool,
}

impl ActionScope<'_> {
    fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.leave()
    }

    /// Returns the first hook error; every hook runs regardless.
    fn leave(&mut self) -> Result<()> {
        let mut first_error = None;
        while let Some(filter) = self.entered.pop() {
            if let Err(e) = filter.after_action(&self.action) {
                first_error.get_or_insert(e);
            }
        }
        self.controller.context.current_action.clear();

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for ActionScope<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.leave() {
            tracing::warn!(
                action = %self.action.unique_id(),
                error = %e,
                "after-action hook failed during abnormal exit"
            );
        }
    }
}
