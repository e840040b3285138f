//! The attachable model change tracker.

use crate::bus::{EventBus, Handler, ModelEvent};
use crate::config::ModelChangeConfig;
use crate::error::Result;
use crate::types::ClassId;
use std::sync::Arc;

use super::notifier::{ChangeNotifier, ModelChangeHandler, UnimplementedHandler};
use super::registry::{RegistryState, SubscriptionRegistry};

/// Something that subscribes to model events for a bounded scope.
pub trait Attachable {
    fn attach(&self);

    fn detach(&self);

    fn is_attached(&self) -> bool;

    /// Attach now and detach when the returned guard is dropped, including
    /// during unwinding.
    fn attach_scoped(&self) -> Attachment<'_, Self>
    where
        Self: Sized,
    {
        self.attach();
        Attachment { target: self }
    }
}

/// Guard returned by [`Attachable::attach_scoped`].
#[must_use = "listeners are detached as soon as the attachment is dropped"]
pub struct Attachment<'a, A: Attachable + ?Sized> {
    target: &'a A,
}

impl<A: Attachable + ?Sized> Drop for Attachment<'_, A> {
    fn drop(&mut self) {
        self.target.detach();
    }
}

/// Tracks changes of configured model classes and forwards them to `H`.
///
/// Without a handler (`ModelChangeTracker::new`) every qualifying event fails
/// with an `Unimplemented` error.
pub struct ModelChangeTracker<H = UnimplementedHandler> {
    notifier: Arc<ChangeNotifier<H>>,
    registry: SubscriptionRegistry,
}

impl ModelChangeTracker<UnimplementedHandler> {
    pub fn new(bus: EventBus, config: &ModelChangeConfig) -> Self {
        Self::with_handler(bus, config, UnimplementedHandler)
    }
}

impl<H: ModelChangeHandler + 'static> ModelChangeTracker<H> {
    /// Create a detached tracker delivering qualifying events to `handler`.
    pub fn with_handler(bus: EventBus, config: &ModelChangeConfig, handler: H) -> Self {
        let notifier = Arc::new(ChangeNotifier::new(handler, config.require_real_change));

        let bound = Arc::clone(&notifier);
        let callback: Handler = Arc::new(move |event: &ModelEvent| bound.on_model_event(event));

        let mut registry = SubscriptionRegistry::new(bus, callback);
        registry.configure(
            config.tracked_classes.clone(),
            config.tracked_events.clone(),
            None,
        );

        Self { notifier, registry }
    }

    /// Supply the default class used when no classes were configured.
    pub fn with_class_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn() -> Option<ClassId> + Send + Sync + 'static,
    {
        self.registry.set_resolver(Box::new(resolver));
        self
    }

    pub fn tracked_classes(&self) -> Vec<ClassId> {
        self.registry.tracked_classes()
    }

    pub fn set_tracked_classes(&self, classes: Vec<ClassId>) {
        self.registry.set_tracked_classes(classes);
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn handler(&self) -> &H {
        self.notifier.handler()
    }

    /// Run one raw event through the change filter and handler directly.
    pub fn on_model_event(&self, event: &ModelEvent) -> Result<()> {
        self.notifier.on_model_event(event)
    }
}

impl<H: ModelChangeHandler + 'static> Attachable for ModelChangeTracker<H> {
    fn attach(&self) {
        self.registry.attach();
    }

    fn detach(&self) {
        self.registry.detach();
    }

    fn is_attached(&self) -> bool {
        self.registry.state() == RegistryState::Attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Model;
    use crate::error::ModelChangeError;
    use crate::types::EventKind;
    use parking_lot::Mutex;

    fn item_config() -> ModelChangeConfig {
        ModelChangeConfig::for_classes(vec![ClassId::from("Item")])
    }

    fn insert(bus: &EventBus) -> Result<()> {
        let model = Arc::new(Model::new("Item").with("name", "some"));
        let mut changed = crate::entity::Attributes::new();
        changed.insert("name".to_string(), serde_json::Value::Null);
        bus.trigger(&ModelEvent::after_save(EventKind::AfterInsert, model, Some(changed)))
    }

    #[test]
    fn test_scoped_attachment() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(0));
        let seen_clone = Arc::clone(&seen);
        let tracker = ModelChangeTracker::with_handler(
            bus.clone(),
            &item_config(),
            move |_: &ModelEvent| -> Result<()> {
                *seen_clone.lock() += 1;
                Ok(())
            },
        );

        {
            let _scope = tracker.attach_scoped();
            assert!(tracker.is_attached());
            insert(&bus).unwrap();
        }

        assert!(!tracker.is_attached());
        insert(&bus).unwrap();
        assert_eq!(*seen.lock(), 1);
    }

    #[test]
    fn test_scoped_attachment_released_on_panic() {
        let bus = EventBus::new();
        let tracker = ModelChangeTracker::with_handler(
            bus.clone(),
            &item_config(),
            |_: &ModelEvent| -> Result<()> { Ok(()) },
        );

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = tracker.attach_scoped();
            panic!("action failed");
        }));

        assert!(result.is_err());
        assert!(bus.active_pairs().is_empty());
    }

    #[test]
    fn test_base_tracker_requires_handler() {
        let bus = EventBus::new();
        let tracker = ModelChangeTracker::new(bus.clone(), &item_config());
        tracker.attach();

        let result = insert(&bus);
        assert!(matches!(result, Err(ModelChangeError::Unimplemented(_))));
        tracker.detach();
    }

    #[test]
    fn test_class_resolver_default() {
        let tracker = ModelChangeTracker::new(EventBus::new(), &ModelChangeConfig::default())
            .with_class_resolver(|| Some(ClassId::from("Item")));

        assert_eq!(tracker.tracked_classes(), vec![ClassId::from("Item")]);
    }

    #[test]
    fn test_set_tracked_classes() {
        let tracker = ModelChangeTracker::new(EventBus::new(), &ModelChangeConfig::default());
        let classes = vec![ClassId::from("app\\models\\Item"), ClassId::from("app\\models\\User")];

        tracker.set_tracked_classes(classes.clone());
        assert_eq!(tracker.tracked_classes(), classes);
    }
}
