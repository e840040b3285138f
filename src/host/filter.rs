//! Filter-style host for model change tracking.

use crate::config::ModelChangeConfig;
use crate::error::Result;
use crate::subscriptions::{ActionNotifier, Attachable, ChangeEvent, ModelChangeTracker};
use crate::types::{ActionContext, ClassId};
use std::sync::Arc;

use super::controller::{ActionFilter, HostContext};

/// Tracks model changes during the actions of its owning controller.
///
/// Listeners are attached before a selected action runs and detached after
/// it, and each qualifying change is published on the controller's channel
/// under [`EVENT_AFTER_MODEL_CHANGE`](crate::subscriptions::EVENT_AFTER_MODEL_CHANGE).
///
/// ```ignore
/// let mut controller = Controller::new("page", bus.clone()).with_model_class("Page");
/// let filter = ModelChangeFilter::with_on_change(
///     &controller.context(),
///     &ModelChangeConfig {
///         except: vec!["index".into(), "view".into()],
///         ..Default::default()
///     },
///     |_event| cache.mark_flush_required(),
/// );
/// controller.attach_filter("modelChange", Arc::new(filter));
/// ```
pub struct ModelChangeFilter {
    tracker: ModelChangeTracker<ActionNotifier>,
    only: Option<Vec<String>>,
    except: Vec<String>,
}

impl ModelChangeFilter {
    pub fn new(host: &HostContext, config: &ModelChangeConfig) -> Self {
        let notifier = ActionNotifier::new(host.channel.clone(), host.current_action.clone());
        Self::build(host, config, notifier)
    }

    /// Like [`new`](Self::new), also calling `on_change` for every change.
    pub fn with_on_change<F>(host: &HostContext, config: &ModelChangeConfig, on_change: F) -> Self
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let notifier = ActionNotifier::new(host.channel.clone(), host.current_action.clone())
            .with_callback(Arc::new(on_change));
        Self::build(host, config, notifier)
    }

    fn build(host: &HostContext, config: &ModelChangeConfig, notifier: ActionNotifier) -> Self {
        let model_class = host.model_class.clone();
        let tracker = ModelChangeTracker::with_handler(host.bus.clone(), config, notifier)
            .with_class_resolver(move || model_class.clone());

        Self {
            tracker,
            only: config.only.clone(),
            except: config.except.clone(),
        }
    }

    pub fn tracker(&self) -> &ModelChangeTracker<ActionNotifier> {
        &self.tracker
    }

    pub fn tracked_classes(&self) -> Vec<ClassId> {
        self.tracker.tracked_classes()
    }

    pub fn set_tracked_classes(&self, classes: Vec<ClassId>) {
        self.tracker.set_tracked_classes(classes);
    }

    /// Whether the filter applies to the action `action_id`.
    pub fn is_active(&self, action_id: &str) -> bool {
        if self.except.iter().any(|id| id == action_id) {
            return false;
        }
        match &self.only {
            Some(only) => only.iter().any(|id| id == action_id),
            None => true,
        }
    }
}

impl ActionFilter for ModelChangeFilter {
    fn before_action(&self, action: &ActionContext) -> Result<()> {
        if self.is_active(&action.action) {
            self.tracker.attach();
        }
        Ok(())
    }

    fn after_action(&self, action: &ActionContext) -> Result<()> {
        if self.is_active(&action.action) {
            self.tracker.detach();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;

    fn filter_with(only: Option<Vec<&str>>, except: Vec<&str>) -> ModelChangeFilter {
        let config = ModelChangeConfig {
            only: only.map(|ids| ids.into_iter().map(String::from).collect()),
            except: except.into_iter().map(String::from).collect(),
            ..Default::default()
        };
        ModelChangeFilter::new(&HostContext::new(EventBus::new()), &config)
    }

    #[test]
    fn test_is_active_by_default() {
        let filter = filter_with(None, vec![]);
        assert!(filter.is_active("create"));
        assert!(filter.is_active("index"));
    }

    #[test]
    fn test_except_excludes_actions() {
        let filter = filter_with(None, vec!["index", "view"]);
        assert!(!filter.is_active("index"));
        assert!(!filter.is_active("view"));
        assert!(filter.is_active("update"));
    }

    #[test]
    fn test_only_restricts_actions() {
        let filter = filter_with(Some(vec!["create", "update"]), vec!["update"]);
        assert!(filter.is_active("create"));
        assert!(!filter.is_active("update"));
        assert!(!filter.is_active("delete"));
    }

    #[test]
    fn test_without_owner_class_tracks_nothing() {
        let filter = filter_with(None, vec![]);
        assert!(filter.tracked_classes().is_empty());
    }
}
