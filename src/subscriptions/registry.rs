//! Subscription registry attaching one bound callback per tracked pair.

use crate::bus::{EventBus, Handler};
use crate::types::{ClassId, EventKind};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Supplies the default tracked class when none was configured.
pub type ClassResolver = Box<dyn Fn() -> Option<ClassId> + Send + Sync>;

/// One live subscription on the bus.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Registration {
    pub class: ClassId,
    pub kind: EventKind,
}

/// Attachment state of a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryState {
    Detached,
    Attached,
}

/// Maintains the registrations of one callback for `classes × kinds`.
///
/// While attached, the bus holds exactly one registration of the bound
/// callback per tracked pair; while detached it holds none.
pub struct SubscriptionRegistry {
    bus: EventBus,
    /// Bound once; the same allocation is used for every `on` and `off`.
    callback: Handler,
    tracked_events: Vec<EventKind>,
    /// None until explicitly set or resolved.
    tracked_classes: RwLock<Option<Vec<ClassId>>>,
    resolver: Option<ClassResolver>,
    /// Registrations made by the last attach (None = detached).
    active: Mutex<Option<Vec<Registration>>>,
}

impl SubscriptionRegistry {
    /// Create a detached registry tracking the default event kinds and no
    /// explicit classes.
    pub fn new(bus: EventBus, callback: Handler) -> Self {
        Self {
            bus,
            callback,
            tracked_events: EventKind::defaults(),
            tracked_classes: RwLock::new(None),
            resolver: None,
            active: Mutex::new(None),
        }
    }

    /// Replace the configuration.
    ///
    /// With `tracked_classes` unset, `resolver` is asked for a single default
    /// class the first time the classes are needed.
    pub fn configure(
        &mut self,
        tracked_classes: Option<Vec<ClassId>>,
        tracked_events: Vec<EventKind>,
        resolver: Option<ClassResolver>,
    ) {
        *self.tracked_classes.get_mut() = tracked_classes;
        self.tracked_events = tracked_events;
        self.resolver = resolver;
    }

    pub(crate) fn set_resolver(&mut self, resolver: ClassResolver) {
        self.resolver = Some(resolver);
    }

    /// Tracked classes, resolving the default on first use.
    pub fn tracked_classes(&self) -> Vec<ClassId> {
        {
            let classes = self.tracked_classes.read();
            if let Some(classes) = classes.as_ref() {
                return classes.clone();
            }
        }

        let mut classes = self.tracked_classes.write();
        classes
            .get_or_insert_with(|| {
                let resolved: Vec<ClassId> = self
                    .resolver
                    .as_ref()
                    .and_then(|resolve| resolve())
                    .into_iter()
                    .collect();
                tracing::debug!(classes = ?resolved, "resolved default tracked classes");
                resolved
            })
            .clone()
    }

    /// Override the tracked classes.
    ///
    /// Takes effect on the next attach; a current attachment is still
    /// removed exactly as it was made.
    pub fn set_tracked_classes(&self, classes: Vec<ClassId>) {
        *self.tracked_classes.write() = Some(classes);
    }

    pub fn tracked_events(&self) -> &[EventKind] {
        &self.tracked_events
    }

    pub fn state(&self) -> RegistryState {
        if self.active.lock().is_some() {
            RegistryState::Attached
        } else {
            RegistryState::Detached
        }
    }

    pub fn is_attached(&self) -> bool {
        self.state() == RegistryState::Attached
    }

    /// Live registrations (empty while detached).
    pub fn registrations(&self) -> Vec<Registration> {
        self.active.lock().clone().unwrap_or_default()
    }

    /// Register the callback for every tracked `(class, kind)` pair.
    ///
    /// Does nothing if already attached. Returns the number of registrations
    /// made.
    pub fn attach(&self) -> usize {
        let mut active = self.active.lock();
        if active.is_some() {
            tracing::trace!("model event listeners already attached");
            return 0;
        }

        let classes = self.tracked_classes();
        let mut seen = HashSet::new();
        let mut registrations = Vec::with_capacity(classes.len() * self.tracked_events.len());

        for class in &classes {
            for kind in &self.tracked_events {
                let registration = Registration {
                    class: class.clone(),
                    kind: kind.clone(),
                };
                if !seen.insert(registration.clone()) {
                    continue;
                }
                self.bus.on(class, kind, Arc::clone(&self.callback));
                registrations.push(registration);
            }
        }

        let count = registrations.len();
        tracing::debug!(
            classes = classes.len(),
            kinds = self.tracked_events.len(),
            registrations = count,
            "attached model event listeners"
        );

        *active = Some(registrations);
        count
    }

    /// Remove the registrations made by the last [`attach`](Self::attach).
    ///
    /// Other listeners on the same pairs are left in place. Returns the
    /// number of registrations removed.
    pub fn detach(&self) -> usize {
        let Some(registrations) = self.active.lock().take() else {
            return 0;
        };

        let mut removed = 0;
        for registration in &registrations {
            if self
                .bus
                .off(&registration.class, &registration.kind, &self.callback)
            {
                removed += 1;
            }
        }

        tracing::debug!(removed, "detached model event listeners");
        removed
    }
}

impl Drop for SubscriptionRegistry {
    fn drop(&mut self) {
        if self.is_attached() {
            tracing::warn!("subscription registry dropped while attached, detaching");
            self.detach();
        }
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("tracked_classes", &*self.tracked_classes.read())
            .field("tracked_events", &self.tracked_events)
            .field("state", &self.state())
            .finish()
    }
}
