//! Action-scoped subscriptions to model persistence events.
//!
//! This module provides the two pieces that turn raw bus events into
//! action-scoped change notifications:
//! - [`SubscriptionRegistry`] attaches one bound callback for every tracked
//!   `(class, kind)` pair and removes exactly those registrations on detach
//! - [`ChangeNotifier`] discards no-op saves and hands qualifying events to a
//!   [`ModelChangeHandler`]
//!
//! [`ModelChangeTracker`] composes both behind the [`Attachable`] capability.
//!
//! # Example
//!
//! ```ignore
//! let bus = EventBus::new();
//! let tracker = ModelChangeTracker::with_handler(
//!     bus.clone(),
//!     &ModelChangeConfig::for_classes(vec!["Item".into()]),
//!     |event: &ModelEvent| {
//!         println!("{} changed", event.class());
//!         Ok(())
//!     },
//! );
//!
//! {
//!     let _scope = tracker.attach_scoped();
//!     // saves raised on `bus` reach the handler here
//! }
//! // listeners are gone once the scope ends
//! ```

mod notifier;
mod registry;
mod tracker;
mod types;

pub use notifier::{ActionNotifier, ChangeNotifier, ModelChangeHandler, UnimplementedHandler};
pub use registry::{ClassResolver, Registration, RegistryState, SubscriptionRegistry};
pub use tracker::{Attachable, Attachment, ModelChangeTracker};
pub use types::{ChangeCallback, ChangeEvent, EVENT_AFTER_MODEL_CHANGE};
