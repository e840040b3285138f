//! # Model Change
//!
//! Action-scoped tracking of model persistence events.
//!
//! A controller "subscribes" to insert/update/delete/soft-delete/restore
//! events of its model classes while one action runs, and re-emits each
//! real change as a single `afterModelChange` event carrying the model and
//! the action context.
//!
//! ## Core Concepts
//!
//! - **Event bus**: explicit class-keyed listener table the entity framework
//!   raises raw events on
//! - **Registry**: attaches one bound callback per tracked `(class, kind)`
//!   pair and removes exactly those on detach
//! - **Notifier**: drops saves that changed nothing and publishes the rest
//! - **Hosts**: controllers whose filters bound a subscription to one action
//!
//! ## Example
//!
//! ```ignore
//! use model_change::{
//!     Controller, EventBus, Model, ModelChangeConfig, ModelChangeFilter, ModelStore,
//!     EVENT_AFTER_MODEL_CHANGE,
//! };
//! use std::sync::Arc;
//!
//! let bus = EventBus::new();
//! let store = ModelStore::new(bus.clone());
//!
//! let mut controller = Controller::new("item", bus.clone()).with_model_class("Item");
//! let filter = ModelChangeFilter::new(&controller.context(), &ModelChangeConfig::default());
//! controller.attach_filter("modelChange", Arc::new(filter));
//!
//! controller.on(EVENT_AFTER_MODEL_CHANGE, |event| {
//!     println!("{:?} changed during {:?}", event.model(), event.action());
//! });
//!
//! controller.run_action("create", |_| {
//!     store.save(Model::new("Item").with("name", "some"))?;
//!     Ok(())
//! })?;
//! ```

pub mod bus;
pub mod config;
pub mod entity;
pub mod error;
pub mod host;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use bus::{EventBus, EventPayload, Handler, ModelEvent};
pub use config::ModelChangeConfig;
pub use entity::{Attributes, Entity, EntityRef, Model};
pub use error::{ModelChangeError, Result};
pub use host::{
    ActionFilter, ChannelSubscription, Controller, CurrentAction, EventChannel, HostContext,
    ListenerId, ModelChangeFilter,
};
pub use store::{ModelStore, PRIMARY_KEY_ATTRIBUTE, SOFT_DELETE_ATTRIBUTE};
pub use subscriptions::{
    ActionNotifier, Attachable, Attachment, ChangeCallback, ChangeEvent, ChangeNotifier,
    ClassResolver, ModelChangeHandler, ModelChangeTracker, Registration, RegistryState,
    SubscriptionRegistry, UnimplementedHandler, EVENT_AFTER_MODEL_CHANGE,
};
pub use types::*;
