//! Class-keyed event bus for raw model events.
//!
//! The entity framework raises a [`ModelEvent`] after each persistence
//! operation; the bus forwards it to every handler registered for the
//! event's `(class, kind)` pair, synchronously and in registration order.
//!
//! The bus is an explicit handle rather than process-wide state: clone it to
//! share one listener table between the entity framework and its observers.
//!
//! # Example
//!
//! ```ignore
//! let bus = EventBus::new();
//! let handler: Handler = Arc::new(|event: &ModelEvent| {
//!     println!("{} on {}", event.kind(), event.class());
//!     Ok(())
//! });
//!
//! bus.on(&ClassId::from("Item"), &EventKind::AfterInsert, Arc::clone(&handler));
//! assert!(bus.has_handlers(&ClassId::from("Item"), &EventKind::AfterInsert));
//! bus.off(&ClassId::from("Item"), &EventKind::AfterInsert, &handler);
//! ```

mod event;
mod event_bus;

pub use event::{EventPayload, ModelEvent};
pub use event_bus::{EventBus, Handler};
