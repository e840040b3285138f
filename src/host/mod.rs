//! Action hosts: the collaborators that own an action's lifetime.
//!
//! A [`Controller`] runs actions between its filters' before/after hooks and
//! owns a local [`EventChannel`] on which change events are published.
//! [`ModelChangeFilter`] is the filter-style host of a model change tracker.

mod channel;
mod controller;
mod current;
mod filter;

pub use channel::{ChannelSubscription, EventChannel, ListenerId};
pub use controller::{ActionFilter, Controller, HostContext};
pub use current::CurrentAction;
pub use filter::ModelChangeFilter;
