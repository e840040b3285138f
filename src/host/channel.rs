//! Named local event channel of an action host.

use crate::subscriptions::{ChangeCallback, ChangeEvent};
use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifier of a listener or stream subscription on a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

struct Listener {
    id: ListenerId,
    name: String,
    callback: ChangeCallback,
}

struct Stream {
    id: ListenerId,
    name: String,
    sender: Sender<ChangeEvent>,
}

impl Stream {
    /// Try to send an event. Returns false if the buffer is full or the
    /// receiver is gone (subscriber will be dropped).
    fn try_send(&self, event: ChangeEvent) -> bool {
        self.sender.try_send(event).is_ok()
    }
}

#[derive(Default)]
struct ChannelInner {
    listeners: Vec<Listener>,
    streams: Vec<Stream>,
}

/// A host's own event channel.
///
/// Callbacks registered with [`on`](Self::on) run synchronously in
/// registration order; stream subscribers then receive a clone of the event
/// through a bounded buffer.
#[derive(Clone, Default)]
pub struct EventChannel {
    inner: Arc<RwLock<ChannelInner>>,
    next_id: Arc<AtomicU64>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Register a callback for events published under `name`.
    pub fn on<F>(&self, name: &str, callback: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.inner.write().listeners.push(Listener {
            id,
            name: name.to_string(),
            callback: Arc::new(callback),
        });
        id
    }

    /// Receive events published under `name` through a bounded buffer.
    ///
    /// A subscriber whose buffer overflows is dropped. A `buffer_size` of 0
    /// is raised to 1, since a rendezvous channel would reject every event.
    pub fn subscribe(&self, name: &str, buffer_size: usize) -> ChannelSubscription {
        let id = self.next_id();
        let (sender, receiver) = bounded(buffer_size.max(1));
        self.inner.write().streams.push(Stream {
            id,
            name: name.to_string(),
            sender,
        });
        ChannelSubscription { id, receiver }
    }

    /// Remove a listener or stream subscription.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.write();
        let before = inner.listeners.len() + inner.streams.len();
        inner.listeners.retain(|l| l.id != id);
        inner.streams.retain(|s| s.id != id);
        before != inner.listeners.len() + inner.streams.len()
    }

    pub fn has_handlers(&self, name: &str) -> bool {
        let inner = self.inner.read();
        inner.listeners.iter().any(|l| l.name == name)
            || inner.streams.iter().any(|s| s.name == name)
    }

    /// Number of callbacks and streams registered for `name`.
    pub fn handler_count(&self, name: &str) -> usize {
        let inner = self.inner.read();
        inner.listeners.iter().filter(|l| l.name == name).count()
            + inner.streams.iter().filter(|s| s.name == name).count()
    }

    /// Publish `event` under `name`.
    pub fn trigger(&self, name: &str, event: &ChangeEvent) {
        let callbacks: Vec<ChangeCallback> = self
            .inner
            .read()
            .listeners
            .iter()
            .filter(|l| l.name == name)
            .map(|l| Arc::clone(&l.callback))
            .collect();

        for callback in callbacks {
            callback(event);
        }

        let mut to_remove = Vec::new();
        {
            let inner = self.inner.read();
            for stream in inner.streams.iter().filter(|s| s.name == name) {
                if !stream.try_send(event.clone()) {
                    to_remove.push(stream.id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut inner = self.inner.write();
            inner.streams.retain(|s| !to_remove.contains(&s.id));
            tracing::warn!(
                event = name,
                dropped = to_remove.len(),
                "dropped stalled change subscribers"
            );
        }
    }
}

/// Stream subscription to a host channel.
pub struct ChannelSubscription {
    pub id: ListenerId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<ChangeEvent>,
}

impl ChannelSubscription {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<ChangeEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<ChangeEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<ChangeEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
