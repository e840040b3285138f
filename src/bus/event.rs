//! Raw model events produced by the entity framework.

use crate::entity::{Attributes, EntityRef};
use crate::types::{ClassId, EventKind};

/// Extra data carried by a raw event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventPayload {
    /// Delete, soft-delete, restore and custom events.
    Plain,
    /// Save completion. `None` means the framework did not report a diff,
    /// which is distinct from an empty diff.
    Save {
        changed_attributes: Option<Attributes>,
    },
}

/// A persistence notification for one entity instance.
#[derive(Clone, Debug)]
pub struct ModelEvent {
    kind: EventKind,
    sender: EntityRef,
    payload: EventPayload,
}

impl ModelEvent {
    /// A non-save event.
    pub fn new(kind: EventKind, sender: EntityRef) -> Self {
        Self {
            kind,
            sender,
            payload: EventPayload::Plain,
        }
    }

    /// A save-completion event with an optional changed-attributes diff.
    pub fn after_save(
        kind: EventKind,
        sender: EntityRef,
        changed_attributes: Option<Attributes>,
    ) -> Self {
        Self {
            kind,
            sender,
            payload: EventPayload::Save { changed_attributes },
        }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Class of the sender, which keys handler lookup.
    pub fn class(&self) -> ClassId {
        self.sender.class_id()
    }

    /// The entity instance that raised the event.
    pub fn sender(&self) -> &EntityRef {
        &self.sender
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn is_save(&self) -> bool {
        matches!(self.payload, EventPayload::Save { .. })
    }

    pub fn changed_attributes(&self) -> Option<&Attributes> {
        match &self.payload {
            EventPayload::Save { changed_attributes } => changed_attributes.as_ref(),
            EventPayload::Plain => None,
        }
    }
}
