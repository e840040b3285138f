//! Core types for model change tracking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier of a tracked entity class (its type name).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(name: impl Into<String>) -> Self {
        ClassId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClassId {
    fn from(name: &str) -> Self {
        ClassId(name.to_string())
    }
}

impl From<String> for ClassId {
    fn from(name: String) -> Self {
        ClassId(name)
    }
}

/// Label of a persistence event raised by the entity framework.
///
/// The five built-in kinds are the default tracked set; anything else is
/// carried as [`EventKind::Custom`]. Kinds compare and hash by label, so
/// `Custom("afterInsert")` and `AfterInsert` are the same key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    AfterInsert,
    AfterUpdate,
    AfterDelete,
    AfterSoftDelete,
    AfterRestore,
    Custom(String),
}

/// Event kinds tracked when nothing else is configured.
pub const DEFAULT_EVENT_KINDS: [EventKind; 5] = [
    EventKind::AfterInsert,
    EventKind::AfterUpdate,
    EventKind::AfterDelete,
    EventKind::AfterSoftDelete,
    EventKind::AfterRestore,
];

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::AfterInsert => "afterInsert",
            EventKind::AfterUpdate => "afterUpdate",
            EventKind::AfterDelete => "afterDelete",
            EventKind::AfterSoftDelete => "afterSoftDelete",
            EventKind::AfterRestore => "afterRestore",
            EventKind::Custom(name) => name,
        }
    }

    /// The default tracked set as an owned list.
    pub fn defaults() -> Vec<EventKind> {
        DEFAULT_EVENT_KINDS.to_vec()
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for EventKind {}

impl Hash for EventKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "afterInsert" => EventKind::AfterInsert,
            "afterUpdate" => EventKind::AfterUpdate,
            "afterDelete" => EventKind::AfterDelete,
            "afterSoftDelete" => EventKind::AfterSoftDelete,
            "afterRestore" => EventKind::AfterRestore,
            other => EventKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        EventKind::from(name.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventKind({})", self.as_str())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Microseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or_default();
        Timestamp(micros)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// The action currently executing on a host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionContext {
    /// Id of the owning controller.
    pub controller: String,
    /// Id of the action within the controller.
    pub action: String,
    /// When the action began.
    pub started: Timestamp,
}

impl ActionContext {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
            started: Timestamp::now(),
        }
    }

    /// Route-style identifier, e.g. `item/create`.
    pub fn unique_id(&self) -> String {
        format!("{}/{}", self.controller, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_names_round_trip() {
        for kind in DEFAULT_EVENT_KINDS {
            assert_eq!(EventKind::from(kind.as_str()), kind);
        }
        assert_eq!(
            EventKind::from("afterArchive"),
            EventKind::Custom("afterArchive".to_string())
        );
    }

    #[test]
    fn test_event_kind_serde_as_string() {
        let kinds: Vec<EventKind> =
            serde_json::from_str(r#"["afterInsert", "afterPublish"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![
                EventKind::AfterInsert,
                EventKind::Custom("afterPublish".to_string())
            ]
        );
        assert_eq!(
            serde_json::to_string(&EventKind::AfterSoftDelete).unwrap(),
            r#""afterSoftDelete""#
        );
    }

    #[test]
    fn test_custom_kind_with_builtin_label_is_same_key() {
        use std::collections::HashSet;

        let custom = EventKind::Custom("afterInsert".to_string());
        assert_eq!(custom, EventKind::AfterInsert);

        let keys: HashSet<EventKind> = [custom, EventKind::AfterInsert].into_iter().collect();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains(&EventKind::AfterInsert));
        assert_ne!(
            EventKind::Custom("afterArchive".to_string()),
            EventKind::AfterDelete
        );
    }

    #[test]
    fn test_action_unique_id() {
        let action = ActionContext::new("item", "create");
        assert_eq!(action.unique_id(), "item/create");
    }
}
