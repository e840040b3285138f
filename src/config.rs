//! Tracking configuration.

use crate::error::Result;
use crate::types::{ClassId, EventKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration of a model change tracker or filter.
///
/// Deserializes from JSON with camelCase keys; missing keys take defaults.
///
/// ```json
/// {
///     "trackedClasses": ["app\\models\\Page", "app\\models\\MenuItem"],
///     "trackedEvents": ["afterInsert", "afterUpdate", "afterDelete"],
///     "requireRealChange": true,
///     "except": ["index", "view"]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelChangeConfig {
    /// Classes to track (None = ask the host for its model class).
    pub tracked_classes: Option<Vec<ClassId>>,

    /// Event kinds to track.
    /// Default: insert, update, delete, soft-delete, restore
    pub tracked_events: Vec<EventKind>,

    /// Ignore saves that changed no attributes.
    /// Default: true
    pub require_real_change: bool,

    /// Actions the filter applies to (None = all).
    pub only: Option<Vec<String>>,

    /// Actions the filter never applies to.
    pub except: Vec<String>,
}

impl Default for ModelChangeConfig {
    fn default() -> Self {
        Self {
            tracked_classes: None,
            tracked_events: EventKind::defaults(),
            require_real_change: true,
            only: None,
            except: Vec::new(),
        }
    }
}

impl ModelChangeConfig {
    /// Default configuration tracking `classes` explicitly.
    pub fn for_classes(classes: Vec<ClassId>) -> Self {
        Self {
            tracked_classes: Some(classes),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
