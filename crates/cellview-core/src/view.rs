//! The view data model.
//!
//! A [`View`] is a named, described reference to one engine [`Snapshot`].
//! The snapshot payload is engine-defined JSON (the `mvsj` blob on the
//! wire); cellview stores it and hands it back verbatim, never parses it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque engine-defined scene state.
///
/// Serialized camera, representation, and selection state. Treated as a
/// black box outside the engine.
pub type Snapshot = serde_json::Value;

/// One saved camera/scene configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Unique within a collection. Client-generated for unsaved/demo views,
    /// server-assigned once persisted.
    pub id: String,
    pub name: String,
    pub description: String,
    /// The scene state to restore when this view is loaded.
    #[serde(rename = "mvsj", default)]
    pub snapshot: Option<Snapshot>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Tombstone mirrored from the persistence layer when present.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl View {
    /// Creates a view with no timestamps (the collection stamps them).
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        snapshot: Option<Snapshot>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            snapshot,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }
}

/// Partial update for an existing view.
///
/// Every field is optional; unset fields leave the record untouched. A
/// `screenshot` value is routed to the collection's screenshot cache, not
/// stored on the record - the view's shape carries no inline image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub snapshot: Option<Snapshot>,
    pub screenshot: Option<String>,
}

impl ViewPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the new name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the new snapshot payload.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Sets a screenshot URL destined for the cache.
    #[must_use]
    pub fn with_screenshot(mut self, url: impl Into<String>) -> Self {
        self.screenshot = Some(url.into());
        self
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.snapshot.is_none()
            && self.screenshot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_serializes_as_mvsj() {
        let view = View::new("v1", "Overview", "whole cell", Some(json!({"camera": [0, 0, 1]})));
        let value = serde_json::to_value(&view).unwrap();
        assert!(value.get("mvsj").is_some());
        assert!(value.get("snapshot").is_none());
    }

    #[test]
    fn test_roundtrip_preserves_opaque_payload() {
        let payload = json!({"root": {"kind": "download", "params": {"url": "x"}}});
        let view = View::new("v1", "n", "d", Some(payload.clone()));
        let text = serde_json::to_string(&view).unwrap();
        let back: View = serde_json::from_str(&text).unwrap();
        assert_eq!(back.snapshot, Some(payload));
    }

    #[test]
    fn test_patch_builder() {
        let patch = ViewPatch::new().with_name("B").with_screenshot("data:;base64,");
        assert_eq!(patch.name.as_deref(), Some("B"));
        assert!(patch.description.is_none());
        assert!(!patch.is_empty());
        assert!(ViewPatch::new().is_empty());
    }
}
