//! Serialized scenes.
//!
//! [`SceneTree`] is the drawing engine's interchange format for one slide.
//! [`SceneData`] is the same thing as the document store sees it: an opaque
//! JSON value that is only looked into for the structural validity check.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_BACKGROUND, ENGINE_FORMAT_VERSION};
use crate::{DeckResult, SceneObject};

/// One slide's visual content in the engine's interchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTree {
    /// Interchange format version.
    #[serde(default = "SceneTree::default_version")]
    pub version: String,
    /// Objects in z-order, bottom first.
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    /// Background color as hex.
    #[serde(default = "SceneTree::default_background")]
    pub background: String,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::empty(ENGINE_FORMAT_VERSION)
    }
}

impl SceneTree {
    fn default_version() -> String {
        ENGINE_FORMAT_VERSION.to_string()
    }

    fn default_background() -> String {
        DEFAULT_BACKGROUND.to_string()
    }

    /// An empty scene on a white background.
    #[must_use]
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            objects: Vec::new(),
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }

    /// Number of objects in the scene.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// A serialized scene as stored on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneData(serde_json::Value);

impl SceneData {
    /// Wrap a raw JSON value.
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Serialize a scene tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be represented as JSON.
    pub fn from_tree(tree: &SceneTree) -> DeckResult<Self> {
        Ok(Self(serde_json::to_value(tree)?))
    }

    /// The canonical empty scene written for slides that were never drawn on.
    #[must_use]
    pub fn placeholder(version: &str) -> Self {
        Self(serde_json::json!({
            "version": version,
            "objects": [],
            "background": DEFAULT_BACKGROUND,
        }))
    }

    /// Borrow the raw JSON value.
    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Unwrap into the raw JSON value.
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    /// Number of entries in the `objects` list, or `None` if there is no list.
    #[must_use]
    pub fn object_count(&self) -> Option<usize> {
        self.0
            .get("objects")
            .and_then(serde_json::Value::as_array)
            .map(Vec::len)
    }

    /// Whether this looks like a scene worth handing to the engine:
    /// an object with a non-empty `objects` list.
    #[must_use]
    pub fn is_loadable(&self) -> bool {
        self.0.is_object() && self.object_count().is_some_and(|n| n > 0)
    }

    /// Decode into a typed scene tree.
    ///
    /// Objects are decoded one at a time; an entry that does not decode
    /// (an unknown type tag, a missing field) is logged and left out, so the
    /// rest of the slide still loads.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a scene at all: not a JSON
    /// object, or `objects`, `version` or `background` of the wrong type.
    pub fn to_tree(&self) -> DeckResult<SceneTree> {
        let raw: RawScene = serde_json::from_value(self.0.clone())?;
        let total = raw.objects.len();
        let objects: Vec<SceneObject> = raw
            .objects
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(object) => Some(object),
                Err(e) => {
                    tracing::warn!(index, "Skipping unreadable scene object: {e}");
                    None
                }
            })
            .collect();
        if objects.len() < total {
            tracing::debug!(kept = objects.len(), total, "Decoded scene partially");
        }
        Ok(SceneTree {
            version: raw.version,
            objects,
            background: raw.background,
        })
    }
}

/// Scene envelope with the objects still undecoded.
#[derive(Deserialize)]
struct RawScene {
    #[serde(default = "SceneTree::default_version")]
    version: String,
    #[serde(default)]
    objects: Vec<serde_json::Value>,
    #[serde(default = "SceneTree::default_background")]
    background: String,
}
