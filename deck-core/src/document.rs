//! Slides, the document that orders them, and the transient editor records
//! (tool and selection) that live next to it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ObjectId, ObjectType, SceneData, SceneObject};

/// Identifier of a slide. Unique within a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(String);

impl SlideId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh unique identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("slide-{}", Uuid::new_v4().simple()))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SlideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlideId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One slide of the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Unique identifier.
    pub id: SlideId,
    /// Display name shown in the slide list.
    pub name: String,
    /// Stored scene; `None` until the slide is first drawn on.
    pub scene: Option<SceneData>,
    /// Low resolution preview as a data URI.
    pub thumbnail: Option<String>,
}

impl Slide {
    /// Create a slide with no stored scene.
    #[must_use]
    pub fn new(id: SlideId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            scene: None,
            thumbnail: None,
        }
    }

    /// Set the stored scene.
    #[must_use]
    pub fn with_scene(mut self, scene: SceneData) -> Self {
        self.scene = Some(scene);
        self
    }
}

/// The ordered slides and the active slide pointer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Slides in display order.
    pub slides: Vec<Slide>,
    /// The slide being edited.
    pub active_slide_id: Option<SlideId>,
}

impl Document {
    /// A document with one empty slide, `slide-1`, which is active.
    #[must_use]
    pub fn new() -> Self {
        let first = SlideId::new("slide-1");
        Self {
            slides: vec![Slide::new(first.clone(), "Slide 1")],
            active_slide_id: Some(first),
        }
    }

    /// Look up a slide by id.
    #[must_use]
    pub fn slide(&self, id: &SlideId) -> Option<&Slide> {
        self.slides.iter().find(|s| &s.id == id)
    }

    /// Look up a slide by id for mutation.
    pub fn slide_mut(&mut self, id: &SlideId) -> Option<&mut Slide> {
        self.slides.iter_mut().find(|s| &s.id == id)
    }

    /// Position of a slide in display order.
    #[must_use]
    pub fn index_of(&self, id: &SlideId) -> Option<usize> {
        self.slides.iter().position(|s| &s.id == id)
    }

    /// Check if a slide exists.
    #[must_use]
    pub fn contains(&self, id: &SlideId) -> bool {
        self.index_of(id).is_some()
    }

    /// The active slide, if the pointer resolves.
    #[must_use]
    pub fn active_slide(&self) -> Option<&Slide> {
        self.active_slide_id.as_ref().and_then(|id| self.slide(id))
    }

    /// Number of slides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Check if there are no slides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Whether the document satisfies its invariants: at least one slide,
    /// unique ids, and an active pointer that resolves.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut ids: Vec<_> = self.slides.iter().map(|s| &s.id).collect();
        ids.sort();
        ids.dedup();
        !self.slides.is_empty() && ids.len() == self.slides.len() && self.active_slide().is_some()
    }
}

/// The toolbar tool currently picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select and move objects.
    #[default]
    Select,
    /// Insert text.
    Text,
    /// Insert rectangles.
    Rectangle,
    /// Insert circles.
    Circle,
    /// Insert lines.
    Line,
    /// Insert images.
    Image,
}

/// Which object is selected and a snapshot of its attributes.
///
/// Derived from the surface; never persisted to a slide.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    /// Identifier of the selected object.
    pub id: Option<ObjectId>,
    /// Typed snapshot of the selected object, including its type tag.
    pub properties: Option<SceneObject>,
}

impl Selection {
    /// Selection of a surface object.
    #[must_use]
    pub fn of(object: &SceneObject) -> Self {
        Self {
            id: object.id.clone(),
            properties: Some(object.clone()),
        }
    }

    /// Check if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.properties.is_none()
    }

    /// Type of the selected object.
    #[must_use]
    pub fn object_type(&self) -> Option<ObjectType> {
        self.properties.as_ref().map(SceneObject::object_type)
    }

    /// Fields a properties panel should show for this selection.
    #[must_use]
    pub fn editable_fields(&self) -> &'static [&'static str] {
        match self.object_type() {
            Some(object_type) => object_type.editable_fields(),
            None => &[],
        }
    }
}
