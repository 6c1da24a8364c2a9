//! Scene objects - the drawable building blocks of a slide.
//!
//! Objects serialize flat, the way the drawing engine's interchange format
//! lays them out: a `type` tag, the shared geometry fields, then the fields
//! of the concrete variant.
//!
//! ```json
//! { "type": "rect", "id": "slide-1_1700000000000_k3j9x0a2b",
//!   "left": 100.0, "top": 100.0, "width": 200.0, "height": 150.0,
//!   "scaleX": 1.0, "scaleY": 1.0, "angle": 0.0,
//!   "fill": "#3B82F6", "stroke": "#1D4ED8", "strokeWidth": 2.0 }
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an object on a slide.
///
/// Inserted objects get `<slideId>_<unixMillis>_<suffix>` so that edits and
/// selection tracking can address them across serialize/load cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier scoped to a slide.
    #[must_use]
    pub fn generate(slide_id: &str) -> Self {
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
        Self(format!("{slide_id}_{}_{suffix}", unix_millis()))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Position, size and rotation shared by every object type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// X position (pixels from left).
    pub left: f32,
    /// Y position (pixels from top).
    pub top: f32,
    /// Unscaled width in pixels.
    pub width: f32,
    /// Unscaled height in pixels.
    pub height: f32,
    /// Horizontal scale factor.
    #[serde(rename = "scaleX")]
    pub scale_x: f32,
    /// Vertical scale factor.
    #[serde(rename = "scaleY")]
    pub scale_y: f32,
    /// Rotation in degrees.
    pub angle: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }
    }
}

impl Geometry {
    /// Geometry at a position with the given unscaled size.
    #[must_use]
    pub fn at(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            ..Self::default()
        }
    }

    /// Rendered width after scaling.
    #[must_use]
    pub fn scaled_width(&self) -> f32 {
        self.width * self.scale_x
    }

    /// Rendered height after scaling.
    #[must_use]
    pub fn scaled_height(&self) -> f32 {
        self.height * self.scale_y
    }
}

/// Type tag of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    /// Editable text box.
    #[serde(rename = "i-text")]
    Text,
    /// Rectangle.
    #[serde(rename = "rect")]
    Rectangle,
    /// Circle.
    #[serde(rename = "circle")]
    Circle,
    /// Straight line.
    #[serde(rename = "line")]
    Line,
    /// Raster image.
    #[serde(rename = "image")]
    Image,
}

impl ObjectType {
    /// The tag used in the interchange format.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Text => "i-text",
            Self::Rectangle => "rect",
            Self::Circle => "circle",
            Self::Line => "line",
            Self::Image => "image",
        }
    }

    /// Property keys a properties panel offers for this type.
    ///
    /// Geometry keys come first and are shared by all types.
    #[must_use]
    pub const fn editable_fields(self) -> &'static [&'static str] {
        match self {
            Self::Text => &[
                "left", "top", "width", "height", "angle", "text", "fontSize", "fill",
                "fontFamily",
            ],
            Self::Rectangle => &[
                "left", "top", "width", "height", "angle", "fill", "stroke", "strokeWidth",
            ],
            Self::Circle => &[
                "left", "top", "width", "height", "angle", "radius", "fill", "stroke",
                "strokeWidth",
            ],
            Self::Line => &["left", "top", "width", "height", "angle", "stroke", "strokeWidth"],
            Self::Image => &["left", "top", "width", "height", "angle", "opacity"],
        }
    }
}

/// The content of an object, keyed by its type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectKind {
    /// An editable text box.
    #[serde(rename = "i-text")]
    Text {
        /// Text content.
        text: String,
        /// Font family name.
        #[serde(rename = "fontFamily")]
        font_family: String,
        /// Font size in pixels.
        #[serde(rename = "fontSize")]
        font_size: f32,
        /// Text color as hex.
        fill: String,
    },

    /// A rectangle.
    #[serde(rename = "rect")]
    Rectangle {
        /// Fill color as hex.
        fill: String,
        /// Stroke color as hex.
        stroke: String,
        /// Stroke width in pixels.
        #[serde(rename = "strokeWidth")]
        stroke_width: f32,
    },

    /// A circle.
    #[serde(rename = "circle")]
    Circle {
        /// Radius in pixels.
        radius: f32,
        /// Fill color as hex.
        fill: String,
        /// Stroke color as hex.
        stroke: String,
        /// Stroke width in pixels.
        #[serde(rename = "strokeWidth")]
        stroke_width: f32,
    },

    /// A straight line between two points.
    #[serde(rename = "line")]
    Line {
        /// Start X.
        x1: f32,
        /// Start Y.
        y1: f32,
        /// End X.
        x2: f32,
        /// End Y.
        y2: f32,
        /// Stroke color as hex.
        stroke: String,
        /// Stroke width in pixels.
        #[serde(rename = "strokeWidth")]
        stroke_width: f32,
    },

    /// A raster image.
    #[serde(rename = "image")]
    Image {
        /// Image URL or data URI.
        src: String,
        /// Opacity from 0.0 to 1.0.
        #[serde(default = "default_opacity")]
        opacity: f32,
    },
}

const fn default_opacity() -> f32 {
    1.0
}

impl ObjectKind {
    /// The type tag of this content.
    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        match self {
            Self::Text { .. } => ObjectType::Text,
            Self::Rectangle { .. } => ObjectType::Rectangle,
            Self::Circle { .. } => ObjectType::Circle,
            Self::Line { .. } => ObjectType::Line,
            Self::Image { .. } => ObjectType::Image,
        }
    }
}

/// A drawable object on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Identifier; objects created outside the editor may lack one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Position and size.
    #[serde(flatten)]
    pub geometry: Geometry,
    /// Type-specific content.
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl SceneObject {
    /// Create an object without an identifier.
    #[must_use]
    pub fn new(kind: ObjectKind, geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry,
            kind,
        }
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    /// The type tag of this object.
    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        self.kind.object_type()
    }

    /// The text box the toolbar inserts.
    #[must_use]
    pub fn default_text() -> Self {
        Self::new(
            ObjectKind::Text {
                text: "Click to edit text".to_string(),
                font_family: "Arial".to_string(),
                font_size: 24.0,
                fill: "#000000".to_string(),
            },
            Geometry::at(100.0, 100.0, 200.0, 27.0),
        )
    }

    /// The rectangle the toolbar inserts.
    #[must_use]
    pub fn default_rectangle() -> Self {
        Self::new(
            ObjectKind::Rectangle {
                fill: "#3B82F6".to_string(),
                stroke: "#1D4ED8".to_string(),
                stroke_width: 2.0,
            },
            Geometry::at(100.0, 100.0, 200.0, 150.0),
        )
    }

    /// The circle the toolbar inserts.
    #[must_use]
    pub fn default_circle() -> Self {
        Self::new(
            ObjectKind::Circle {
                radius: 75.0,
                fill: "#10B981".to_string(),
                stroke: "#059669".to_string(),
                stroke_width: 2.0,
            },
            Geometry::at(100.0, 100.0, 150.0, 150.0),
        )
    }

    /// The line the toolbar inserts.
    #[must_use]
    pub fn default_line() -> Self {
        Self::new(
            ObjectKind::Line {
                x1: 50.0,
                y1: 50.0,
                x2: 250.0,
                y2: 50.0,
                stroke: "#EF4444".to_string(),
                stroke_width: 3.0,
            },
            Geometry::at(100.0, 100.0, 200.0, 0.0),
        )
    }

    /// An image placed at the default position, shown at half size.
    #[must_use]
    pub fn image(src: impl Into<String>, natural_width: u32, natural_height: u32) -> Self {
        #[allow(clippy::cast_precision_loss)] // Image dimensions fit in f32
        let geometry = Geometry {
            scale_x: 0.5,
            scale_y: 0.5,
            ..Geometry::at(100.0, 100.0, natural_width as f32, natural_height as f32)
        };
        Self::new(
            ObjectKind::Image {
                src: src.into(),
                opacity: 1.0,
            },
            geometry,
        )
    }

    /// Apply a property edit.
    ///
    /// Returns `false` (leaving the object untouched) when the edited field
    /// does not exist on this object's type.
    pub fn apply(&mut self, edit: &PropertyEdit) -> bool {
        let g = &mut self.geometry;
        match (edit, &mut self.kind) {
            (PropertyEdit::Left(v), _) => g.left = *v,
            (PropertyEdit::Top(v), _) => g.top = *v,
            (PropertyEdit::Width(v), _) => g.width = *v,
            (PropertyEdit::Height(v), _) => g.height = *v,
            (PropertyEdit::ScaleX(v), _) => g.scale_x = *v,
            (PropertyEdit::ScaleY(v), _) => g.scale_y = *v,
            (PropertyEdit::Angle(v), _) => g.angle = *v,
            (PropertyEdit::Text(v), ObjectKind::Text { text, .. }) => text.clone_from(v),
            (PropertyEdit::FontFamily(v), ObjectKind::Text { font_family, .. }) => {
                font_family.clone_from(v);
            }
            (PropertyEdit::FontSize(v), ObjectKind::Text { font_size, .. }) => *font_size = *v,
            (
                PropertyEdit::Fill(v),
                ObjectKind::Text { fill, .. }
                | ObjectKind::Rectangle { fill, .. }
                | ObjectKind::Circle { fill, .. },
            ) => fill.clone_from(v),
            (
                PropertyEdit::Stroke(v),
                ObjectKind::Rectangle { stroke, .. }
                | ObjectKind::Circle { stroke, .. }
                | ObjectKind::Line { stroke, .. },
            ) => stroke.clone_from(v),
            (
                PropertyEdit::StrokeWidth(v),
                ObjectKind::Rectangle { stroke_width, .. }
                | ObjectKind::Circle { stroke_width, .. }
                | ObjectKind::Line { stroke_width, .. },
            ) => *stroke_width = *v,
            (PropertyEdit::Radius(v), ObjectKind::Circle { radius, .. }) => {
                *radius = *v;
                g.width = *v * 2.0;
                g.height = *v * 2.0;
            }
            (PropertyEdit::Opacity(v), ObjectKind::Image { opacity, .. }) => {
                *opacity = v.clamp(0.0, 1.0);
            }
            _ => return false,
        }
        true
    }
}

/// A single field edit coming from the properties panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    /// X position.
    Left(f32),
    /// Y position.
    Top(f32),
    /// Unscaled width.
    Width(f32),
    /// Unscaled height.
    Height(f32),
    /// Horizontal scale.
    ScaleX(f32),
    /// Vertical scale.
    ScaleY(f32),
    /// Rotation in degrees.
    Angle(f32),
    /// Text content.
    Text(String),
    /// Font family.
    FontFamily(String),
    /// Font size.
    FontSize(f32),
    /// Fill color.
    Fill(String),
    /// Stroke color.
    Stroke(String),
    /// Stroke width.
    StrokeWidth(f32),
    /// Circle radius.
    Radius(f32),
    /// Image opacity.
    Opacity(f32),
}

impl PropertyEdit {
    /// Parse a panel key/value pair.
    ///
    /// Returns `None` for unknown keys or values of the wrong JSON type.
    #[must_use]
    pub fn from_key_value(key: &str, value: &serde_json::Value) -> Option<Self> {
        #[allow(clippy::cast_possible_truncation)] // Panel values are f32 geometry
        let number = || value.as_f64().map(|v| v as f32);
        let string = || value.as_str().map(str::to_string);
        Some(match key {
            "left" => Self::Left(number()?),
            "top" => Self::Top(number()?),
            "width" => Self::Width(number()?),
            "height" => Self::Height(number()?),
            "scaleX" => Self::ScaleX(number()?),
            "scaleY" => Self::ScaleY(number()?),
            "angle" => Self::Angle(number()?),
            "text" => Self::Text(string()?),
            "fontFamily" => Self::FontFamily(string()?),
            "fontSize" => Self::FontSize(number()?),
            "fill" => Self::Fill(string()?),
            "stroke" => Self::Stroke(string()?),
            "strokeWidth" => Self::StrokeWidth(number()?),
            "radius" => Self::Radius(number()?),
            "opacity" => Self::Opacity(number()?),
            _ => return None,
        })
    }

    /// The panel key this edit targets.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Left(_) => "left",
            Self::Top(_) => "top",
            Self::Width(_) => "width",
            Self::Height(_) => "height",
            Self::ScaleX(_) => "scaleX",
            Self::ScaleY(_) => "scaleY",
            Self::Angle(_) => "angle",
            Self::Text(_) => "text",
            Self::FontFamily(_) => "fontFamily",
            Self::FontSize(_) => "fontSize",
            Self::Fill(_) => "fill",
            Self::Stroke(_) => "stroke",
            Self::StrokeWidth(_) => "strokeWidth",
            Self::Radius(_) => "radius",
            Self::Opacity(_) => "opacity",
        }
    }
}

/// Current Unix time in milliseconds.
pub(crate) fn unix_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_id_is_scoped_to_slide() {
        let id = ObjectId::generate("slide-1");
        let parts: Vec<_> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "slide-1");
        assert!(parts[1].parse::<u64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert_ne!(id, ObjectId::generate("slide-1"));
    }

    #[test]
    fn test_object_serializes_flat_with_type_tag() {
        let rect = SceneObject::default_rectangle().with_id(ObjectId::new("r1"));
        let value = serde_json::to_value(&rect).expect("serialize");
        assert_eq!(value["type"], "rect");
        assert_eq!(value["id"], "r1");
        assert_eq!(value["left"], 100.0);
        assert_eq!(value["strokeWidth"], 2.0);
        assert_eq!(value["scaleX"], 1.0);
    }

    #[test]
    fn test_object_parses_engine_json() {
        let value = json!({
            "type": "i-text",
            "left": 10,
            "top": 20,
            "text": "Hello",
            "fontFamily": "Arial",
            "fontSize": 18,
            "fill": "#111111"
        });
        let object: SceneObject = serde_json::from_value(value).expect("parse");
        assert!(object.id.is_none());
        assert_eq!(object.object_type(), ObjectType::Text);
        assert!((object.geometry.scale_x - 1.0).abs() < f32::EPSILON);
        assert!((object.geometry.top - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_apply_rejects_fields_of_other_types() {
        let mut rect = SceneObject::default_rectangle();
        let before = rect.clone();
        assert!(!rect.apply(&PropertyEdit::FontSize(40.0)));
        assert!(!rect.apply(&PropertyEdit::Opacity(0.5)));
        assert_eq!(rect, before);

        assert!(rect.apply(&PropertyEdit::Fill("#000000".to_string())));
        assert!(rect.apply(&PropertyEdit::Left(5.0)));
        assert!((rect.geometry.left - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_apply_text_fields() {
        let mut text = SceneObject::default_text();
        assert!(text.apply(&PropertyEdit::Text("Title".to_string())));
        assert!(text.apply(&PropertyEdit::FontSize(48.0)));
        match &text.kind {
            ObjectKind::Text {
                text, font_size, ..
            } => {
                assert_eq!(text, "Title");
                assert!((font_size - 48.0).abs() < f32::EPSILON);
            }
            other => panic!("expected text, got {other:?}"),
        }
        assert!(!text.apply(&PropertyEdit::StrokeWidth(3.0)));
    }

    #[test]
    fn test_image_opacity_is_clamped() {
        let mut image = SceneObject::image("https://example.com/cat.png", 400, 300);
        assert!(image.apply(&PropertyEdit::Opacity(3.0)));
        assert!(matches!(image.kind, ObjectKind::Image { opacity, .. } if (opacity - 1.0).abs() < f32::EPSILON));
        assert!((image.geometry.scaled_width() - 200.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_property_edit_from_key_value() {
        assert_eq!(
            PropertyEdit::from_key_value("fontSize", &json!(32)),
            Some(PropertyEdit::FontSize(32.0))
        );
        assert_eq!(
            PropertyEdit::from_key_value("fill", &json!("#ff0000")),
            Some(PropertyEdit::Fill("#ff0000".to_string()))
        );
        assert_eq!(PropertyEdit::from_key_value("fill", &json!(3)), None);
        assert_eq!(PropertyEdit::from_key_value("shadow", &json!("x")), None);
        assert_eq!(PropertyEdit::StrokeWidth(1.0).key(), "strokeWidth");
    }

    #[test]
    fn test_editable_fields_follow_type() {
        assert!(ObjectType::Text.editable_fields().contains(&"fontFamily"));
        assert!(ObjectType::Line.editable_fields().contains(&"strokeWidth"));
        assert!(ObjectType::Image.editable_fields().contains(&"opacity"));
        assert!(!ObjectType::Image.editable_fields().contains(&"fill"));
    }
}
