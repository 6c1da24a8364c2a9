//! Whole-document export and import.
//!
//! The presentation file is pretty-printed JSON:
//!
//! ```json
//! {
//!   "slides": [
//!     { "id": "slide-1", "name": "Slide 1",
//!       "canvasData": { "version": "6.7.1", "objects": [], "background": "#ffffff" },
//!       "thumbnail": null }
//!   ],
//!   "activeSlideId": "slide-1",
//!   "version": "1.0",
//!   "timestamp": "2025-01-01T00:00:00.000Z"
//! }
//! ```
//!
//! Import is forgiving about individual slides and strict about the top-level
//! shape. History snapshots use the same document model without the envelope.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DeckResult, Document, EditorConfig, ImportError, SceneData, Slide, SlideId};

/// Version of the presentation file envelope.
pub const FILE_FORMAT_VERSION: &str = "1.0";

/// Name given to imported slides that have none.
pub const UNTITLED_SLIDE: &str = "Untitled Slide";

/// A slide as written to a presentation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedSlide {
    /// Slide id.
    pub id: SlideId,
    /// Display name.
    pub name: String,
    /// Stored scene, never empty in an export.
    #[serde(rename = "canvasData")]
    pub canvas_data: SceneData,
    /// Thumbnail data URI.
    pub thumbnail: Option<String>,
}

/// The presentation file envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationFile {
    /// Slides in display order.
    pub slides: Vec<ExportedSlide>,
    /// Active slide at export time.
    #[serde(rename = "activeSlideId")]
    pub active_slide_id: Option<SlideId>,
    /// Envelope version.
    pub version: String,
    /// Export time, ISO-8601.
    pub timestamp: String,
}

/// Converts documents to and from presentation files and history snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gateway {
    engine_version: String,
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(crate::config::ENGINE_FORMAT_VERSION)
    }
}

impl Gateway {
    /// Create a gateway writing placeholders with the given engine version.
    #[must_use]
    pub fn new(engine_version: impl Into<String>) -> Self {
        Self {
            engine_version: engine_version.into(),
        }
    }

    /// Create a gateway from the editor config.
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.engine_version.clone())
    }

    /// The empty scene written for slides that were never drawn on.
    #[must_use]
    pub fn placeholder(&self) -> SceneData {
        SceneData::placeholder(&self.engine_version)
    }

    /// Build the file envelope for a document.
    #[must_use]
    pub fn to_file(&self, document: &Document, at: DateTime<Utc>) -> PresentationFile {
        let slides = document
            .slides
            .iter()
            .map(|slide| ExportedSlide {
                id: slide.id.clone(),
                name: slide.name.clone(),
                canvas_data: slide.scene.clone().unwrap_or_else(|| self.placeholder()),
                thumbnail: slide.thumbnail.clone(),
            })
            .collect();

        PresentationFile {
            slides,
            active_slide_id: document.active_slide_id.clone(),
            version: FILE_FORMAT_VERSION.to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Export a document as pretty JSON stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_document(&self, document: &Document) -> DeckResult<Vec<u8>> {
        self.export_document_at(document, Utc::now())
    }

    /// Export a document as pretty JSON stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_document_at(&self, document: &Document, at: DateTime<Utc>) -> DeckResult<Vec<u8>> {
        let file = self.to_file(document, at);
        let bytes = serde_json::to_vec_pretty(&file)?;
        tracing::info!(slides = file.slides.len(), bytes = bytes.len(), "Exported presentation");
        Ok(bytes)
    }

    /// Parse and normalize a presentation file.
    ///
    /// Slides missing an id get a fresh one (so do repeated ids), a missing
    /// name becomes `Untitled Slide`, a missing scene becomes the placeholder
    /// and anything but a string thumbnail is dropped. An `activeSlideId` that
    /// is missing or names no slide falls back to the first slide.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] if the bytes are not JSON, the top level is
    /// not an object, or `slides` is missing, not a list, or empty.
    pub fn import_document(&self, bytes: &[u8]) -> Result<Document, ImportError> {
        let value: Value = serde_json::from_slice(bytes).map_err(ImportError::Malformed)?;
        let Value::Object(root) = value else {
            return Err(ImportError::NotAnObject);
        };
        let entries = match root.get("slides") {
            None | Some(Value::Null) => return Err(ImportError::MissingSlides),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(ImportError::SlidesNotAList),
        };
        if entries.is_empty() {
            return Err(ImportError::NoSlides);
        }

        let empty = Map::new();
        let mut slides: Vec<Slide> = Vec::with_capacity(entries.len());
        for entry in entries {
            let fields = entry.as_object().unwrap_or(&empty);
            let id = match fields.get("id").and_then(Value::as_str) {
                Some(id) if !id.is_empty() && !slides.iter().any(|s| s.id.as_str() == id) => {
                    SlideId::new(id)
                }
                _ => SlideId::generate(),
            };
            let name = fields
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .unwrap_or(UNTITLED_SLIDE);
            let scene = match fields.get("canvasData") {
                None | Some(Value::Null) => self.placeholder(),
                Some(scene) => SceneData::from_value(scene.clone()),
            };
            let thumbnail = fields
                .get("thumbnail")
                .and_then(Value::as_str)
                .filter(|thumb| !thumb.is_empty())
                .map(str::to_string);

            slides.push(Slide {
                id,
                name: name.to_string(),
                scene: Some(scene),
                thumbnail,
            });
        }

        let requested = root.get("activeSlideId").and_then(Value::as_str);
        let active = match requested {
            Some(id) if slides.iter().any(|s| s.id.as_str() == id) => SlideId::new(id),
            _ => {
                if let Some(id) = requested {
                    tracing::warn!(id, "Active slide not found in file, using first slide");
                }
                slides[0].id.clone()
            }
        };

        tracing::info!(slides = slides.len(), active = %active, "Imported presentation");
        Ok(Document {
            slides,
            active_slide_id: Some(active),
        })
    }

    /// Encode a document for the history buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot(&self, document: &Document) -> DeckResult<Vec<u8>> {
        Ok(serde_json::to_vec(document)?)
    }

    /// Decode a history snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a snapshot.
    pub fn restore(&self, snapshot: &[u8]) -> DeckResult<Document> {
        Ok(serde_json::from_slice(snapshot)?)
    }
}

/// Suggested download name for an export made at `at`.
#[must_use]
pub fn suggested_file_name(at: DateTime<Utc>) -> String {
    format!("presentation-{}.json", at.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7)
            .single()
            .expect("valid time")
    }

    fn import(value: &Value) -> Result<Document, ImportError> {
        Gateway::default().import_document(value.to_string().as_bytes())
    }

    #[test]
    fn test_export_fills_placeholders() {
        let gateway = Gateway::default();
        let bytes = gateway
            .export_document_at(&Document::new(), fixed_time())
            .expect("export");
        let value: Value = serde_json::from_slice(&bytes).expect("json");

        assert_eq!(value["version"], "1.0");
        assert_eq!(value["timestamp"], "2025-03-04T05:06:07.000Z");
        assert_eq!(value["activeSlideId"], "slide-1");
        assert_eq!(
            value["slides"][0]["canvasData"],
            json!({"version": "6.7.1", "objects": [], "background": "#ffffff"})
        );
        assert_eq!(value["slides"][0]["thumbnail"], Value::Null);
        // Pretty printed.
        assert!(String::from_utf8_lossy(&bytes).contains("\n  \"slides\""));
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(suggested_file_name(fixed_time()), "presentation-2025-03-04.json");
    }

    #[test]
    fn test_import_rejects_bad_shapes() {
        let gateway = Gateway::default();
        assert!(matches!(
            gateway.import_document(b"{ nope"),
            Err(ImportError::Malformed(_))
        ));
        assert!(matches!(import(&json!([1, 2])), Err(ImportError::NotAnObject)));
        assert!(matches!(import(&json!({})), Err(ImportError::MissingSlides)));
        assert!(matches!(
            import(&json!({"slides": "x"})),
            Err(ImportError::SlidesNotAList)
        ));
        assert!(matches!(
            import(&json!({"slides": [], "activeSlideId": "a"})),
            Err(ImportError::NoSlides)
        ));
    }

    #[test]
    fn test_import_normalizes_slides() {
        let doc = import(&json!({
            "slides": [
                {"id": "a", "name": "Intro", "canvasData": {"objects": [{"type": "rect"}]}, "thumbnail": "data:x"},
                {"name": 7},
                {"id": "a"},
                3
            ],
            "activeSlideId": "a"
        }))
        .expect("import");

        assert_eq!(doc.len(), 4);
        assert_eq!(doc.slides[0].name, "Intro");
        assert_eq!(doc.slides[0].thumbnail.as_deref(), Some("data:x"));
        assert!(doc.slides[0].scene.as_ref().is_some_and(SceneData::is_loadable));

        assert_eq!(doc.slides[1].name, UNTITLED_SLIDE);
        assert!(doc.slides[1].id.as_str().starts_with("slide-"));
        assert_eq!(doc.slides[1].scene.as_ref().and_then(SceneData::object_count), Some(0));
        assert_eq!(doc.slides[1].thumbnail, None);

        assert_ne!(doc.slides[2].id, SlideId::new("a"));
        assert!(doc.is_consistent());
        assert_eq!(doc.active_slide_id, Some(SlideId::new("a")));
    }

    #[test]
    fn test_import_unknown_active_falls_back_to_first() {
        let doc = import(&json!({
            "slides": [{"id": "x"}, {"id": "y"}],
            "activeSlideId": "ghost"
        }))
        .expect("import");
        assert_eq!(doc.active_slide_id, Some(SlideId::new("x")));

        let doc = import(&json!({"slides": [{"id": "x"}]})).expect("import");
        assert_eq!(doc.active_slide_id, Some(SlideId::new("x")));
    }

    #[test]
    fn test_export_import_round_trip() {
        let gateway = Gateway::default();
        let mut doc = Document::new();
        doc.slides.push(
            Slide::new(SlideId::new("slide-2"), "Slide 2")
                .with_scene(SceneData::from_value(json!({"version": "6.7.1", "objects": [{"type": "circle", "radius": 5}], "background": "#000000"}))),
        );
        doc.slides[1].thumbnail = Some("data:image/png;base64,AAAA".to_string());
        doc.active_slide_id = Some(SlideId::new("slide-2"));

        let bytes = gateway.export_document(&doc).expect("export");
        let back = gateway.import_document(&bytes).expect("import");

        assert_eq!(back.active_slide_id, doc.active_slide_id);
        assert_eq!(back.slides[1], doc.slides[1]);
        // The never-drawn slide comes back with the placeholder scene.
        assert_eq!(back.slides[0].scene, Some(gateway.placeholder()));
    }

    #[test]
    fn test_snapshot_restore_is_deterministic() {
        let gateway = Gateway::default();
        let doc = Document::new();
        let a = gateway.snapshot(&doc).expect("snapshot");
        let b = gateway.snapshot(&doc).expect("snapshot");
        assert_eq!(a, b);
        assert_eq!(gateway.restore(&a).expect("restore"), doc);
        assert!(gateway.restore(b"nope").is_err());
    }
}
