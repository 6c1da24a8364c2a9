//! The drawing engine boundary.
//!
//! The scene adapter owns exactly one [`Surface`]. Everything the engine does
//! on its own initiative (selection changes, object graph changes, finished
//! loads) reaches the adapter as a [`SurfaceEvent`](crate::SurfaceEvent) on
//! the sink the surface was built with.

use base64::Engine as _;

use crate::{CanvasSpec, EventSink, LoadTicket, ObjectId, SceneData, SceneObject, SceneTree, SurfaceError};

/// A live, stateful drawing surface.
pub trait Surface {
    /// Remove every object and discard the active object.
    fn clear(&mut self);

    /// Set the background color.
    fn set_background(&mut self, color: &str);

    /// Add an object on top of the stack. Emits `ObjectAdded`.
    fn add(&mut self, object: SceneObject);

    /// Remove an object. Emits `ObjectRemoved` when something was removed.
    fn remove(&mut self, id: &ObjectId) -> Option<SceneObject>;

    /// Objects in z-order, bottom first.
    fn objects(&self) -> &[SceneObject];

    /// Look up an object for in-place edits. Editing through this does not
    /// emit events.
    fn object_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject>;

    /// Make an object the active one. Emits a selection event and returns
    /// `false` if there is no such object.
    fn set_active_object(&mut self, id: &ObjectId) -> bool;

    /// The active object.
    fn active_object(&self) -> Option<&SceneObject>;

    /// Drop the active object. Emits `SelectionCleared` if one was active.
    fn discard_active_object(&mut self);

    /// Serialize the whole surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot produce a scene tree.
    fn serialize(&self) -> Result<SceneTree, SurfaceError>;

    /// Start decoding a stored scene.
    ///
    /// Completion is posted as `Loaded { ticket, .. }`, possibly long after
    /// this returns or never at all.
    fn begin_load(&mut self, scene: SceneData, ticket: LoadTicket);

    /// Install a decoded scene, replacing the current content. Emits
    /// `ObjectAdded` for every installed object.
    fn finish_load(&mut self, tree: SceneTree);

    /// Rasterize the surface to PNG at `scale` times its size.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails.
    fn rasterize(&self, scale: f32) -> Result<Vec<u8>, SurfaceError>;

    /// Repaint.
    fn render(&mut self);

    /// Build an image object from a source, learning its natural size.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded.
    fn create_image(&self, source: &ImageSource) -> Result<SceneObject, SurfaceError>;
}

/// Builds a surface for the adapter when one is attached.
pub trait SurfaceFactory<S: Surface> {
    /// Create an empty surface with the given canvas spec that posts its
    /// events to `sink`.
    fn create(&mut self, spec: &CanvasSpec, sink: EventSink) -> S;
}

impl<S: Surface, F: FnMut(&CanvasSpec, EventSink) -> S> SurfaceFactory<S> for F {
    fn create(&mut self, spec: &CanvasSpec, sink: EventSink) -> S {
        self(spec, sink)
    }
}

/// Where an inserted image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A URL the engine references.
    Url(String),
    /// A `data:` URI.
    DataUri(String),
    /// Raw file bytes, format sniffed by the engine.
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Classify a string as a data URI or a plain URL.
    #[must_use]
    pub fn from_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        if uri.starts_with("data:") {
            Self::DataUri(uri)
        } else {
            Self::Url(uri)
        }
    }
}

/// Encode PNG bytes as a `data:image/png;base64,...` URI.
#[must_use]
pub fn png_data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_data_uri_prefix() {
        let uri = png_data_uri(&[1, 2, 3]);
        assert_eq!(uri, "data:image/png;base64,AQID");
    }

    #[test]
    fn test_image_source_classification() {
        assert_eq!(
            ImageSource::from_uri("data:image/png;base64,AQID"),
            ImageSource::DataUri("data:image/png;base64,AQID".to_string())
        );
        assert_eq!(
            ImageSource::from_uri("https://example.com/a.png"),
            ImageSource::Url("https://example.com/a.png".to_string())
        );
    }
}
