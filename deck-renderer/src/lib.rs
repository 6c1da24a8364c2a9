//! # Saorsa Deck Renderer
//!
//! A vector drawing surface for the deck core, plus the SVG/PNG rendering it
//! paints and previews with.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │   VectorSurface (deck_core::Surface)        │
//! ├─────────────────────────────────────────────┤
//! │   SceneTree ──> SVG ──> usvg ──> resvg      │
//! │                             └──> PNG        │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;
pub mod surface;

pub use error::{RenderError, RenderResult};
pub use export::{RenderConfig, SceneRenderer};
pub use surface::{LoadBehavior, VectorSurface};

/// Render a slide's stored scene as a PNG thumbnail data URI.
///
/// # Errors
///
/// Returns an error if the scene cannot be decoded or rendered.
pub fn thumbnail_data_uri(
    scene: &deck_core::SceneData,
    spec: &deck_core::CanvasSpec,
    scale: f32,
) -> RenderResult<String> {
    let tree = scene.to_tree()?;
    let png = SceneRenderer::new(RenderConfig::from_spec(spec)).render_to_png_scaled(&tree, scale)?;
    Ok(deck_core::png_data_uri(&png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{CanvasSpec, SceneData};

    #[test]
    fn test_thumbnail_of_placeholder_scene() {
        let uri = thumbnail_data_uri(&SceneData::placeholder("6.7.1"), &CanvasSpec::default(), 0.1)
            .expect("thumbnail");
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_thumbnail_of_invalid_scene_fails() {
        let scene = SceneData::from_value(serde_json::json!({"objects": 5}));
        assert!(matches!(
            thumbnail_data_uri(&scene, &CanvasSpec::default(), 0.1),
            Err(RenderError::Scene(_))
        ));
    }
}
