//! Renderer error types.

use deck_core::SurfaceError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The generated SVG could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// Rasterizing or encoding a frame failed.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// Image loading failed.
    #[error("Failed to load image: {0}")]
    Image(String),

    /// A stored scene could not be decoded.
    #[error("Invalid scene: {0}")]
    Scene(#[from] deck_core::DeckError),
}

impl From<RenderError> for SurfaceError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Svg(msg) | RenderError::Rasterize(msg) => Self::Rasterize(msg),
            RenderError::Image(msg) => Self::Image(msg),
            RenderError::Scene(e) => Self::Load(e.to_string()),
        }
    }
}
