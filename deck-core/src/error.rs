//! Error types for deck operations.

use thiserror::Error;

/// Result type for deck operations.
pub type DeckResult<T> = Result<T, DeckError>;

/// Errors that can occur in deck operations.
#[derive(Debug, Error)]
pub enum DeckError {
    /// Importing a presentation file failed validation.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// The drawing surface reported a failure.
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Scene or document serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation needs a drawing surface but none is attached.
    #[error("No drawing surface attached")]
    NoSurface,

    /// The adapter task is no longer running.
    #[error("Scene adapter has shut down")]
    AdapterClosed,
}

/// Reasons a presentation file is rejected on import.
///
/// Any of these leaves the current document untouched.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The bytes are not valid JSON.
    #[error("Error loading presentation file: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The top-level value is not a JSON object.
    #[error("Invalid presentation file: expected a JSON object")]
    NotAnObject,

    /// The `slides` field is absent.
    #[error("Invalid presentation file: missing slides data")]
    MissingSlides,

    /// The `slides` field is present but is not an array.
    #[error("Invalid presentation file: slides data is not a list")]
    SlidesNotAList,

    /// The `slides` array is empty.
    #[error("Invalid presentation file: presentation has no slides")]
    NoSlides,
}

/// Failures reported by the drawing surface.
///
/// These are transient: the adapter logs them and carries on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// The stored scene could not be decoded.
    #[error("Failed to load scene: {0}")]
    Load(String),

    /// The surface could not be serialized.
    #[error("Failed to serialize surface: {0}")]
    Serialize(String),

    /// Rasterizing a preview failed.
    #[error("Failed to rasterize surface: {0}")]
    Rasterize(String),

    /// An image could not be fetched or decoded.
    #[error("Failed to load image: {0}")]
    Image(String),
}
