//! # Saorsa Deck Core
//!
//! Slide deck synchronization core: keeps one live, event-driven drawing
//! surface consistent with a single source-of-truth document store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   deck-core                      │
//! ├──────────────────────────────────────────────────┤
//! │  DocumentStore       │  SceneAdapter             │
//! │  - Slides, active id │  - Idle/Bound/Transition  │
//! │  - Tool, selection   │  - Flush, clear, load     │
//! │  - Revision watch    │  - Auto-save on mutation  │
//! ├──────────────────────────────────────────────────┤
//! │  PropertyBridge      │  Gateway      │ History   │
//! │  - Panel edits       │  - Export     │ - Undo    │
//! │  - Delete selected   │  - Import     │ - Redo    │
//! ├──────────────────────────────────────────────────┤
//! │  Surface trait  <──  SurfaceEvent queue (mpsc)   │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! The drawing engine sits behind the [`Surface`] trait; `deck-renderer`
//! provides one.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod bridge;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod gateway;
pub mod history;
pub mod object;
pub mod scene;
pub mod store;
pub mod surface;

pub use adapter::{AdapterHandle, BindState, Command, SceneAdapter};
pub use bridge::PropertyBridge;
pub use config::{CanvasSpec, ConfigError, EditorConfig};
pub use document::{Document, Selection, Slide, SlideId, Tool};
pub use error::{DeckError, DeckResult, ImportError, SurfaceError};
pub use event::{EventSink, LoadTicket, SurfaceEvent};
pub use gateway::{suggested_file_name, Gateway, PresentationFile};
pub use history::History;
pub use object::{Geometry, ObjectId, ObjectKind, ObjectType, PropertyEdit, SceneObject};
pub use scene::{SceneData, SceneTree};
pub use store::{Action, DocumentStore, EditorState};
pub use surface::{png_data_uri, ImageSource, Surface, SurfaceFactory};

/// Deck core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
