//! Events emitted by the drawing surface.
//!
//! A surface never calls back into the adapter. It posts [`SurfaceEvent`]s
//! onto a single ordered queue through its [`EventSink`], and the adapter
//! drains that queue in order.

use tokio::sync::mpsc;

use crate::{ObjectId, SceneObject, SceneTree, SurfaceError};

/// Tag identifying one scene load request.
///
/// The adapter hands out a new ticket for every bind; a completion carrying
/// any other ticket is stale and gets dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub u64);

impl std::fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that happened on the drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Objects became selected where nothing was selected before.
    SelectionCreated(Vec<SceneObject>),
    /// The selection moved to other objects.
    SelectionUpdated(Vec<SceneObject>),
    /// Nothing is selected any more.
    SelectionCleared,
    /// An object was added.
    ObjectAdded(Option<ObjectId>),
    /// An object was removed.
    ObjectRemoved(Option<ObjectId>),
    /// An object's attributes changed.
    ObjectModified(Option<ObjectId>),
    /// A scene load finished decoding.
    Loaded {
        /// Ticket passed to `begin_load`.
        ticket: LoadTicket,
        /// Decoded scene, ready for `finish_load`.
        result: Result<SceneTree, SurfaceError>,
    },
}

impl SurfaceEvent {
    /// Whether this event reports a change to the object graph.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::ObjectAdded(_) | Self::ObjectRemoved(_) | Self::ObjectModified(_)
        )
    }

    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectionCreated(_) => "selection:created",
            Self::SelectionUpdated(_) => "selection:updated",
            Self::SelectionCleared => "selection:cleared",
            Self::ObjectAdded(_) => "object:added",
            Self::ObjectRemoved(_) => "object:removed",
            Self::ObjectModified(_) => "object:modified",
            Self::Loaded { .. } => "loaded",
        }
    }
}

/// Sending half of the surface event queue.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<SurfaceEvent>,
}

impl EventSink {
    /// Create a sink and the matching receiver.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SurfaceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Post an event. Events sent after the adapter is gone are dropped.
    pub fn emit(&self, event: SurfaceEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("surface event dropped, queue closed");
        }
    }

    /// Check if the receiving side has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
