//! An in-memory vector drawing surface.
//!
//! [`VectorSurface`] keeps the object list, background and active object the
//! way an interactive canvas engine does, reports every change on its event
//! sink, and paints through [`SceneRenderer`].

use std::time::Duration;

use deck_core::{
    CanvasSpec, EventSink, ImageSource, LoadTicket, ObjectId, SceneData, SceneObject, SceneTree,
    Surface, SurfaceError, SurfaceEvent,
};

use crate::export::{RenderConfig, SceneRenderer};
use crate::image;

/// How scene loads complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadBehavior {
    /// Decode on a background task and report as soon as it is done.
    #[default]
    Immediate,
    /// Wait this long before reporting.
    Delayed(Duration),
    /// Never report a completion.
    Never,
}

/// A vector drawing surface with an ordered object list.
#[derive(Debug)]
pub struct VectorSurface {
    spec: CanvasSpec,
    sink: EventSink,
    renderer: SceneRenderer,
    objects: Vec<SceneObject>,
    active: Option<ObjectId>,
    background: String,
    version: String,
    load_behavior: LoadBehavior,
    frames: u64,
}

impl VectorSurface {
    /// Create an empty surface that posts events to `sink`.
    #[must_use]
    pub fn new(spec: &CanvasSpec, sink: EventSink) -> Self {
        Self {
            spec: spec.clone(),
            sink,
            renderer: SceneRenderer::new(RenderConfig::from_spec(spec)),
            objects: Vec::new(),
            active: None,
            background: spec.background.clone(),
            version: deck_core::config::ENGINE_FORMAT_VERSION.to_string(),
            load_behavior: LoadBehavior::Immediate,
            frames: 0,
        }
    }

    /// Set how scene loads complete.
    #[must_use]
    pub fn with_load_behavior(mut self, behavior: LoadBehavior) -> Self {
        self.load_behavior = behavior;
        self
    }

    /// Change how later scene loads complete.
    pub fn set_load_behavior(&mut self, behavior: LoadBehavior) {
        self.load_behavior = behavior;
    }

    /// The canvas this surface was created for.
    #[must_use]
    pub fn spec(&self) -> &CanvasSpec {
        &self.spec
    }

    /// Current background color.
    #[must_use]
    pub fn background(&self) -> &str {
        &self.background
    }

    /// Number of render passes so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Render the current content to SVG.
    #[must_use]
    pub fn to_svg(&self) -> String {
        self.renderer.render_to_svg(&self.snapshot())
    }

    /// Report that an object was changed in place (a drag or resize on the
    /// canvas).
    pub fn modify(&mut self, id: &ObjectId, f: impl FnOnce(&mut SceneObject)) -> bool {
        let Some(object) = self.find_mut(id) else {
            return false;
        };
        f(object);
        self.sink.emit(SurfaceEvent::ObjectModified(Some(id.clone())));
        true
    }

    fn snapshot(&self) -> SceneTree {
        SceneTree {
            version: self.version.clone(),
            objects: self.objects.clone(),
            background: self.background.clone(),
        }
    }

    fn position(&self, id: &ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id.as_ref() == Some(id))
    }

    fn find_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id.as_ref() == Some(id))
    }
}

fn decode(scene: &SceneData) -> Result<SceneTree, SurfaceError> {
    scene
        .to_tree()
        .map_err(|e| SurfaceError::Load(e.to_string()))
}

impl Surface for VectorSurface {
    fn clear(&mut self) {
        for object in std::mem::take(&mut self.objects) {
            self.sink.emit(SurfaceEvent::ObjectRemoved(object.id));
        }
        self.discard_active_object();
        self.background.clone_from(&self.spec.background);
    }

    fn set_background(&mut self, color: &str) {
        self.background = color.to_string();
    }

    fn add(&mut self, object: SceneObject) {
        let id = object.id.clone();
        self.objects.push(object);
        self.sink.emit(SurfaceEvent::ObjectAdded(id));
    }

    fn remove(&mut self, id: &ObjectId) -> Option<SceneObject> {
        let index = self.position(id)?;
        let removed = self.objects.remove(index);
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        self.sink.emit(SurfaceEvent::ObjectRemoved(Some(id.clone())));
        Some(removed)
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn object_mut(&mut self, id: &ObjectId) -> Option<&mut SceneObject> {
        self.find_mut(id)
    }

    fn set_active_object(&mut self, id: &ObjectId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let selected = vec![self.objects[index].clone()];
        let event = if self.active.is_some() {
            SurfaceEvent::SelectionUpdated(selected)
        } else {
            SurfaceEvent::SelectionCreated(selected)
        };
        self.active = Some(id.clone());
        self.sink.emit(event);
        true
    }

    fn active_object(&self) -> Option<&SceneObject> {
        let id = self.active.as_ref()?;
        self.objects.iter().find(|o| o.id.as_ref() == Some(id))
    }

    fn discard_active_object(&mut self) {
        if self.active.take().is_some() {
            self.sink.emit(SurfaceEvent::SelectionCleared);
        }
    }

    fn serialize(&self) -> Result<SceneTree, SurfaceError> {
        Ok(self.snapshot())
    }

    fn begin_load(&mut self, scene: SceneData, ticket: LoadTicket) {
        let delay = match self.load_behavior {
            LoadBehavior::Never => {
                tracing::debug!(%ticket, "Load will never complete");
                return;
            }
            LoadBehavior::Immediate => Duration::ZERO,
            LoadBehavior::Delayed(delay) => delay,
        };

        let sink = self.sink.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                sink.emit(SurfaceEvent::Loaded {
                    ticket,
                    result: decode(&scene),
                });
            });
        } else {
            // No runtime to defer onto; report synchronously.
            sink.emit(SurfaceEvent::Loaded {
                ticket,
                result: decode(&scene),
            });
        }
    }

    fn finish_load(&mut self, tree: SceneTree) {
        self.active = None;
        self.objects.clear();
        self.background = tree.background;
        self.version = tree.version;
        for object in tree.objects {
            self.add(object);
        }
    }

    fn rasterize(&self, scale: f32) -> Result<Vec<u8>, SurfaceError> {
        Ok(self
            .renderer
            .render_to_png_scaled(&self.snapshot(), scale)?)
    }

    fn render(&mut self) {
        self.frames += 1;
        tracing::trace!(frame = self.frames, objects = self.objects.len(), "render");
    }

    fn create_image(&self, source: &ImageSource) -> Result<SceneObject, SurfaceError> {
        let resolved = image::resolve(source)?;
        Ok(SceneObject::image(resolved.src, resolved.width, resolved.height))
    }
}
