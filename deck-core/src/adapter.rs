//! The scene adapter: keeps the one live drawing surface consistent with the
//! document store.
//!
//! ## Binding
//!
//! The adapter is `Idle` until a surface is attached, then `Bound` to at most
//! one slide. When the store's active slide differs from the bound one, the
//! adapter moves through `Transitioning`:
//!
//! ```text
//! Bound(from) ──> flush `from` (scene, thumbnail)
//!             ──> clear surface, clear selection
//!             ──> load `to` (if it has content), bounded by a timeout
//!             ──> render ──> Bound(to)
//! ```
//!
//! Every load carries a [`LoadTicket`]. A completion that arrives after its
//! bind timed out carries an old ticket and is dropped.
//!
//! ## Persistence
//!
//! While bound to the active slide, every object added, removed or modified
//! on the surface re-serializes the whole surface into the store. Mutation
//! events seen while transitioning (including the ones a load produces) are
//! discarded.

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::surface::png_data_uri;
use crate::{
    Action, DeckError, DeckResult, DocumentStore, EditorConfig, EventSink, Gateway, History,
    ImageSource, LoadTicket, ObjectId, PropertyBridge, PropertyEdit, SceneData, SceneObject,
    SceneTree, SlideId, Surface, SurfaceError, SurfaceEvent, SurfaceFactory,
};

/// Where the adapter is in its binding lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindState {
    /// No surface attached.
    Idle,
    /// Surface attached and showing this slide (`None` right after attach or
    /// after an import).
    Bound(Option<SlideId>),
    /// Switching the surface from one slide to another.
    Transitioning {
        /// Slide being left.
        from: Option<SlideId>,
        /// Slide being loaded.
        to: SlideId,
    },
}

/// Why a load did not produce a scene.
#[derive(Debug)]
enum LoadOutcome {
    Loaded(SceneTree),
    Failed(SurfaceError),
    TimedOut,
    Disconnected,
}

/// Owns the drawing surface and mediates between it and the store.
pub struct SceneAdapter<S: Surface> {
    store: DocumentStore,
    config: EditorConfig,
    gateway: Gateway,
    surface: Option<S>,
    sink: EventSink,
    events: mpsc::UnboundedReceiver<SurfaceEvent>,
    state: BindState,
    generation: u64,
    follow_up_render: Option<Instant>,
    history: History<Vec<u8>>,
}

impl<S: Surface> std::fmt::Debug for SceneAdapter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneAdapter")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("attached", &self.surface.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: Surface> SceneAdapter<S> {
    /// Create an idle adapter over a store.
    #[must_use]
    pub fn new(store: DocumentStore, config: EditorConfig) -> Self {
        let (sink, events) = EventSink::channel();
        let gateway = Gateway::from_config(&config);
        let mut history = History::new(config.history_limit);
        match gateway.snapshot(&store.document()) {
            Ok(snapshot) => history.initialize(snapshot),
            Err(e) => tracing::warn!("Failed to snapshot initial document: {e}"),
        }
        Self {
            store,
            config,
            gateway,
            surface: None,
            sink,
            events,
            state: BindState::Idle,
            generation: 0,
            follow_up_render: None,
            history,
        }
    }

    /// The store this adapter writes to.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The editor config.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current binding state.
    #[must_use]
    pub fn state(&self) -> &BindState {
        &self.state
    }

    /// The slide the surface currently shows.
    #[must_use]
    pub fn bound_slide(&self) -> Option<&SlideId> {
        match &self.state {
            BindState::Bound(slide) => slide.as_ref(),
            _ => None,
        }
    }

    /// Bind/unbind counter; also the ticket of the latest load.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The attached surface.
    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// The attached surface, mutably. Changes made through it reach the
    /// store only through the events the surface emits.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Undo/redo snapshots.
    #[must_use]
    pub fn history(&self) -> &History<Vec<u8>> {
        &self.history
    }

    /// When the pending follow-up render is due.
    #[must_use]
    pub fn follow_up_render_at(&self) -> Option<Instant> {
        self.follow_up_render
    }

    /// Selection editing bound to this adapter.
    pub fn bridge(&mut self) -> PropertyBridge<'_, S> {
        PropertyBridge::new(self)
    }

    /// Create the surface and bind it to the active slide.
    ///
    /// An already attached surface is detached (and flushed) first.
    pub async fn attach(&mut self, mut factory: impl SurfaceFactory<S>) {
        if self.surface.is_some() {
            self.detach();
        }
        let mut surface = factory.create(&self.config.canvas, self.sink.clone());
        surface.set_background(&self.config.canvas.background);
        self.surface = Some(surface);
        self.state = BindState::Bound(None);
        tracing::info!(
            width = self.config.canvas.width,
            height = self.config.canvas.height,
            "Surface attached"
        );
        self.sync_active_slide().await;
    }

    /// Flush the bound slide and hand the surface back.
    pub fn detach(&mut self) -> Option<S> {
        if let BindState::Bound(Some(slide)) = self.state.clone() {
            if let Err(e) = self.persist(&slide) {
                tracing::warn!(slide = %slide, "Failed to flush slide on detach: {e}");
            }
        }
        let surface = self.surface.take();
        self.state = BindState::Idle;
        self.generation += 1;
        self.follow_up_render = None;
        self.discard_queued_events();
        if surface.is_some() {
            tracing::info!("Surface detached");
        }
        surface
    }

    /// Bring the surface in line with the store's active slide.
    ///
    /// Does nothing while idle, while already transitioning, or when the
    /// active slide is already bound. An active id that names no slide is
    /// rejected: the store's pointer goes back to the bound slide, or to the
    /// first slide if nothing is bound yet.
    pub async fn sync_active_slide(&mut self) {
        loop {
            let from = match &self.state {
                BindState::Bound(from) => from.clone(),
                BindState::Idle | BindState::Transitioning { .. } => return,
            };
            let Some(target) = self.store.active_slide_id() else {
                return;
            };
            if from.as_ref() == Some(&target) {
                return;
            }
            let Some(slide) = self.store.slide(&target) else {
                let fallback = from
                    .filter(|id| self.store.slide(id).is_some())
                    .or_else(|| self.store.read(|s| s.document.slides.first().map(|s| s.id.clone())));
                let Some(fallback) = fallback else {
                    return;
                };
                tracing::debug!(slide = %target, restored = %fallback, "Active slide does not exist, rejecting");
                self.store.dispatch(Action::SetActiveSlide(fallback));
                continue;
            };
            self.transition(from, target, slide.scene).await;
        }
    }

    async fn transition(&mut self, from: Option<SlideId>, to: SlideId, scene: Option<SceneData>) {
        self.generation += 1;
        let ticket = LoadTicket(self.generation);
        tracing::debug!(from = ?from, to = %to, %ticket, "Switching slide");
        self.state = BindState::Transitioning {
            from: from.clone(),
            to: to.clone(),
        };

        // Whatever is on the surface belongs to `from` and must be stored
        // before the clear below wipes it.
        if let Some(outgoing) = &from {
            if let Err(e) = self.persist(outgoing) {
                tracing::warn!(slide = %outgoing, "Failed to flush outgoing slide: {e}");
            }
        }

        let background = self.config.canvas.background.clone();
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
            surface.set_background(&background);
            surface.discard_active_object();
        }
        self.store.dispatch(Action::SetSelection {
            id: None,
            properties: None,
        });

        let mut loaded = false;
        if let Some(scene) = scene.filter(SceneData::is_loadable) {
            if let Some(surface) = self.surface.as_mut() {
                surface.begin_load(scene, ticket);
                let deadline = Instant::now() + self.config.load_timeout();
                match wait_for_load(&mut self.events, ticket, deadline).await {
                    LoadOutcome::Loaded(tree) => {
                        tracing::debug!(slide = %to, objects = tree.objects.len(), "Scene loaded");
                        surface.finish_load(tree);
                    }
                    LoadOutcome::Failed(e) => {
                        tracing::warn!(slide = %to, "Failed to load slide: {e}");
                    }
                    LoadOutcome::TimedOut => {
                        tracing::warn!(
                            slide = %to,
                            timeout_ms = self.config.load_timeout_ms,
                            "Slide load timed out, binding anyway"
                        );
                    }
                    LoadOutcome::Disconnected => {
                        tracing::warn!(slide = %to, "Surface event queue closed during load");
                    }
                }
                loaded = true;
            }
        }

        // Events produced by the clear and the load describe the switch
        // itself, not user edits.
        self.discard_queued_events();

        if let Some(surface) = self.surface.as_mut() {
            surface.render();
            if loaded {
                self.follow_up_render = Some(Instant::now() + self.config.follow_up_render_delay());
            }
        }

        tracing::info!(slide = %to, "Bound slide");
        self.state = BindState::Bound(Some(to));
        // Slide list and active pointer changes become undo steps here.
        self.record_history();
    }

    fn discard_queued_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            tracing::trace!(event = event.name(), "Discarding event queued during transition");
        }
    }

    /// Handle every event currently queued.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    /// Handle one surface event.
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        let name = event.name();
        if self.surface.is_none() {
            tracing::debug!(event = name, "Ignoring event without a surface");
            return;
        }
        match event {
            SurfaceEvent::Loaded { ticket, .. } => {
                tracing::debug!(%ticket, "Ignoring stale load completion");
            }
            SurfaceEvent::SelectionCreated(objects) | SurfaceEvent::SelectionUpdated(objects) => {
                let Some(first) = objects.into_iter().next() else {
                    return;
                };
                self.store.dispatch(Action::SetSelection {
                    id: first.id.clone(),
                    properties: Some(first),
                });
            }
            SurfaceEvent::SelectionCleared => {
                self.store.dispatch(Action::SetSelection {
                    id: None,
                    properties: None,
                });
            }
            SurfaceEvent::ObjectAdded(_)
            | SurfaceEvent::ObjectRemoved(_)
            | SurfaceEvent::ObjectModified(_) => self.auto_save(name),
        }
    }

    fn auto_save(&mut self, cause: &str) {
        let BindState::Bound(Some(slide)) = &self.state else {
            tracing::debug!(cause, state = ?self.state, "Not bound, skipping auto-save");
            return;
        };
        let slide = slide.clone();
        if self.store.active_slide_id().as_ref() != Some(&slide) {
            tracing::debug!(cause, slide = %slide, "Bound slide is not active, skipping auto-save");
            return;
        }
        match self.persist(&slide) {
            Ok(()) => {
                tracing::debug!(cause, slide = %slide, "Auto-saved slide");
                self.record_history();
            }
            Err(e) => tracing::warn!(slide = %slide, "Auto-save failed: {e}"),
        }
    }

    /// Serialize the surface into `slide`'s scene and thumbnail.
    ///
    /// A thumbnail failure is logged; the scene is still stored.
    fn persist(&self, slide: &SlideId) -> DeckResult<()> {
        let surface = self.surface.as_ref().ok_or(DeckError::NoSurface)?;
        let tree = surface.serialize()?;
        let scene = SceneData::from_tree(&tree)?;
        self.store.dispatch(Action::UpdateSlideScene {
            id: slide.clone(),
            scene,
        });

        match surface.rasterize(self.config.thumbnail_scale) {
            Ok(png) => self.store.dispatch(Action::UpdateSlideThumbnail {
                id: slide.clone(),
                thumbnail: png_data_uri(&png),
            }),
            Err(e) => tracing::warn!(slide = %slide, "Thumbnail generation failed: {e}"),
        }
        Ok(())
    }

    fn record_history(&mut self) {
        match self.gateway.snapshot(&self.store.document()) {
            Ok(snapshot) => {
                self.history.record(snapshot);
            }
            Err(e) => tracing::warn!("Failed to snapshot document: {e}"),
        }
    }

    /// The slide insertions go to, if the surface shows the active slide.
    fn ensure_correct_slide(&self) -> Option<SlideId> {
        let BindState::Bound(Some(bound)) = &self.state else {
            tracing::debug!(state = ?self.state, "Surface not bound, ignoring insertion");
            return None;
        };
        if self.surface.is_none() || self.store.active_slide_id().as_ref() != Some(bound) {
            tracing::debug!(bound = %bound, "Bound slide is not active, ignoring insertion");
            return None;
        }
        Some(bound.clone())
    }

    /// Insert an object on the active slide and select it.
    ///
    /// Returns the new object's id, or `None` when the surface is not bound
    /// to the active slide.
    pub fn insert(&mut self, object: SceneObject) -> Option<ObjectId> {
        let slide = self.ensure_correct_slide()?;
        let surface = self.surface.as_mut()?;
        let id = ObjectId::generate(slide.as_str());
        surface.add(object.with_id(id.clone()));
        surface.set_active_object(&id);
        surface.render();
        tracing::debug!(slide = %slide, object = %id, "Inserted object");
        Some(id)
    }

    /// Insert the default text box.
    pub fn add_text(&mut self) -> Option<ObjectId> {
        self.insert(SceneObject::default_text())
    }

    /// Insert the default rectangle.
    pub fn add_rectangle(&mut self) -> Option<ObjectId> {
        self.insert(SceneObject::default_rectangle())
    }

    /// Insert the default circle.
    pub fn add_circle(&mut self) -> Option<ObjectId> {
        self.insert(SceneObject::default_circle())
    }

    /// Insert the default line.
    pub fn add_line(&mut self) -> Option<ObjectId> {
        self.insert(SceneObject::default_line())
    }

    /// Insert an image. Undecodable images are logged and dropped.
    pub fn add_image(&mut self, source: &ImageSource) -> Option<ObjectId> {
        self.ensure_correct_slide()?;
        let object = match self.surface.as_ref()?.create_image(source) {
            Ok(object) => object,
            Err(e) => {
                tracing::warn!("Dropping image: {e}");
                return None;
            }
        };
        self.insert(object)
    }

    /// Store the bound slide's scene and thumbnail now.
    ///
    /// # Errors
    ///
    /// Returns an error if no slide is bound or serialization fails.
    pub fn manual_save(&mut self) -> DeckResult<()> {
        let slide = self.bound_slide().cloned().ok_or(DeckError::NoSurface)?;
        self.persist(&slide)?;
        self.record_history();
        tracing::info!(slide = %slide, "Saved slide");
        Ok(())
    }

    /// Export the document, including edits not yet persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export(&mut self) -> DeckResult<Vec<u8>> {
        if let BindState::Bound(Some(slide)) = &self.state {
            if self.store.active_slide_id().as_ref() == Some(slide) {
                if let Err(e) = self.persist(slide) {
                    tracing::warn!(slide = %slide, "Failed to flush live surface before export: {e}");
                }
            }
        }
        self.gateway.export_document(&self.store.document())
    }

    /// Replace the document with an imported presentation and rebind.
    ///
    /// The surface content is not flushed into the replaced document.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving everything untouched, if the file is
    /// rejected.
    pub async fn import(&mut self, bytes: &[u8]) -> DeckResult<()> {
        let document = self.gateway.import_document(bytes)?;
        self.replace_document(document).await;
        match self.gateway.snapshot(&self.store.document()) {
            Ok(snapshot) => self.history.initialize(snapshot),
            Err(e) => tracing::warn!("Failed to snapshot imported document: {e}"),
        }
        Ok(())
    }

    async fn replace_document(&mut self, document: crate::Document) {
        self.store.dispatch(Action::LoadDocument {
            slides: document.slides,
            active_slide_id: document.active_slide_id,
        });
        if self.surface.is_some() {
            self.state = BindState::Bound(None);
        }
        self.sync_active_slide().await;
    }

    /// Step back to the previous recorded document.
    ///
    /// Returns `false` if there was nothing to undo.
    pub async fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(&snapshot).await
    }

    /// Step forward to the next recorded document.
    ///
    /// Returns `false` if there was nothing to redo.
    pub async fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(&snapshot).await
    }

    async fn restore(&mut self, snapshot: &[u8]) -> bool {
        match self.gateway.restore(snapshot) {
            Ok(document) => {
                self.replace_document(document).await;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to restore history snapshot: {e}");
                false
            }
        }
    }

    /// Perform the follow-up render if it is due.
    pub fn render_follow_up(&mut self) {
        let Some(due) = self.follow_up_render else {
            return;
        };
        if Instant::now() < due {
            return;
        }
        self.follow_up_render = None;
        if let Some(surface) = self.surface.as_mut() {
            surface.render();
        }
    }

    /// Execute a command sent through an [`AdapterHandle`].
    pub async fn execute(&mut self, command: Command) {
        match command {
            Command::AddText => {
                self.add_text();
            }
            Command::AddRectangle => {
                self.add_rectangle();
            }
            Command::AddCircle => {
                self.add_circle();
            }
            Command::AddLine => {
                self.add_line();
            }
            Command::AddImage(source) => {
                self.add_image(&source);
            }
            Command::ManualSave { reply } => {
                let _ = reply.send(self.manual_save());
            }
            Command::SetProperty(edit) => self.bridge().set_property(edit),
            Command::SetPropertyValue { key, value } => {
                self.bridge().set_property_value(&key, &value);
            }
            Command::DeleteSelected => self.bridge().delete_selected(),
            Command::Import { bytes, reply } => {
                let _ = reply.send(self.import(&bytes).await);
            }
            Command::Export { reply } => {
                let _ = reply.send(self.export());
            }
            Command::Undo => {
                self.undo().await;
            }
            Command::Redo => {
                self.redo().await;
            }
        }
    }

    /// Drive the adapter until every [`AdapterHandle`] is dropped.
    ///
    /// Commands, surface events, store changes and the follow-up render
    /// timer are all handled on this one task, in arrival order. The surface
    /// is detached (and flushed) on exit.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Option<S> {
        let mut revisions = self.store.subscribe();
        self.sync_active_slide().await;

        loop {
            let follow_up = self.follow_up_render;
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("All adapter handles dropped");
                        break;
                    };
                    // Commands act on the slide that is active now.
                    self.sync_active_slide().await;
                    self.execute(command).await;
                }

                Some(event) = self.events.recv() => {
                    self.handle_event(event);
                }

                changed = revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    revisions.borrow_and_update();
                    self.sync_active_slide().await;
                }

                () = tokio::time::sleep_until(follow_up.unwrap_or_else(Instant::now)), if follow_up.is_some() => {
                    self.render_follow_up();
                }
            }
        }

        self.detach()
    }
}

/// A request for the adapter task.
#[derive(Debug)]
pub enum Command {
    /// Insert the default text box.
    AddText,
    /// Insert the default rectangle.
    AddRectangle,
    /// Insert the default circle.
    AddCircle,
    /// Insert the default line.
    AddLine,
    /// Insert an image.
    AddImage(ImageSource),
    /// Persist the bound slide now.
    ManualSave {
        /// Outcome.
        reply: oneshot::Sender<DeckResult<()>>,
    },
    /// Edit the selected object.
    SetProperty(PropertyEdit),
    /// Edit the selected object from a panel key/value pair.
    SetPropertyValue {
        /// Panel key.
        key: String,
        /// New value.
        value: serde_json::Value,
    },
    /// Delete the selected object.
    DeleteSelected,
    /// Import a presentation file.
    Import {
        /// File contents.
        bytes: Vec<u8>,
        /// Outcome.
        reply: oneshot::Sender<DeckResult<()>>,
    },
    /// Export the document.
    Export {
        /// File contents.
        reply: oneshot::Sender<DeckResult<Vec<u8>>>,
    },
    /// Undo the last recorded change.
    Undo,
    /// Redo the last undone change.
    Redo,
}

/// Cloneable sender for commands to a running [`SceneAdapter`].
#[derive(Debug, Clone)]
pub struct AdapterHandle {
    tx: mpsc::Sender<Command>,
}

impl AdapterHandle {
    /// Create a handle and the receiver to pass to [`SceneAdapter::run`].
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Send a command.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::AdapterClosed`] if the adapter has stopped.
    pub async fn send(&self, command: Command) -> DeckResult<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| DeckError::AdapterClosed)
    }

    /// Insert the default text box.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::AdapterClosed`] if the adapter has stopped.
    pub async fn add_text(&self) -> DeckResult<()> {
        self.send(Command::AddText).await
    }

    /// Insert the default rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::AdapterClosed`] if the adapter has stopped.
    pub async fn add_rectangle(&self) -> DeckResult<()> {
        self.send(Command::AddRectangle).await
    }

    /// Insert the default circle.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::AdapterClosed`] if the adapter has stopped.
    pub async fn add_circle(&self) -> DeckResult<()> {
        self.send(Command::AddCircle).await
    }

    /// Insert the default line.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::AdapterClosed`] if the adapter has stopped.
    pub async fn add_line(&self) -> DeckResult<()> {
        self.send(Command::AddLine).await
    }

    /// Insert an image.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::AdapterClosed`] if the adapter has stopped.
    pub async fn add_image(&self, source: ImageSource) -> DeckResult<()> {
        self.send(Command::AddImage(source)).await
    }

    /// Edit the selected object.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::AdapterClosed`] if the adapter has stopped.
    pub async fn set_property(&self, edit: PropertyEdit) -> DeckResult<()> {
        self.send(Command::SetProperty(edit)).await
    }

    /// Delete the selected object.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::AdapterClosed`] if the adapter has stopped.
    pub async fn delete_selected(&self) -> DeckResult<()> {
        self.send(Command::DeleteSelected).await
    }

    /// Undo the last recorded change.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::AdapterClosed`] if the adapter has stopped.
    pub async fn undo(&self) -> DeckResult<()> {
        self.send(Command::Undo).await
    }

    /// Redo the last undone change.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::AdapterClosed`] if the adapter has stopped.
    pub async fn redo(&self) -> DeckResult<()> {
        self.send(Command::Redo).await
    }

    /// Persist the bound slide now.
    ///
    /// # Errors
    ///
    /// Returns an error if the adapter has stopped or the save failed.
    pub async fn manual_save(&self) -> DeckResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ManualSave { reply }).await?;
        rx.await.map_err(|_| DeckError::AdapterClosed)?
    }

    /// Import a presentation file.
    ///
    /// # Errors
    ///
    /// Returns an error if the adapter has stopped or the file is rejected.
    pub async fn import(&self, bytes: Vec<u8>) -> DeckResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Import { bytes, reply }).await?;
        rx.await.map_err(|_| DeckError::AdapterClosed)?
    }

    /// Export the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the adapter has stopped or serialization failed.
    pub async fn export(&self) -> DeckResult<Vec<u8>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Export { reply }).await?;
        rx.await.map_err(|_| DeckError::AdapterClosed)?
    }
}

/// Wait for the completion of `ticket`, dropping everything else queued.
async fn wait_for_load(
    events: &mut mpsc::UnboundedReceiver<SurfaceEvent>,
    ticket: LoadTicket,
    deadline: Instant,
) -> LoadOutcome {
    loop {
        match tokio::time::timeout_at(deadline, events.recv()).await {
            Err(_) => return LoadOutcome::TimedOut,
            Ok(None) => return LoadOutcome::Disconnected,
            Ok(Some(SurfaceEvent::Loaded { ticket: t, result })) if t == ticket => {
                return match result {
                    Ok(tree) => LoadOutcome::Loaded(tree),
                    Err(e) => LoadOutcome::Failed(e),
                };
            }
            Ok(Some(SurfaceEvent::Loaded { ticket: stale, .. })) => {
                tracing::debug!(%stale, expected = %ticket, "Dropping stale load completion");
            }
            Ok(Some(event)) => {
                tracing::trace!(event = event.name(), "Discarding event while loading");
            }
        }
    }
}
