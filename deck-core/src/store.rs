//! The document store: single source of truth for slide content.
//!
//! [`EditorState`] holds the document plus the transient tool and selection
//! records; every change goes through one of its reducers, which are pure and
//! synchronous. [`DocumentStore`] is the shared handle the scene adapter and
//! panels hold. It applies [`Action`]s and publishes a revision counter so
//! subscribers know when to re-read.
//!
//! The store does not validate `SetActiveSlide`; guarding against ids that do
//! not exist is the scene adapter's job.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;

use crate::{Document, ObjectId, PropertyEdit, SceneData, SceneObject, Selection, Slide, SlideId, Tool};

/// A state transition on the editor state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Append an empty slide and make it active.
    AddSlide,
    /// Delete a slide, unless it is the last one.
    DeleteSlide(SlideId),
    /// Point the active slide at an id.
    SetActiveSlide(SlideId),
    /// Replace a slide's stored scene.
    UpdateSlideScene {
        /// Target slide.
        id: SlideId,
        /// New scene.
        scene: SceneData,
    },
    /// Replace a slide's thumbnail.
    UpdateSlideThumbnail {
        /// Target slide.
        id: SlideId,
        /// Thumbnail data URI.
        thumbnail: String,
    },
    /// Pick a toolbar tool.
    SetTool(Tool),
    /// Replace the selection descriptor.
    SetSelection {
        /// Selected object id.
        id: Option<ObjectId>,
        /// Snapshot of the selected object.
        properties: Option<SceneObject>,
    },
    /// Edit one field of the selection snapshot.
    UpdateSelectedProperty(PropertyEdit),
    /// Clear the selection if it refers to this object.
    ClearSelectionIfMatches(Option<ObjectId>),
    /// Replace the whole document.
    LoadDocument {
        /// New slides.
        slides: Vec<Slide>,
        /// New active slide.
        active_slide_id: Option<SlideId>,
    },
}

/// Everything the store holds.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    /// Slides and the active pointer.
    pub document: Document,
    /// Current toolbar tool.
    pub tool: Tool,
    /// Current selection descriptor.
    pub selection: Selection,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl EditorState {
    /// Wrap a document with the select tool and no selection.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            tool: Tool::Select,
            selection: Selection::default(),
        }
    }

    /// Apply an action.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::AddSlide => {
                self.add_slide();
            }
            Action::DeleteSlide(id) => {
                self.delete_slide(&id);
            }
            Action::SetActiveSlide(id) => self.set_active_slide(id),
            Action::UpdateSlideScene { id, scene } => self.update_slide_scene(&id, scene),
            Action::UpdateSlideThumbnail { id, thumbnail } => {
                self.update_slide_thumbnail(&id, thumbnail);
            }
            Action::SetTool(tool) => self.tool = tool,
            Action::SetSelection { id, properties } => self.set_selection(id, properties),
            Action::UpdateSelectedProperty(edit) => self.update_selected_property(&edit),
            Action::ClearSelectionIfMatches(id) => self.clear_selection_if_matches(id.as_ref()),
            Action::LoadDocument {
                slides,
                active_slide_id,
            } => self.load_document(slides, active_slide_id),
        }
    }

    /// Append a new empty slide named after the new count and make it active.
    pub fn add_slide(&mut self) -> SlideId {
        let id = SlideId::generate();
        let name = format!("Slide {}", self.document.len() + 1);
        self.document.slides.push(Slide::new(id.clone(), name));
        self.document.active_slide_id = Some(id.clone());
        id
    }

    /// Delete a slide.
    ///
    /// No-op when it is the last slide or the id is unknown. Remaining slides
    /// are renamed `Slide 1..n`; if the deleted slide was active, the slide
    /// that took its position (or the new last slide) becomes active.
    pub fn delete_slide(&mut self, id: &SlideId) -> bool {
        if self.document.len() <= 1 {
            return false;
        }
        let Some(index) = self.document.index_of(id) else {
            return false;
        };
        self.document.slides.remove(index);

        for (i, slide) in self.document.slides.iter_mut().enumerate() {
            slide.name = format!("Slide {}", i + 1);
        }

        if self.document.active_slide_id.as_ref() == Some(id) {
            let promoted = index.min(self.document.len() - 1);
            self.document.active_slide_id = Some(self.document.slides[promoted].id.clone());
        }

        self.selection = Selection::default();
        self.tool = Tool::Select;
        true
    }

    /// Point the active slide at `id` without checking that it exists.
    pub fn set_active_slide(&mut self, id: SlideId) {
        self.document.active_slide_id = Some(id);
    }

    /// Replace a slide's stored scene. No-op for unknown ids.
    pub fn update_slide_scene(&mut self, id: &SlideId, scene: SceneData) {
        if let Some(slide) = self.document.slide_mut(id) {
            slide.scene = Some(scene);
        }
    }

    /// Replace a slide's thumbnail. No-op for unknown ids.
    pub fn update_slide_thumbnail(&mut self, id: &SlideId, thumbnail: String) {
        if let Some(slide) = self.document.slide_mut(id) {
            slide.thumbnail = Some(thumbnail);
        }
    }

    /// Replace the selection descriptor.
    pub fn set_selection(&mut self, id: Option<ObjectId>, properties: Option<SceneObject>) {
        self.selection = Selection { id, properties };
    }

    /// Apply an edit to the selection snapshot, if there is one.
    pub fn update_selected_property(&mut self, edit: &PropertyEdit) {
        if let Some(properties) = self.selection.properties.as_mut() {
            properties.apply(edit);
        }
    }

    /// Clear the selection when it refers to `id`.
    pub fn clear_selection_if_matches(&mut self, id: Option<&ObjectId>) {
        if self.selection.id.as_ref() == id {
            self.selection = Selection::default();
        }
    }

    /// Replace the whole document; the selection is cleared.
    pub fn load_document(&mut self, slides: Vec<Slide>, active_slide_id: Option<SlideId>) {
        self.document = Document {
            slides,
            active_slide_id,
        };
        self.selection = Selection::default();
    }
}

/// Shared handle to the editor state.
///
/// # Example
///
/// ```
/// use deck_core::store::{Action, DocumentStore};
///
/// let store = DocumentStore::new();
/// store.dispatch(Action::AddSlide);
///
/// let doc = store.document();
/// assert_eq!(doc.len(), 2);
/// assert_eq!(doc.active_slide_id, Some(doc.slides[1].id.clone()));
/// ```
#[derive(Debug, Clone)]
pub struct DocumentStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: RwLock<EditorState>,
    revision: watch::Sender<u64>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create a store holding a single empty slide.
    #[must_use]
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Create a store holding `document`.
    #[must_use]
    pub fn with_document(document: Document) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(EditorState::new(document)),
                revision,
            }),
        }
    }

    /// Apply an action and bump the revision.
    pub fn dispatch(&self, action: Action) {
        tracing::trace!(?action, "dispatch");
        {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            state.apply(action);
        }
        self.inner.revision.send_modify(|rev| *rev += 1);
    }

    /// Append a new slide and return its id.
    pub fn add_slide(&self) -> SlideId {
        let id = {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            state.add_slide()
        };
        self.inner.revision.send_modify(|rev| *rev += 1);
        id
    }

    /// Read the state through a closure.
    pub fn read<R>(&self, f: impl FnOnce(&EditorState) -> R) -> R {
        let state = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Clone the whole state.
    #[must_use]
    pub fn state(&self) -> EditorState {
        self.read(Clone::clone)
    }

    /// Clone the document.
    #[must_use]
    pub fn document(&self) -> Document {
        self.read(|s| s.document.clone())
    }

    /// The active slide pointer.
    #[must_use]
    pub fn active_slide_id(&self) -> Option<SlideId> {
        self.read(|s| s.document.active_slide_id.clone())
    }

    /// Clone one slide.
    #[must_use]
    pub fn slide(&self, id: &SlideId) -> Option<Slide> {
        self.read(|s| s.document.slide(id).cloned())
    }

    /// Clone the selection descriptor.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.read(|s| s.selection.clone())
    }

    /// Current toolbar tool.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.read(|s| s.tool)
    }

    /// Number of changes applied so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Subscribe to revision changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(state: &EditorState) -> Vec<String> {
        state.document.slides.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_add_slide_twice() {
        let mut state = EditorState::default();
        state.apply(Action::AddSlide);
        state.apply(Action::AddSlide);

        assert_eq!(names(&state), vec!["Slide 1", "Slide 2", "Slide 3"]);
        assert_eq!(
            state.document.active_slide_id.as_ref(),
            Some(&state.document.slides[2].id)
        );
    }

    #[test]
    fn test_delete_last_remaining_slide_is_noop() {
        let mut state = EditorState::default();
        let before = state.clone();
        assert!(!state.delete_slide(&SlideId::new("slide-1")));
        assert_eq!(state, before);
    }

    #[test]
    fn test_delete_unknown_slide_is_noop() {
        let mut state = EditorState::default();
        state.add_slide();
        let before = state.clone();
        state.apply(Action::DeleteSlide(SlideId::new("nope")));
        assert_eq!(state, before);
    }

    #[test]
    fn test_delete_active_promotes_same_index() {
        let mut state = EditorState::default();
        let second = state.add_slide();
        let third = state.add_slide();
        state.set_active_slide(second.clone());

        assert!(state.delete_slide(&second));
        assert_eq!(state.document.active_slide_id, Some(third));
        assert_eq!(names(&state), vec!["Slide 1", "Slide 2"]);
    }

    #[test]
    fn test_delete_active_last_promotes_previous() {
        let mut state = EditorState::default();
        let second = state.add_slide();
        let third = state.add_slide();

        assert!(state.delete_slide(&third));
        assert_eq!(state.document.active_slide_id, Some(second));
    }

    #[test]
    fn test_delete_inactive_keeps_active_and_clears_selection() {
        let mut state = EditorState::default();
        let second = state.add_slide();
        state.tool = Tool::Circle;
        state.set_selection(
            Some(ObjectId::new("o1")),
            Some(SceneObject::default_circle()),
        );

        assert!(state.delete_slide(&SlideId::new("slide-1")));
        assert_eq!(state.document.active_slide_id, Some(second));
        assert_eq!(names(&state), vec!["Slide 1"]);
        assert!(state.selection.is_empty());
        assert_eq!(state.tool, Tool::Select);
    }

    #[test]
    fn test_set_active_slide_does_not_validate() {
        let mut state = EditorState::default();
        state.apply(Action::SetActiveSlide(SlideId::new("ghost")));
        assert_eq!(state.document.active_slide_id, Some(SlideId::new("ghost")));
    }

    #[test]
    fn test_update_scene_and_thumbnail() {
        let mut state = EditorState::default();
        let id = SlideId::new("slide-1");
        state.apply(Action::UpdateSlideScene {
            id: id.clone(),
            scene: SceneData::placeholder("6.7.1"),
        });
        state.apply(Action::UpdateSlideThumbnail {
            id: id.clone(),
            thumbnail: "data:image/png;base64,AAAA".to_string(),
        });
        state.apply(Action::UpdateSlideThumbnail {
            id: SlideId::new("missing"),
            thumbnail: "x".to_string(),
        });

        let slide = state.document.slide(&id).expect("slide");
        assert_eq!(slide.scene.as_ref().and_then(SceneData::object_count), Some(0));
        assert_eq!(slide.thumbnail.as_deref(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_selection_reducers() {
        let mut state = EditorState::default();
        let object = SceneObject::default_text().with_id(ObjectId::new("t1"));
        state.apply(Action::SetSelection {
            id: object.id.clone(),
            properties: Some(object),
        });

        state.apply(Action::UpdateSelectedProperty(PropertyEdit::FontSize(40.0)));
        let props = state.selection.properties.clone().expect("props");
        assert!(matches!(props.kind, crate::ObjectKind::Text { font_size, .. } if (font_size - 40.0).abs() < f32::EPSILON));

        state.apply(Action::ClearSelectionIfMatches(Some(ObjectId::new("other"))));
        assert!(!state.selection.is_empty());
        state.apply(Action::ClearSelectionIfMatches(Some(ObjectId::new("t1"))));
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_update_selected_property_without_selection_is_noop() {
        let mut state = EditorState::default();
        state.apply(Action::UpdateSelectedProperty(PropertyEdit::Left(3.0)));
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_load_document_replaces_everything() {
        let mut state = EditorState::default();
        state.set_selection(Some(ObjectId::new("o")), None);
        let slides = vec![
            Slide::new(SlideId::new("a"), "A"),
            Slide::new(SlideId::new("b"), "B"),
        ];
        state.apply(Action::LoadDocument {
            slides,
            active_slide_id: Some(SlideId::new("b")),
        });
        assert_eq!(state.document.len(), 2);
        assert_eq!(state.document.active_slide_id, Some(SlideId::new("b")));
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_store_dispatch_bumps_revision() {
        let store = DocumentStore::new();
        let mut rx = store.subscribe();
        assert_eq!(store.revision(), 0);

        let id = store.add_slide();
        store.dispatch(Action::SetTool(Tool::Line));

        assert_eq!(store.revision(), 2);
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(*rx.borrow_and_update(), 2);
        assert_eq!(store.active_slide_id(), Some(id));
        assert_eq!(store.tool(), Tool::Line);
    }

    #[test]
    fn test_store_clones_share_state() {
        let store = DocumentStore::new();
        let other = store.clone();
        other.dispatch(Action::AddSlide);
        assert_eq!(store.document().len(), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Delete(usize),
        Activate(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Add),
            (0usize..8).prop_map(Op::Delete),
            (0usize..8).prop_map(Op::Activate),
        ]
    }

    proptest! {
        #[test]
        fn prop_document_stays_consistent(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let mut state = EditorState::default();
            for op in ops {
                let len = state.document.len();
                match op {
                    Op::Add => { state.apply(Action::AddSlide); }
                    Op::Delete(i) => {
                        let id = state.document.slides[i % len].id.clone();
                        state.apply(Action::DeleteSlide(id));
                    }
                    Op::Activate(i) => {
                        let id = state.document.slides[i % len].id.clone();
                        state.apply(Action::SetActiveSlide(id));
                    }
                }
                prop_assert!(state.document.len() >= 1);
                prop_assert!(state.document.is_consistent());
                for (i, slide) in state.document.slides.iter().enumerate() {
                    prop_assert_eq!(&slide.name, &format!("Slide {}", i + 1));
                }
            }
        }
    }
}
