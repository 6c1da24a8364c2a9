//! Two-way sync between the store's selection and the surface's active object.
//!
//! Surface to store happens in the adapter's selection event handling. This
//! module is the other direction: panel edits applied to both the selection
//! snapshot and the live object.

use crate::{Action, PropertyEdit, SceneAdapter, Selection, Surface};

/// Selection editing, borrowed from a [`SceneAdapter`].
#[derive(Debug)]
pub struct PropertyBridge<'a, S: Surface> {
    adapter: &'a mut SceneAdapter<S>,
}

impl<'a, S: Surface> PropertyBridge<'a, S> {
    pub(crate) fn new(adapter: &'a mut SceneAdapter<S>) -> Self {
        Self { adapter }
    }

    /// The current selection descriptor.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.adapter.store().selection()
    }

    /// Fields a properties panel should offer for the selection.
    #[must_use]
    pub fn editable_fields(&self) -> &'static [&'static str] {
        self.selection().editable_fields()
    }

    /// Apply an edit to the selection snapshot and to the live object.
    ///
    /// Edits that do not fit the selected object's type change nothing.
    pub fn set_property(&mut self, edit: PropertyEdit) {
        let store = self.adapter.store().clone();
        let Some(id) = store.selection().id else {
            tracing::debug!(key = edit.key(), "No selection, ignoring property edit");
            return;
        };
        store.dispatch(Action::UpdateSelectedProperty(edit.clone()));

        let Some(surface) = self.adapter.surface_mut() else {
            return;
        };
        let Some(object) = surface.object_mut(&id) else {
            tracing::debug!(object = %id, "Selected object not on surface");
            return;
        };
        if object.apply(&edit) {
            surface.render();
        } else {
            tracing::debug!(
                key = edit.key(),
                object_type = object.object_type().tag(),
                "Property does not apply to object type"
            );
        }
    }

    /// Apply a panel key/value edit. Returns `false` for unknown keys or
    /// values of the wrong type.
    pub fn set_property_value(&mut self, key: &str, value: &serde_json::Value) -> bool {
        let Some(edit) = PropertyEdit::from_key_value(key, value) else {
            tracing::debug!(key, %value, "Unrecognized property edit");
            return false;
        };
        self.set_property(edit);
        true
    }

    /// Remove the active object from the surface and clear the selection.
    pub fn delete_selected(&mut self) {
        let selected = self.adapter.store().selection().id;
        if let Some(surface) = self.adapter.surface_mut() {
            let active = surface.active_object().and_then(|o| o.id.clone());
            if let Some(id) = active {
                surface.remove(&id);
                surface.discard_active_object();
                surface.render();
            }
        }
        self.adapter
            .store()
            .dispatch(Action::ClearSelectionIfMatches(selected));
    }
}

#[cfg(test)]
mod tests {
    use crate::surface::testing::FakeSurface;
    use crate::{DocumentStore, EditorConfig, ObjectKind, PropertyEdit, SceneAdapter, SceneData, SlideId};
    use serde_json::json;

    async fn adapter_with_text() -> SceneAdapter<FakeSurface> {
        let mut adapter = SceneAdapter::new(DocumentStore::new(), EditorConfig::default());
        adapter.attach(FakeSurface::new).await;
        adapter.add_text().expect("inserted");
        adapter.process_events();
        adapter
    }

    fn live_font_size(adapter: &SceneAdapter<FakeSurface>) -> f32 {
        match adapter.surface().expect("surface").objects[0].kind {
            ObjectKind::Text { font_size, .. } => font_size,
            ref other => panic!("expected text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_set_property_updates_snapshot_and_live_object() {
        let mut adapter = adapter_with_text().await;
        adapter.bridge().set_property(PropertyEdit::FontSize(40.0));

        assert!((live_font_size(&adapter) - 40.0).abs() < f32::EPSILON);
        let snapshot = adapter.store().selection().properties.expect("snapshot");
        assert!(matches!(snapshot.kind, ObjectKind::Text { font_size, .. } if (font_size - 40.0).abs() < f32::EPSILON));
    }

    #[tokio::test]
    async fn test_mismatched_property_is_ignored() {
        let mut adapter = adapter_with_text().await;
        let before = adapter.surface().expect("surface").objects.clone();
        adapter.bridge().set_property(PropertyEdit::StrokeWidth(9.0));
        assert_eq!(adapter.surface().expect("surface").objects, before);
    }

    #[tokio::test]
    async fn test_set_property_value_parses_panel_input() {
        let mut adapter = adapter_with_text().await;
        let mut bridge = adapter.bridge();
        assert!(bridge.set_property_value("fontSize", &json!(18)));
        assert!(!bridge.set_property_value("fontSize", &json!("big")));
        assert!(!bridge.set_property_value("shadow", &json!(1)));
        assert!(bridge.editable_fields().contains(&"fontFamily"));
        assert!((live_font_size(&adapter) - 18.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_delete_selected_removes_and_persists() {
        let mut adapter = adapter_with_text().await;
        adapter.bridge().delete_selected();
        adapter.process_events();

        assert!(adapter.surface().expect("surface").objects.is_empty());
        assert!(adapter.store().selection().is_empty());
        let slide = adapter.store().slide(&SlideId::new("slide-1")).expect("slide");
        assert_eq!(slide.scene.as_ref().and_then(SceneData::object_count), Some(0));
    }

    #[tokio::test]
    async fn test_edit_without_selection_is_noop() {
        let mut adapter = SceneAdapter::new(DocumentStore::new(), EditorConfig::default());
        adapter.attach(FakeSurface::new).await;
        let revision = adapter.store().revision();
        adapter.bridge().set_property(PropertyEdit::Left(1.0));
        assert_eq!(adapter.store().revision(), revision);
    }
}
