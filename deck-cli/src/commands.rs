//! Subcommand implementations.
//!
//! Every command reads and writes presentation files through the
//! [`Gateway`], so files produced here are exactly what the editor would
//! export.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use deck_core::{
    suggested_file_name, Action, Document, DocumentStore, Gateway, SceneAdapter, SlideId,
};
use deck_renderer::{RenderConfig, SceneRenderer, VectorSurface};
use serde::Serialize;

use crate::CliConfig;

/// One line of `deck inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSummary {
    /// Position in the deck, starting at 1.
    pub index: usize,
    /// Slide id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Objects in the stored scene, if it can be read.
    pub objects: Option<usize>,
    /// Whether a thumbnail is stored.
    pub has_thumbnail: bool,
    /// Whether this is the active slide.
    pub active: bool,
}

fn read_document(config: &CliConfig, input: &Path) -> anyhow::Result<Document> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let document = Gateway::from_config(&config.editor)
        .import_document(&bytes)
        .with_context(|| format!("Failed to import {}", input.display()))?;
    Ok(document)
}

/// Write a new presentation with `slides` empty slides, the first active.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn new_presentation(config: &CliConfig, output: &Path, slides: usize) -> anyhow::Result<()> {
    let store = DocumentStore::new();
    for _ in 1..slides.max(1) {
        store.add_slide();
    }
    let document = store.document();
    if let Some(first) = document.slides.first() {
        store.dispatch(Action::SetActiveSlide(first.id.clone()));
    }

    let bytes = Gateway::from_config(&config.editor).export_document(&store.document())?;
    std::fs::write(output, bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(path = %output.display(), slides = document.len(), "Created presentation");
    Ok(())
}

/// Summarize every slide of a presentation.
#[must_use]
pub fn summarize(document: &Document) -> Vec<SlideSummary> {
    document
        .slides
        .iter()
        .enumerate()
        .map(|(i, slide)| SlideSummary {
            index: i + 1,
            id: slide.id.to_string(),
            name: slide.name.clone(),
            objects: slide.scene.as_ref().and_then(deck_core::SceneData::object_count),
            has_thumbnail: slide.thumbnail.is_some(),
            active: document.active_slide_id.as_ref() == Some(&slide.id),
        })
        .collect()
}

/// Print a summary of a presentation to `out`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or imported, or `out`
/// cannot be written.
pub fn inspect(
    config: &CliConfig,
    input: &Path,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<Vec<SlideSummary>> {
    let summary = summarize(&read_document(config, input)?);

    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
    } else {
        for slide in &summary {
            let objects = slide
                .objects
                .map_or_else(|| "unreadable".to_string(), |n| format!("{n} objects"));
            writeln!(
                out,
                "{} {:>3}  {}  {}  ({objects})",
                if slide.active { "*" } else { " " },
                slide.index,
                slide.id,
                slide.name,
            )?;
        }
    }
    Ok(summary)
}

/// Render every readable slide to `<out_dir>/<index>-<id>.png`, with
/// characters other than ASCII letters, digits, `-` and `_` in the id
/// replaced by `_`.
///
/// Slides whose scene cannot be decoded are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the presentation cannot be imported or a PNG cannot
/// be written.
pub fn thumbnails(
    config: &CliConfig,
    input: &Path,
    out_dir: &Path,
    scale: f32,
) -> anyhow::Result<Vec<PathBuf>> {
    let document = read_document(config, input)?;
    let renderer = SceneRenderer::new(RenderConfig {
        scale,
        ..RenderConfig::from_spec(&config.editor.canvas)
    });
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(document.len());
    for (i, slide) in document.slides.iter().enumerate() {
        let Some(scene) = &slide.scene else {
            continue;
        };
        let tree = match scene.to_tree() {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(slide = %slide.id, "Skipping unreadable slide: {e}");
                continue;
            }
        };
        let png = renderer.render_to_png(&tree)?;
        let path = out_dir.join(format!("{:02}-{}.png", i + 1, file_stem(slide.id.as_str())));
        std::fs::write(&path, png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), objects = tree.objects.len(), "Wrote thumbnail");
        written.push(path);
    }
    Ok(written)
}

/// Slide ids come from the file; keep only characters safe in a file name.
fn file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "slide".to_string()
    } else {
        stem
    }
}

/// Re-import a presentation and export it again.
///
/// Every slide is bound to a [`VectorSurface`] once, so stored scenes are
/// rewritten in the current format and thumbnails regenerated. Objects that
/// cannot be decoded are dropped, and a scene that cannot be decoded at all
/// comes out empty. Returns the path written.
///
/// # Errors
///
/// Returns an error if the file cannot be read, imported or written.
pub async fn normalize(
    config: &CliConfig,
    input: &Path,
    output: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let store = DocumentStore::new();
    let mut adapter = SceneAdapter::new(store.clone(), config.editor.clone());
    adapter.attach(VectorSurface::new).await;
    adapter
        .import(&bytes)
        .await
        .with_context(|| format!("Failed to import {}", input.display()))?;

    let active = store.active_slide_id();
    let ids: Vec<SlideId> = store.read(|s| s.document.slides.iter().map(|s| s.id.clone()).collect());
    for id in ids {
        if store.slide(&id).and_then(|s| s.scene).is_some_and(|scene| scene.to_tree().is_err()) {
            tracing::warn!(slide = %id, "Scene cannot be decoded, it will be emptied");
        }
        store.dispatch(Action::SetActiveSlide(id));
        adapter.sync_active_slide().await;
        adapter.manual_save()?;
    }
    if let Some(active) = active {
        store.dispatch(Action::SetActiveSlide(active));
        adapter.sync_active_slide().await;
    }

    let exported = adapter.export()?;
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(suggested_file_name(chrono::Utc::now())),
    };
    std::fs::write(&path, exported)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), slides = store.document().len(), "Normalized presentation");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn write_file(dir: &Path, name: &str, value: &Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, value.to_string()).expect("write");
        path
    }

    fn sample() -> Value {
        json!({
            "slides": [
                {
                    "id": "intro",
                    "name": "Intro",
                    "canvasData": {
                        "version": "6.7.1",
                        "background": "#ffffff",
                        "objects": [
                            {"type": "rect", "left": 10, "top": 10, "width": 50, "height": 40,
                             "fill": "#3B82F6", "stroke": "#1E40AF", "strokeWidth": 2}
                        ]
                    }
                },
                {"id": "broken", "name": "Broken", "canvasData": {"objects": "nope"}},
                {"id": "empty", "name": ""}
            ],
            "activeSlideId": "empty"
        })
    }

    #[test]
    fn test_new_presentation_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("deck.json");
        let config = CliConfig::default();

        new_presentation(&config, &path, 3).expect("new");

        let mut out = Vec::new();
        let summary = inspect(&config, &path, false, &mut out).expect("inspect");
        let names: Vec<_> = summary.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Slide 1", "Slide 2", "Slide 3"]);
        assert!(summary[0].active);
        assert_eq!(summary[0].objects, Some(0));
        assert!(String::from_utf8(out).expect("utf-8").starts_with("*   1  slide-1  Slide 1"));
    }

    #[test]
    fn test_inspect_json_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(dir.path(), "in.json", &sample());

        let mut out = Vec::new();
        inspect(&CliConfig::default(), &path, true, &mut out).expect("inspect");
        let value: Value = serde_json::from_slice(&out).expect("json");

        assert_eq!(value[0]["objects"], 1);
        assert_eq!(value[1]["objects"], Value::Null);
        assert_eq!(value[2]["name"], "Untitled Slide");
        assert_eq!(value[2]["active"], true);
        assert_eq!(value[0]["hasThumbnail"], false);
    }

    #[test]
    fn test_inspect_rejects_empty_deck() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(dir.path(), "in.json", &json!({"slides": []}));
        let err = inspect(&CliConfig::default(), &path, false, &mut Vec::new())
            .expect_err("rejected");
        assert!(format!("{err:#}").contains("presentation has no slides"));
    }

    #[test]
    fn test_thumbnails_skip_unreadable_slides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = write_file(dir.path(), "in.json", &sample());
        let out_dir = dir.path().join("thumbs");

        let written = thumbnails(&CliConfig::default(), &input, &out_dir, 0.1).expect("render");

        let names: Vec<_> = written
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, ["01-intro.png", "03-empty.png"]);
        let png = std::fs::read(&written[0]).expect("read");
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_thumbnail_names_stay_inside_output_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = write_file(
            dir.path(),
            "in.json",
            &json!({"slides": [{"id": "../../escaped", "name": "A"}, {"id": "ok"}]}),
        );
        let out_dir = dir.path().join("thumbs");

        let written = thumbnails(&CliConfig::default(), &input, &out_dir, 0.1).expect("render");

        assert_eq!(written.len(), 2);
        assert_eq!(written[0], out_dir.join("01-______escaped.png"));
        assert!(written.iter().all(|p| p.parent() == Some(out_dir.as_path())));
        assert!(written[0].exists());
    }

    #[test]
    fn test_file_stem_replaces_unsafe_characters() {
        assert_eq!(file_stem("slide-1_a"), "slide-1_a");
        assert_eq!(file_stem("a/b\\c:d"), "a_b_c_d");
        assert_eq!(file_stem(""), "slide");
    }

    #[tokio::test]
    async fn test_normalize_regenerates_thumbnails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = write_file(dir.path(), "in.json", &sample());
        let output = dir.path().join("out.json");
        let config = CliConfig::default();

        let path = normalize(&config, &input, Some(&output)).await.expect("normalize");
        assert_eq!(path, output);

        let summary = inspect(&config, &output, false, &mut Vec::new()).expect("inspect");
        assert_eq!(summary.len(), 3);
        assert!(summary.iter().all(|s| s.has_thumbnail));
        assert_eq!(summary[0].objects, Some(1));
        assert_eq!(summary[1].objects, Some(0));
        assert!(summary[2].active);
    }

    #[tokio::test]
    async fn test_normalize_default_output_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = write_file(dir.path(), "in.json", &sample());

        let path = normalize(&CliConfig::default(), &input, None).await.expect("normalize");

        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("presentation-"));
        assert!(name.ends_with(".json"));
    }
}
