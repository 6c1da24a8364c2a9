//! Scene rendering to SVG and PNG.
//!
//! Renders a [`SceneTree`] using an SVG intermediate representation and the
//! resvg/tiny-skia rasterization pipeline. Thumbnails are the same render at
//! a reduced scale.

use std::fmt::Write;

use deck_core::{CanvasSpec, ObjectKind, SceneObject, SceneTree};

use crate::error::{RenderError, RenderResult};

/// Output size of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Scale factor applied to the output (0.1 for thumbnails).
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from_spec(&CanvasSpec::default())
    }
}

impl RenderConfig {
    /// Full-size render of a canvas.
    #[must_use]
    pub fn from_spec(spec: &CanvasSpec) -> Self {
        Self {
            width: spec.width,
            height: spec.height,
            scale: 1.0,
        }
    }
}

/// Renders scene trees to SVG and PNG.
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer {
    config: RenderConfig,
}

impl SceneRenderer {
    /// Create a renderer with the given configuration.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// The render configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render a scene to PNG bytes at the configured scale.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(&self, scene: &SceneTree) -> RenderResult<Vec<u8>> {
        self.render_to_png_scaled(scene, self.config.scale)
    }

    /// Render a scene to PNG bytes at an explicit scale.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png_scaled(&self, scene: &SceneTree, scale: f32) -> RenderResult<Vec<u8>> {
        let svg_string = self.render_to_svg_scaled(scene, scale);
        let pixmap = Self::rasterize_svg(&svg_string)?;

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Rasterize(format!("PNG encoding failed: {e}")))
    }

    /// Render a scene to an SVG string at the configured scale.
    #[must_use]
    pub fn render_to_svg(&self, scene: &SceneTree) -> String {
        self.render_to_svg_scaled(scene, self.config.scale)
    }

    #[allow(clippy::cast_precision_loss)] // Canvas dimensions fit in f32
    fn render_to_svg_scaled(&self, scene: &SceneTree, scale: f32) -> String {
        let (out_w, out_h) = self.output_dimensions(scale);
        let view_w = self.config.width.max(1);
        let view_h = self.config.height.max(1);

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );

        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&scene.background),
        );

        // Objects are stored bottom first, which is SVG paint order.
        for object in &scene.objects {
            render_object_svg(&mut svg, object);
        }

        svg.push_str("</svg>");
        svg
    }

    /// Get output dimensions (width, height) in pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn output_dimensions(&self, scale: f32) -> (u32, u32) {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        #[allow(clippy::cast_precision_loss)]
        let out_w = (self.config.width as f32 * scale).round() as u32;
        #[allow(clippy::cast_precision_loss)]
        let out_h = (self.config.height as f32 * scale).round() as u32;
        (out_w.max(1), out_h.max(1))
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_str(svg_string, &opt)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let px_w = tree.size().width().round() as u32;
        let px_h = tree.size().height().round() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Rasterize("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

/// Render a single object to SVG.
///
/// Each object is drawn in its own local space (origin at its top-left
/// corner), placed by a `translate rotate scale` transform.
fn render_object_svg(svg: &mut String, object: &SceneObject) {
    let g = &object.geometry;
    let _ = write!(
        svg,
        "<g transform=\"translate({} {}) rotate({}) scale({} {})\">",
        g.left, g.top, g.angle, g.scale_x, g.scale_y,
    );

    match &object.kind {
        ObjectKind::Text {
            text,
            font_family,
            font_size,
            fill,
        } => {
            let _ = write!(
                svg,
                "<text x=\"0\" y=\"{font_size}\" font-size=\"{font_size}\" fill=\"{}\" font-family=\"{}\">{}</text>",
                escape_xml(fill),
                escape_xml(font_family),
                escape_xml(text),
            );
        }

        ObjectKind::Rectangle {
            fill,
            stroke,
            stroke_width,
        } => {
            let _ = write!(
                svg,
                "<rect width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width}\"/>",
                g.width,
                g.height,
                escape_xml(fill),
                escape_xml(stroke),
            );
        }

        ObjectKind::Circle {
            radius,
            fill,
            stroke,
            stroke_width,
        } => {
            let _ = write!(
                svg,
                "<circle cx=\"{radius}\" cy=\"{radius}\" r=\"{radius}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width}\"/>",
                escape_xml(fill),
                escape_xml(stroke),
            );
        }

        ObjectKind::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            stroke_width,
        } => {
            let (ox, oy) = (x1.min(*x2), y1.min(*y2));
            let _ = write!(
                svg,
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width}\"/>",
                x1 - ox,
                y1 - oy,
                x2 - ox,
                y2 - oy,
                escape_xml(stroke),
            );
        }

        ObjectKind::Image { src, opacity } => {
            let _ = write!(
                svg,
                "<image width=\"{}\" height=\"{}\" opacity=\"{opacity}\" xlink:href=\"{}\"/>",
                g.width,
                g.height,
                escape_xml(src),
            );
        }
    }

    svg.push_str("</g>");
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
