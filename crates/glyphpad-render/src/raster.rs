//! CPU rasterization of the canvas into a PNG snapshot.

use crate::renderer::{ExportError, ExportResult, RenderContext};
use base64::Engine as _;
use glyphpad_core::canvas::CanvasState;
use glyphpad_core::stroke::{PathCommand, SerializableColor, Stroke};
use kurbo::Size;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

/// MIME type of every raster buffer.
pub const PNG_MIME: &str = "image/png";

/// Encoded snapshot of the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl RasterBuffer {
    /// PNG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the PNG bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        PNG_MIME
    }

    /// Pixel width of the encoded image.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height of the encoded image.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:image/png;base64,...` form of the buffer.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{PNG_MIME};base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Rasterizes the canvas onto the attached drawing surface.
#[derive(Debug, Clone, Default)]
pub struct SnapshotExporter {
    /// Logical size of the on-screen canvas, once laid out.
    surface: Option<Size>,
    ctx: RenderContext,
}

impl SnapshotExporter {
    /// Create an exporter with no surface attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an exporter with custom rendering parameters.
    pub fn with_context(ctx: RenderContext) -> Self {
        Self { surface: None, ctx }
    }

    /// Attach (or resize) the drawing surface.
    pub fn attach_surface(&mut self, size: Size) {
        self.surface = Some(size);
    }

    /// Detach the drawing surface (e.g. the canvas view was unmounted).
    pub fn detach_surface(&mut self) {
        self.surface = None;
    }

    pub fn surface(&self) -> Option<Size> {
        self.surface
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    /// Render `canvas` and encode it as PNG.
    ///
    /// A canvas without strokes yields a blank image. Fails with
    /// [`ExportError::EmptyExport`] only when no usable surface exists, and
    /// with [`ExportError::SurfaceTooLarge`] when the surface cannot be
    /// allocated.
    pub fn export(&self, canvas: &CanvasState) -> ExportResult<RasterBuffer> {
        let pixmap = self.render(canvas)?;
        let (width, height) = (pixmap.width(), pixmap.height());
        let bytes = encode_png(&demultiplied_rgba(&pixmap), width, height)?;

        log::info!(
            "Exported {} strokes as {}x{} PNG ({} bytes)",
            canvas.len(),
            width,
            height,
            bytes.len()
        );
        Ok(RasterBuffer { bytes, width, height })
    }

    /// Render `canvas` into a pixmap without encoding.
    pub fn render(&self, canvas: &CanvasState) -> ExportResult<Pixmap> {
        let size = self.surface.ok_or(ExportError::EmptyExport)?;
        let (width, height) = self.ctx.pixel_size(size).ok_or(ExportError::EmptyExport)?;
        let mut pixmap =
            Pixmap::new(width, height).ok_or(ExportError::SurfaceTooLarge { width, height })?;

        pixmap.fill(to_skia_color(self.ctx.background_color.into()));

        let scale = self.ctx.scale_factor as f32;
        let transform = Transform::from_scale(scale, scale);
        for stroke in canvas.strokes() {
            self.render_stroke(&mut pixmap, stroke, transform);
        }

        Ok(pixmap)
    }

    fn render_stroke(&self, pixmap: &mut Pixmap, stroke: &Stroke, transform: Transform) {
        let mut paint = Paint::default();
        paint.set_color(to_skia_color(stroke.color));
        paint.anti_alias = self.ctx.anti_alias;

        let width = self.ctx.stroke_width as f32;
        let bounds = stroke.bounds();

        // A tap or a stroke that never left its origin renders as a dot.
        if stroke.is_point() || (bounds.width() == 0.0 && bounds.height() == 0.0) {
            let origin = stroke.origin();
            if let Some(dot) = PathBuilder::from_circle(origin.x as f32, origin.y as f32, width / 2.0) {
                pixmap.fill_path(&dot, &paint, FillRule::Winding, transform, None);
            }
            return;
        }

        let mut builder = PathBuilder::new();
        for command in stroke.commands() {
            match *command {
                PathCommand::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
                PathCommand::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            }
        }
        let Some(path) = builder.finish() else {
            log::debug!("Skipping degenerate stroke {}", stroke.id());
            return;
        };

        let style = tiny_skia::Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &style, transform, None);
    }
}

fn to_skia_color(color: SerializableColor) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Straight-alpha RGBA8 bytes of a pixmap.
fn demultiplied_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    rgba
}

/// Encode RGBA8 pixel data as PNG.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> ExportResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
        writer.finish()?;
    }

    if png_data.is_empty() {
        return Err(ExportError::Encode("encoder produced no data".to_string()));
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphpad_core::gesture::GestureController;
    use kurbo::Point;

    fn exporter(width: f64, height: f64) -> SnapshotExporter {
        let mut exporter = SnapshotExporter::new();
        exporter.attach_surface(Size::new(width, height));
        exporter
    }

    fn decode(buffer: &RasterBuffer) -> image::RgbaImage {
        image::load_from_memory_with_format(buffer.bytes(), image::ImageFormat::Png)
            .unwrap()
            .to_rgba8()
    }

    fn vertical_line_canvas() -> CanvasState {
        let mut controller = GestureController::new();
        controller.pointer_start(Point::new(10.0, 10.0));
        for y in [20.0, 30.0, 40.0, 45.0] {
            controller.pointer_move(Point::new(10.0, y));
        }
        controller.pointer_move(Point::new(10.0, 50.0));
        controller.pointer_end();
        controller.canvas().clone()
    }

    #[test]
    fn test_export_empty_canvas_is_blank_image() {
        let buffer = exporter(360.0, 380.0).export(&CanvasState::new()).unwrap();
        assert_eq!(buffer.mime_type(), "image/png");
        assert!(!buffer.is_empty());

        let img = decode(&buffer);
        assert_eq!(img.dimensions(), (360, 380));
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_export_without_surface_fails() {
        let exporter = SnapshotExporter::new();
        assert!(matches!(
            exporter.export(&CanvasState::new()),
            Err(ExportError::EmptyExport)
        ));
    }

    #[test]
    fn test_export_zero_area_surface_fails() {
        assert!(matches!(
            exporter(0.0, 100.0).export(&CanvasState::new()),
            Err(ExportError::EmptyExport)
        ));
    }

    #[test]
    fn test_oversized_surface_is_not_empty_export() {
        let err = exporter(1.0e9, 1.0).export(&CanvasState::new()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::SurfaceTooLarge {
                width: 1_000_000_000,
                height: 1
            }
        ));
    }

    #[test]
    fn test_detach_surface() {
        let mut exporter = exporter(10.0, 10.0);
        exporter.detach_surface();
        assert!(exporter.surface().is_none());
        assert!(matches!(
            exporter.export(&CanvasState::new()),
            Err(ExportError::EmptyExport)
        ));
    }

    #[test]
    fn test_stroke_is_drawn() {
        let buffer = exporter(64.0, 64.0).export(&vertical_line_canvas()).unwrap();
        let img = decode(&buffer);

        // On the line.
        assert_eq!(img.get_pixel(10, 30).0, [0, 0, 0, 255]);
        // Far away from it.
        assert_eq!(img.get_pixel(50, 30).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_point_stroke_renders_dot() {
        let mut canvas = CanvasState::new();
        canvas.append(Stroke::new(Point::new(20.0, 20.0), SerializableColor::black()));

        let img = decode(&exporter(40.0, 40.0).export(&canvas).unwrap());
        assert_eq!(img.get_pixel(20, 20).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(35, 35).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_stroke_color_is_used() {
        let mut canvas = CanvasState::new();
        let red = SerializableColor::new(255, 0, 0, 255);
        canvas.append(
            Stroke::from_points(&[Point::new(0.0, 16.0), Point::new(32.0, 16.0)], red).unwrap(),
        );

        let img = decode(&exporter(32.0, 32.0).export(&canvas).unwrap());
        assert_eq!(img.get_pixel(16, 16).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_export_is_deterministic() {
        let canvas = vertical_line_canvas();
        let exporter = exporter(48.0, 64.0);

        let a = exporter.export(&canvas).unwrap();
        let b = exporter.export(&canvas).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scale_factor() {
        let mut exporter = SnapshotExporter::with_context(RenderContext::new().with_scale_factor(2.0));
        exporter.attach_surface(Size::new(30.0, 20.0));

        let buffer = exporter.export(&vertical_line_canvas()).unwrap();
        assert_eq!((buffer.width(), buffer.height()), (60, 40));
        assert_eq!(decode(&buffer).dimensions(), (60, 40));
    }

    #[test]
    fn test_data_url() {
        let buffer = exporter(2.0, 2.0).export(&CanvasState::new()).unwrap();
        let url = buffer.to_data_url();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
