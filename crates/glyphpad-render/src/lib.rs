//! glyphpad Render Library
//!
//! Rasterizes the drawing canvas into PNG snapshots. Rendering runs on the
//! CPU so a snapshot never depends on a GPU surface being available.

mod raster;
mod renderer;

pub use raster::{encode_png, RasterBuffer, SnapshotExporter, PNG_MIME};
pub use renderer::{ExportError, ExportResult, RenderContext, DEFAULT_STROKE_WIDTH};
