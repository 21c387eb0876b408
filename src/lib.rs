pub mod assemble;
pub mod blur;
pub mod config;
pub mod contour;
pub mod curve;
pub mod error;
pub mod geom;
pub mod interpolate;
pub mod layer;
pub mod pixels;
pub mod quantize;

pub use assemble::{TracedPath, VectorGraphic, VectorPath};
pub use config::TracingOptions;
pub use curve::Segment;
pub use error::{TraceError, TraceResult};
pub use geom::{GridPoint, Point};
pub use pixels::PixelBuffer;
pub use quantize::{IndexedImage, Palette};

use std::collections::HashMap;
use std::path::Path;

use crate::assemble::assemble;
use crate::blur::selective_blur;
use crate::contour::{ContourKind, scan_contours};
use crate::curve::fit_segments;
use crate::interpolate::interpolate;
use crate::layer::{Layer, separate_layers};

/// Entry point for tracing bitmaps into vector graphics with a fixed set of options.
#[derive(Debug, Clone)]
pub struct Tracer {
    options: TracingOptions,
}

impl Tracer {
    /// Validate the options and build a tracer.
    pub fn new(options: TracingOptions) -> TraceResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Get a reference to the options the tracer runs with.
    pub fn options(&self) -> &TracingOptions {
        &self.options
    }

    /// Decode an image file and trace it.
    pub fn trace_file(&self, path: impl AsRef<Path>) -> TraceResult<VectorGraphic> {
        let pixels = PixelBuffer::open(path)?;
        Ok(self.trace(&pixels))
    }

    /// Blur (when enabled) and quantize the buffer without tracing it.
    pub fn quantize(&self, pixels: &PixelBuffer) -> (Palette, IndexedImage) {
        let blurred;
        let source = if self.options.blur_radius > 0 {
            blurred = selective_blur(pixels, self.options.blur_radius, self.options.blur_delta);
            &blurred
        } else {
            pixels
        };
        quantize::quantize(source, &self.options)
    }

    /// Run the whole pipeline. Empty or malformed buffers give an empty graphic.
    pub fn trace(&self, pixels: &PixelBuffer) -> VectorGraphic {
        let (palette, indexed) = self.quantize(pixels);
        let layers = separate_layers(&indexed);
        log::debug!("separated {} non-empty layers", layers.len());

        let traced = self.trace_layers(&layers);
        let graphic = assemble(
            traced,
            &palette,
            pixels.width(),
            pixels.height(),
            &self.options,
        );
        log::debug!(
            "traced {} paths with {} segments",
            graphic.paths().len(),
            graphic.segment_count()
        );
        graphic
    }

    #[cfg(feature = "parallel")]
    fn trace_layers(&self, layers: &[Layer]) -> Vec<TracedPath> {
        use rayon::prelude::*;

        let per_layer: Vec<Vec<TracedPath>> =
            layers.par_iter().map(|layer| self.trace_layer(layer)).collect();
        per_layer.into_iter().flatten().collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn trace_layers(&self, layers: &[Layer]) -> Vec<TracedPath> {
        layers
            .iter()
            .flat_map(|layer| self.trace_layer(layer))
            .collect()
    }

    /// Scan, simplify and fit every contour of a layer, attaching holes to their regions.
    fn trace_layer(&self, layer: &Layer) -> Vec<TracedPath> {
        let TracingOptions {
            line_tolerance,
            quad_tolerance,
            path_omit,
            ..
        } = self.options;

        let mut traced: Vec<TracedPath> = Vec::new();
        let mut owners: HashMap<usize, usize> = HashMap::new();
        for contour in scan_contours(layer, path_omit) {
            let segments = fit_segments(&interpolate(&contour), line_tolerance, quad_tolerance);
            match contour.kind() {
                ContourKind::Outer => {
                    owners.insert(contour.region(), traced.len());
                    traced.push(TracedPath::new(
                        layer.palette_index(),
                        contour.start(),
                        segments,
                    ));
                }
                ContourKind::Hole => {
                    // Holes are only kept for kept regions, whose outlines come first
                    let Some(&owner) = owners.get(&contour.region()) else {
                        unreachable!("hole of region {} has no outline", contour.region());
                    };
                    traced[owner].push_hole(segments);
                }
            }
        }
        traced
    }
}
