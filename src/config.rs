use crate::{TraceError, TraceResult};

/// Largest supported selective blur radius.
pub const MAX_BLUR_RADIUS: u32 = 5;
/// Largest meaningful selective blur delta (four channels of 256 levels).
pub const MAX_BLUR_DELTA: u32 = 1024;
/// Most decimal places an `f64` coordinate can carry meaningfully.
pub const MAX_PRECISION: u32 = 15;

/// Options controlling every stage of the tracing pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TracingOptions {
    /// Maximum distance of a skipped point from a straight segment (ltres).
    pub line_tolerance: f64,
    /// Maximum distance of a skipped point from a quadratic segment (qtres).
    pub quad_tolerance: f64,
    /// Regions and holes enclosing fewer pixels than this are dropped (pathomit).
    pub path_omit: usize,
    /// Number of palette entries.
    pub palette_size: usize,
    /// Number of quantization passes.
    pub quantize_cycles: usize,
    /// Entries holding less than this share of the pixels are re-seeded between passes.
    pub min_color_ratio: f64,
    /// Seed for the random palette entries that do not fit the RGB cube.
    pub palette_seed: u64,
    /// Output coordinate scale factor.
    pub scale: f64,
    /// Decimal places kept in output coordinates, `None` keeps full precision.
    pub precision: Option<u32>,
    /// Selective blur radius (0-5, 0 disables blurring).
    pub blur_radius: u32,
    /// Selective blur edge threshold (0-1024).
    pub blur_delta: u32,
}

impl Default for TracingOptions {
    fn default() -> Self {
        Self {
            line_tolerance: 1.0,
            quad_tolerance: 1.0,
            path_omit: 8,
            palette_size: 16,
            quantize_cycles: 3,
            min_color_ratio: 0.0,
            palette_seed: 0,
            scale: 1.0,
            precision: Some(1),
            blur_radius: 0,
            blur_delta: 20,
        }
    }
}

impl TracingOptions {
    /// Set the line and quadratic tolerances.
    pub fn with_tolerances(mut self, line: f64, quad: f64) -> Self {
        self.line_tolerance = line;
        self.quad_tolerance = quad;
        self
    }

    /// Set the minimum region size in pixels.
    pub fn with_path_omit(mut self, path_omit: usize) -> Self {
        self.path_omit = path_omit;
        self
    }

    /// Set the number of palette entries.
    pub fn with_palette_size(mut self, palette_size: usize) -> Self {
        self.palette_size = palette_size;
        self
    }

    /// Set the number of quantization passes.
    pub fn with_quantize_cycles(mut self, cycles: usize) -> Self {
        self.quantize_cycles = cycles;
        self
    }

    /// Set the share below which palette entries are re-seeded.
    pub fn with_min_color_ratio(mut self, ratio: f64) -> Self {
        self.min_color_ratio = ratio;
        self
    }

    /// Set the seed for randomly generated palette entries.
    pub fn with_palette_seed(mut self, seed: u64) -> Self {
        self.palette_seed = seed;
        self
    }

    /// Set the output scale factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the number of decimal places kept in output coordinates.
    pub fn with_precision(mut self, precision: Option<u32>) -> Self {
        self.precision = precision;
        self
    }

    /// Set the selective blur radius and delta.
    pub fn with_blur(mut self, radius: u32, delta: u32) -> Self {
        self.blur_radius = radius;
        self.blur_delta = delta;
        self
    }

    /// Check that every option is inside its accepted range.
    pub fn validate(&self) -> TraceResult<()> {
        if self.palette_size < 1 {
            return Err(TraceError::invalid(
                "palette_size",
                "palette must hold at least one color",
            ));
        }
        check_tolerance("line_tolerance", self.line_tolerance)?;
        check_tolerance("quad_tolerance", self.quad_tolerance)?;
        if !(self.min_color_ratio.is_finite() && self.min_color_ratio >= 0.0) {
            return Err(TraceError::invalid(
                "min_color_ratio",
                format!("expected a non-negative ratio, got {}", self.min_color_ratio),
            ));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(TraceError::invalid(
                "scale",
                format!("expected a positive scale, got {}", self.scale),
            ));
        }
        if let Some(places) = self.precision.filter(|&places| places > MAX_PRECISION) {
            return Err(TraceError::invalid(
                "precision",
                format!("expected 0-{MAX_PRECISION} decimal places, got {places}"),
            ));
        }
        if self.blur_radius > MAX_BLUR_RADIUS {
            return Err(TraceError::invalid(
                "blur_radius",
                format!(
                    "expected 0-{MAX_BLUR_RADIUS}, got {}",
                    self.blur_radius
                ),
            ));
        }
        if self.blur_delta > MAX_BLUR_DELTA {
            return Err(TraceError::invalid(
                "blur_delta",
                format!("expected 0-{MAX_BLUR_DELTA}, got {}", self.blur_delta),
            ));
        }
        Ok(())
    }
}

fn check_tolerance(name: &'static str, value: f64) -> TraceResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TraceError::invalid(
            name,
            format!("expected a non-negative distance, got {value}"),
        ))
    }
}
