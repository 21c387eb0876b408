use std::fmt::Write as _;

use image::Rgb;

use crate::config::{MAX_PRECISION, TracingOptions};
use crate::curve::Segment;
use crate::geom::{GridPoint, Point};
use crate::quantize::Palette;

/// The fitted outline of one region, with the outlines of the holes it encloses.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedPath {
    palette_index: usize,
    start: GridPoint,
    segments: Vec<Segment>,
    holes: Vec<Vec<Segment>>,
}

impl TracedPath {
    pub fn new(palette_index: usize, start: GridPoint, segments: Vec<Segment>) -> Self {
        Self {
            palette_index,
            start,
            segments,
            holes: Vec::new(),
        }
    }

    /// Add a hole outline to cut out of this path.
    pub fn with_hole(mut self, hole: Vec<Segment>) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn push_hole(&mut self, hole: Vec<Segment>) {
        self.holes.push(hole);
    }

    pub fn palette_index(&self) -> usize {
        self.palette_index
    }

    pub fn start(&self) -> GridPoint {
        self.start
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn holes(&self) -> &[Vec<Segment>] {
        &self.holes
    }

    /// Raster position of the starting corner in an image `width` pixels wide.
    pub fn z_key(&self, width: u32) -> u64 {
        u64::from(self.start.y) * u64::from(width) + u64::from(self.start.x)
    }
}

/// A filled and stroked closed path in viewport coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorPath {
    segments: Vec<Segment>,
    holes: Vec<Vec<Segment>>,
    fill: Rgb<u8>,
    fill_alpha: f64,
    stroke: Rgb<u8>,
    stroke_alpha: f64,
    stroke_width: f64,
}

impl VectorPath {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn holes(&self) -> &[Vec<Segment>] {
        &self.holes
    }

    pub fn fill(&self) -> Rgb<u8> {
        self.fill
    }

    /// Fill opacity in `0.0..=1.0`.
    pub fn fill_alpha(&self) -> f64 {
        self.fill_alpha
    }

    pub fn stroke(&self) -> Rgb<u8> {
        self.stroke
    }

    pub fn stroke_alpha(&self) -> f64 {
        self.stroke_alpha
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Render the outline and its holes as `M`/`L`/`Q`/`Z` path commands.
    pub fn path_data(&self) -> String {
        let mut data = String::new();
        for outline in std::iter::once(&self.segments).chain(&self.holes) {
            let Some(first) = outline.first() else {
                continue;
            };
            if !data.is_empty() {
                data.push(' ');
            }
            let start = first.start();
            let _ = write!(data, "M {} {}", start.x, start.y);
            for segment in outline {
                let _ = match *segment {
                    Segment::Line { to, .. } => write!(data, " L {} {}", to.x, to.y),
                    Segment::Quad { control, to, .. } => {
                        write!(data, " Q {} {} {} {}", control.x, control.y, to.x, to.y)
                    }
                };
            }
            data.push_str(" Z");
        }
        data
    }
}

/// The traced image: a viewport and its paths in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorGraphic {
    width: f64,
    height: f64,
    paths: Vec<VectorPath>,
}

impl VectorGraphic {
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn paths(&self) -> &[VectorPath] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<VectorPath> {
        self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Total number of segments across all outlines and holes.
    pub fn segment_count(&self) -> usize {
        self.paths
            .iter()
            .map(|p| p.segments.len() + p.holes.iter().map(Vec::len).sum::<usize>())
            .sum()
    }
}

/// Order traced paths for painting, color them and move them into viewport space.
///
/// Paths are sorted by the raster position of their starting corner. The sort is stable, so
/// paths that start on the same corner keep the order they arrive in.
pub fn assemble(
    mut paths: Vec<TracedPath>,
    palette: &Palette,
    width: u32,
    height: u32,
    options: &TracingOptions,
) -> VectorGraphic {
    paths.sort_by_key(|path| path.z_key(width));

    let transform = |point: Point| point.map(|v| round_to(v * options.scale, options.precision));
    let paths = paths
        .into_iter()
        .filter_map(|path| {
            let Some(color) = palette.get(path.palette_index) else {
                log::warn!("path refers to missing palette entry {}", path.palette_index);
                return None;
            };
            let [r, g, b, a] = color.0;
            let alpha = f64::from(a) / 255.0;
            Some(VectorPath {
                segments: path.segments.iter().map(|s| s.map(transform)).collect(),
                holes: path
                    .holes
                    .iter()
                    .map(|hole| hole.iter().map(|s| s.map(transform)).collect())
                    .collect(),
                fill: Rgb([r, g, b]),
                fill_alpha: alpha,
                stroke: Rgb([r, g, b]),
                stroke_alpha: alpha,
                stroke_width: 1.0,
            })
        })
        .collect();

    VectorGraphic {
        width: f64::from(width) * options.scale,
        height: f64::from(height) * options.scale,
        paths,
    }
}

/// Round to `precision` decimal places. Places past `MAX_PRECISION` change nothing.
fn round_to(value: f64, precision: Option<u32>) -> f64 {
    let Some(places) = precision else {
        return value;
    };
    let Ok(exponent) = i32::try_from(places.min(MAX_PRECISION)) else {
        return value;
    };
    let factor = 10f64.powi(exponent);
    // Adding zero folds -0.0 into 0.0
    (value * factor).round() / factor + 0.0
}
