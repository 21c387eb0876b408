//! Boundary extraction for a single layer.
//!
//! Contours follow the pixel edges between grid corners with the layer on the right-hand
//! side of travel. Outer boundaries therefore run clockwise on screen and holes run
//! counter-clockwise, which is what a non-zero fill rule needs to punch holes out of their
//! enclosing region. Where two layer pixels touch only diagonally the walk turns right, so
//! regions are 4-connected and the background between them is 8-connected.

use std::collections::VecDeque;

use crate::geom::GridPoint;
use crate::layer::Layer;

/// A unit step along a pixel edge. `South` points down the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    South,
    West,
    North,
}

impl Direction {
    /// The direction after a clockwise quarter turn on screen.
    pub fn turn_right(self) -> Self {
        match self {
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            Direction::North => Direction::East,
        }
    }

    /// The direction after a counter-clockwise quarter turn on screen.
    pub fn turn_left(self) -> Self {
        match self {
            Direction::East => Direction::North,
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
        }
    }

    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
        }
    }

    /// Move `point` one unit in this direction.
    ///
    /// # Panics
    /// Panics if the step would leave the non-negative quadrant.
    pub fn step(self, point: GridPoint) -> GridPoint {
        match self {
            Direction::East => GridPoint::new(point.x + 1, point.y),
            Direction::South => GridPoint::new(point.x, point.y + 1),
            Direction::West => GridPoint::new(point.x - 1, point.y),
            Direction::North => GridPoint::new(point.x, point.y - 1),
        }
    }
}

/// Whether a contour bounds a region from outside or a hole inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContourKind {
    Outer,
    Hole,
}

/// A closed boundary made of unit steps between grid corners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPath {
    start: GridPoint,
    steps: Vec<Direction>,
    kind: ContourKind,
    area: u64,
    region: usize,
}

impl RawPath {
    /// Build a path from a closed walk, rotating it so that it starts on a corner.
    ///
    /// # Panics
    /// Panics if the steps do not return to `start` or never change direction.
    pub fn new(start: GridPoint, mut steps: Vec<Direction>, region: usize) -> Self {
        let n = steps.len();
        let corner = (0..n)
            .find(|&i| steps[i] != steps[(i + n - 1) % n])
            .unwrap_or_else(|| panic!("contour at {start:?} has no corner"));
        let start = steps[..corner]
            .iter()
            .fold(start, |point, dir| dir.step(point));
        steps.rotate_left(corner);

        let twice_area = twice_signed_area(start, &steps);
        let kind = if twice_area > 0 {
            ContourKind::Outer
        } else {
            ContourKind::Hole
        };
        Self {
            start,
            steps,
            kind,
            area: twice_area.unsigned_abs() / 2,
            region,
        }
    }

    /// The corner the walk starts and ends at.
    pub fn start(&self) -> GridPoint {
        self.start
    }

    pub fn steps(&self) -> &[Direction] {
        &self.steps
    }

    pub fn kind(&self) -> ContourKind {
        self.kind
    }

    /// Number of pixels enclosed by the contour.
    pub fn area(&self) -> u64 {
        self.area
    }

    /// Identifier of the connected region the contour belongs to, unique within its layer.
    pub fn region(&self) -> usize {
        self.region
    }

    /// Every corner visited by the walk, starting with [`RawPath::start`].
    pub fn points(&self) -> Vec<GridPoint> {
        let mut points = Vec::with_capacity(self.steps.len());
        let mut at = self.start;
        for dir in &self.steps {
            points.push(at);
            at = dir.step(at);
        }
        points
    }
}

/// Twice the shoelace area; positive for clockwise-on-screen walks.
fn twice_signed_area(start: GridPoint, steps: &[Direction]) -> i64 {
    let (mut x, mut y) = (i64::from(start.x), i64::from(start.y));
    let mut sum = 0;
    for dir in steps {
        let (dx, dy) = dir.delta();
        let (nx, ny) = (x + dx, y + dy);
        sum += x * ny - nx * y;
        (x, y) = (nx, ny);
    }
    assert!(
        (x, y) == (i64::from(start.x), i64::from(start.y)),
        "contour starting at {start:?} does not close"
    );
    sum
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeId {
    Horizontal(usize),
    Vertical(usize),
}

/// Directed boundary edges of a layer and which of them have been walked.
struct EdgeGrid<'a> {
    layer: &'a Layer,
    /// `height + 1` rows of `width` edges.
    horizontal: Vec<bool>,
    /// `height` rows of `width + 1` edges.
    vertical: Vec<bool>,
}

impl<'a> EdgeGrid<'a> {
    fn new(layer: &'a Layer) -> Self {
        let (w, h) = (layer.width() as usize, layer.height() as usize);
        Self {
            layer,
            horizontal: vec![false; w * (h + 1)],
            vertical: vec![false; (w + 1) * h],
        }
    }

    /// The boundary edge leaving `at` in direction `dir`, if the layer has one there.
    fn outgoing(&self, at: GridPoint, dir: Direction) -> Option<EdgeId> {
        let (x, y) = (i64::from(at.x), i64::from(at.y));
        let set = |px: i64, py: i64| self.layer.contains(px, py);
        let exists = match dir {
            Direction::East => set(x, y) && !set(x, y - 1),
            Direction::West => set(x - 1, y - 1) && !set(x - 1, y),
            Direction::South => set(x - 1, y) && !set(x, y),
            Direction::North => set(x, y - 1) && !set(x - 1, y - 1),
        };
        if !exists {
            return None;
        }

        let w = self.layer.width() as usize;
        let (x, y) = (at.x as usize, at.y as usize);
        Some(match dir {
            Direction::East => EdgeId::Horizontal(y * w + x),
            Direction::West => EdgeId::Horizontal(y * w + x - 1),
            Direction::South => EdgeId::Vertical(y * (w + 1) + x),
            Direction::North => EdgeId::Vertical((y - 1) * (w + 1) + x),
        })
    }

    fn is_visited(&self, edge: EdgeId) -> bool {
        match edge {
            EdgeId::Horizontal(i) => self.horizontal[i],
            EdgeId::Vertical(i) => self.vertical[i],
        }
    }

    fn mark(&mut self, edge: EdgeId) {
        match edge {
            EdgeId::Horizontal(i) => self.horizontal[i] = true,
            EdgeId::Vertical(i) => self.vertical[i] = true,
        }
    }

    /// Walk the contour that leaves `start` in direction `first` until it closes.
    fn trace(&mut self, start: GridPoint, first: Direction) -> Vec<Direction> {
        let Some(start_edge) = self.outgoing(start, first) else {
            unreachable!("no {first:?} edge leaves {start:?}");
        };
        self.mark(start_edge);

        let mut steps = vec![first];
        let mut at = first.step(start);
        let mut heading = first;
        loop {
            // Right first: at a saddle this keeps diagonal neighbours in separate regions
            let Some((dir, edge)) = [heading.turn_right(), heading, heading.turn_left()]
                .into_iter()
                .find_map(|dir| self.outgoing(at, dir).map(|edge| (dir, edge)))
            else {
                unreachable!("contour from {start:?} dead-ends at {at:?}");
            };
            if edge == start_edge {
                break;
            }
            assert!(
                !self.is_visited(edge),
                "contour from {start:?} re-entered a walked edge at {at:?}"
            );
            self.mark(edge);
            steps.push(dir);
            at = dir.step(at);
            heading = dir;
        }
        steps
    }
}

/// 4-connected region labels, assigned lazily as outer boundaries are discovered.
struct RegionLabels {
    width: usize,
    labels: Vec<Option<usize>>,
    sizes: Vec<usize>,
}

impl RegionLabels {
    fn new(layer: &Layer) -> Self {
        let len = layer.width() as usize * layer.height() as usize;
        Self {
            width: layer.width() as usize,
            labels: vec![None; len],
            sizes: Vec::new(),
        }
    }

    fn label(&self, x: u32, y: u32) -> Option<usize> {
        self.labels[y as usize * self.width + x as usize]
    }

    fn size(&self, region: usize) -> usize {
        self.sizes[region]
    }

    /// Label the region containing pixel `(x, y)` and return its id.
    fn fill(&mut self, layer: &Layer, x: u32, y: u32) -> usize {
        let region = self.sizes.len();
        let mut size = 0;
        let mut queue = VecDeque::new();
        queue.push_back((i64::from(x), i64::from(y)));

        while let Some((px, py)) = queue.pop_front() {
            if !layer.contains(px, py) {
                continue;
            }
            let id = py as usize * self.width + px as usize;
            if self.labels[id].is_some() {
                continue;
            }
            self.labels[id] = Some(region);
            size += 1;

            queue.push_back((px - 1, py));
            queue.push_back((px + 1, py));
            queue.push_back((px, py - 1));
            queue.push_back((px, py + 1));
        }

        self.sizes.push(size);
        region
    }
}

/// Extract every outer boundary and hole of a layer, in raster discovery order.
///
/// Regions with fewer than `path_omit` pixels are dropped together with their holes, and holes
/// enclosing fewer than `path_omit` pixels are dropped on their own.
pub fn scan_contours(layer: &Layer, path_omit: usize) -> Vec<RawPath> {
    let (w, h) = (layer.width(), layer.height());
    let mut grid = EdgeGrid::new(layer);
    let mut regions = RegionLabels::new(layer);
    let mut paths = Vec::new();

    for y in 0..=h {
        for x in 0..w {
            let (xi, yi) = (i64::from(x), i64::from(y));
            let below = layer.contains(xi, yi);
            let above = layer.contains(xi, yi - 1);
            if below == above {
                continue;
            }
            let edge = EdgeId::Horizontal(y as usize * w as usize + x as usize);
            if grid.is_visited(edge) {
                continue;
            }

            if below {
                // First unvisited top edge: the outer boundary of a new region
                debug_assert!(regions.label(x, y).is_none());
                let region = regions.fill(layer, x, y);
                let steps = grid.trace(GridPoint::new(x, y), Direction::East);
                let path = RawPath::new(GridPoint::new(x, y), steps, region);
                debug_assert_eq!(path.kind(), ContourKind::Outer);
                if regions.size(region) >= path_omit {
                    paths.push(path);
                }
            } else {
                // First unvisited bottom edge: a hole in the region above
                let Some(region) = regions.label(x, y - 1) else {
                    unreachable!("hole below unlabelled pixel ({x}, {})", y - 1);
                };
                let steps = grid.trace(GridPoint::new(x + 1, y), Direction::West);
                let path = RawPath::new(GridPoint::new(x + 1, y), steps, region);
                debug_assert_eq!(path.kind(), ContourKind::Hole);
                if regions.size(region) >= path_omit && path.area() >= path_omit as u64 {
                    paths.push(path);
                }
            }
        }
    }

    log::debug!(
        "layer {}: {} regions, {} contours kept",
        layer.palette_index(),
        regions.sizes.len(),
        paths.len()
    );
    paths
}
