use crate::contour::{ContourKind, Direction, RawPath};
use crate::geom::GridPoint;

/// A closed contour reduced to the corners where its direction changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternodePath {
    points: Vec<GridPoint>,
    kind: ContourKind,
    region: usize,
}

impl InternodePath {
    /// Direction-change corners in walk order. The path closes back to the first one.
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn kind(&self) -> ContourKind {
        self.kind
    }

    pub fn region(&self) -> usize {
        self.region
    }

    pub fn start(&self) -> GridPoint {
        self.points[0]
    }

    /// Re-walk every internode edge as unit steps.
    pub fn unit_steps(&self) -> Vec<Direction> {
        let n = self.points.len();
        let mut steps = Vec::new();
        for i in 0..n {
            let (from, to) = (self.points[i], self.points[(i + 1) % n]);
            let (dir, len) = if from.y == to.y {
                if to.x > from.x {
                    (Direction::East, to.x - from.x)
                } else {
                    (Direction::West, from.x - to.x)
                }
            } else if to.y > from.y {
                (Direction::South, to.y - from.y)
            } else {
                (Direction::North, from.y - to.y)
            };
            steps.extend(std::iter::repeat_n(dir, len as usize));
        }
        steps
    }
}

/// Collapse runs of collinear unit steps into single edges.
pub fn interpolate(path: &RawPath) -> InternodePath {
    let steps = path.steps();
    let n = steps.len();
    let points = path
        .points()
        .into_iter()
        .enumerate()
        .filter(|&(i, _)| steps[i] != steps[(i + n - 1) % n])
        .map(|(_, point)| point)
        .collect();

    InternodePath {
        points,
        kind: path.kind(),
        region: path.region(),
    }
}
