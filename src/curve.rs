//! Tolerance-bounded line and quadratic fitting over internode polygons.

use crate::geom::Point;
use crate::interpolate::InternodePath;

/// Longest run of internodes a single segment may cover.
pub const MAX_SPAN: usize = 256;
/// Consecutive misfitting spans after which longer spans from the same point are not tried.
pub const MAX_MISSES: usize = 8;

/// A piece of a closed outline in grid or viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line { from: Point, to: Point },
    Quad { from: Point, control: Point, to: Point },
}

impl Segment {
    pub fn start(&self) -> Point {
        match *self {
            Segment::Line { from, .. } | Segment::Quad { from, .. } => from,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Segment::Line { to, .. } | Segment::Quad { to, .. } => to,
        }
    }

    /// Apply `f` to every point of the segment.
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Segment {
        match *self {
            Segment::Line { from, to } => Segment::Line {
                from: f(from),
                to: f(to),
            },
            Segment::Quad { from, control, to } => Segment::Quad {
                from: f(from),
                control: f(control),
                to: f(to),
            },
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Segment::Line { .. })
    }
}

/// Fit the closed internode polygon with as few segments as the tolerances allow.
///
/// The outline starts and ends at the path's first point. Lines are preferred over curves when
/// both fit a span.
pub fn fit_segments(path: &InternodePath, line_tolerance: f64, quad_tolerance: f64) -> Vec<Segment> {
    let mut points: Vec<Point> = path.points().iter().map(|p| p.to_point()).collect();
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    points.push(points[0]);

    let fitter = SpanFitter {
        points: &points,
        line_tolerance,
        quad_tolerance,
    };

    // Fewest segments reaching each point, with the earliest predecessor achieving it
    let mut best: Vec<Option<(usize, usize)>> = vec![None; n + 1];
    best[0] = Some((0, 0));
    for i in 0..n {
        let Some((count, _)) = best[i] else {
            continue;
        };
        for j in fitter.span_ends(i) {
            if best[j].is_none_or(|(known, _)| count + 1 < known) {
                best[j] = Some((count + 1, i));
            }
        }
    }

    let mut cuts = vec![n];
    let mut at = n;
    while at > 0 {
        let Some((_, prev)) = best[at] else {
            unreachable!("point {at} of the outline is unreachable");
        };
        cuts.push(prev);
        at = prev;
    }
    cuts.reverse();

    cuts.windows(2)
        .map(|w| fitter.segment(w[0], w[1]))
        .collect()
}

struct SpanFitter<'a> {
    /// Polygon points with the first one repeated at the end.
    points: &'a [Point],
    line_tolerance: f64,
    quad_tolerance: f64,
}

impl SpanFitter<'_> {
    fn last(&self) -> usize {
        self.points.len() - 1
    }

    /// Every point a single segment starting at `i` can end on.
    ///
    /// Spans stop at the closing point, never cover the whole loop and stay under `MAX_SPAN`.
    /// The search gives up after `MAX_MISSES` misfits in a row.
    fn span_ends(&self, i: usize) -> Vec<usize> {
        let n = self.last();
        let limit = n.min(i + MAX_SPAN).min(i + n - 1);
        let mut ends = vec![i + 1];
        let mut misses = 0;
        for j in i + 2..=limit {
            if self.line_fits(i, j) || self.quad_control(i, j).is_some() {
                ends.push(j);
                misses = 0;
            } else {
                misses += 1;
                if misses == MAX_MISSES {
                    break;
                }
            }
        }
        ends
    }

    fn line_fits(&self, i: usize, j: usize) -> bool {
        let (a, b) = (self.points[i], self.points[j]);
        self.points[i + 1..j]
            .iter()
            .all(|p| p.distance_to_segment(a, b) <= self.line_tolerance)
    }

    /// Least-squares control point for the span, if the curve stays within tolerance.
    fn quad_control(&self, i: usize, j: usize) -> Option<Point> {
        if j - i < 3 {
            return None;
        }
        let span = &self.points[i..=j];
        let mut lengths = Vec::with_capacity(span.len());
        let mut total = 0.0;
        lengths.push(0.0);
        for pair in span.windows(2) {
            total += pair[0].distance(pair[1]);
            lengths.push(total);
        }
        if total == 0.0 {
            return None;
        }

        let (start, end) = (span[0], span[span.len() - 1]);
        // Skipped points with their chord-length parameters
        let inner: Vec<(Point, f64)> = span
            .iter()
            .zip(&lengths)
            .skip(1)
            .take(span.len() - 2)
            .map(|(&p, &d)| (p, d / total))
            .collect();

        let (mut sx, mut sy, mut norm) = (0.0, 0.0, 0.0);
        for &(p, t) in &inner {
            let (b0, b1, b2) = bernstein(t);
            sx += b1 * (p.x - b0 * start.x - b2 * end.x);
            sy += b1 * (p.y - b0 * start.y - b2 * end.y);
            norm += b1 * b1;
        }
        let control = Point::new(sx / norm, sy / norm);

        inner
            .iter()
            .all(|&(p, t)| {
                let (b0, b1, b2) = bernstein(t);
                let curve = Point::new(
                    b0 * start.x + b1 * control.x + b2 * end.x,
                    b0 * start.y + b1 * control.y + b2 * end.y,
                );
                curve.distance(p) <= self.quad_tolerance
            })
            .then_some(control)
    }

    fn segment(&self, i: usize, j: usize) -> Segment {
        let (from, to) = (self.points[i], self.points[j]);
        if self.line_fits(i, j) {
            return Segment::Line { from, to };
        }
        match self.quad_control(i, j) {
            Some(control) => Segment::Quad { from, control, to },
            None => unreachable!("committed span {i}..{j} fits neither a line nor a curve"),
        }
    }
}

fn bernstein(t: f64) -> (f64, f64, f64) {
    let u = 1.0 - t;
    (u * u, 2.0 * t * u, t * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::scan_contours;
    use crate::interpolate::interpolate;
    use crate::layer::Layer;

    fn internodes(w: u32, h: u32, set: impl Fn(u32, u32) -> bool) -> Vec<InternodePath> {
        let mask = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .map(|(x, y)| set(x, y))
            .collect();
        let layer = Layer::from_mask(0, w, h, mask);
        scan_contours(&layer, 0).iter().map(interpolate).collect()
    }

    fn assert_closed(path: &InternodePath, segments: &[Segment]) {
        assert_eq!(segments[0].start(), path.start().to_point());
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        assert_eq!(segments[segments.len() - 1].end(), segments[0].start());
    }

    mod fit_segments {
        use super::*;

        mod unit {
            use super::*;

            #[test]
            fn square_is_four_lines() {
                let paths = internodes(4, 4, |_, _| true);
                let segments = fit_segments(&paths[0], 1.0, 1.0);
                assert_eq!(segments.len(), 4);
                assert!(segments.iter().all(Segment::is_line));
                assert_closed(&paths[0], &segments);
            }

            #[test]
            fn tall_rectangle_is_four_lines() {
                let paths = internodes(5, 10, |_, _| true);
                let segments = fit_segments(&paths[0], 1.0, 1.0);
                assert_eq!(segments.len(), 4);
                assert!(segments.iter().all(Segment::is_line));
                assert_eq!(segments[1].end(), Point::new(5.0, 10.0));
            }

            #[test]
            fn staircase_collapses_to_a_diagonal() {
                let paths = internodes(8, 8, |x, y| x <= y);
                let segments = fit_segments(&paths[0], 1.0, 1.0);
                assert!(segments.len() < paths[0].points().len());
                assert_closed(&paths[0], &segments);
            }

            #[test]
            fn zero_tolerance_keeps_every_internode() {
                let paths = internodes(2, 2, |x, y| !(x == 1 && y == 0));
                let segments = fit_segments(&paths[0], 0.0, 0.0);
                assert_eq!(segments.len(), paths[0].points().len());
                assert!(segments.iter().all(Segment::is_line));
            }

            #[test]
            fn round_blob_uses_curves() {
                let paths = internodes(16, 16, |x, y| {
                    let (dx, dy) = (x as f64 - 7.5, y as f64 - 7.5);
                    dx * dx + dy * dy <= 49.0
                });
                // Three corners in a row are never collinear, so any longer span is a curve
                let segments = fit_segments(&paths[0], 0.0, 3.0);
                assert!(segments.len() < paths[0].points().len());
                assert!(segments.iter().any(|s| !s.is_line()));
                assert_closed(&paths[0], &segments);
            }
        }

        mod prop {
            use super::*;
            use proptest::prelude::*;

            proptest! {
                /// fit_segments: higher tolerances never produce more segments
                #[test]
                fn tolerance_monotonicity(
                    w in 1u32..10,
                    h in 1u32..10,
                    bits in proptest::collection::vec(proptest::bool::ANY, 100),
                    low in (0.0f64..2.0, 0.0f64..2.0),
                    extra in (0.0f64..2.0, 0.0f64..2.0)
                ) {
                    let paths = internodes(w, h, |x, y| bits[(y * 10 + x) as usize]);
                    for path in &paths {
                        let tight = fit_segments(path, low.0, low.1);
                        let loose = fit_segments(path, low.0 + extra.0, low.1 + extra.1);
                        prop_assert!(loose.len() <= tight.len());
                    }
                }

                /// fit_segments: a curve that fits skips corners even when no line can
                #[test]
                fn curves_fit_below_corner_distance(
                    radius in 3.0f64..8.0,
                    center in (7.0f64..9.0, 7.0f64..9.0),
                    line_tolerance in 0.0f64..0.7,
                    quad_tolerance in 0.1f64..4.0
                ) {
                    let paths = internodes(18, 18, |x, y| {
                        let (dx, dy) = (x as f64 + 0.5 - center.0, y as f64 + 0.5 - center.1);
                        dx * dx + dy * dy <= radius * radius
                    });
                    for path in &paths {
                        let mut points: Vec<Point> =
                            path.points().iter().map(|p| p.to_point()).collect();
                        let n = points.len();
                        points.push(points[0]);
                        let fitter = SpanFitter {
                            points: &points,
                            line_tolerance,
                            quad_tolerance,
                        };
                        let curve_fits =
                            n >= 4 && (0..=n - 3).any(|i| fitter.quad_control(i, i + 3).is_some());

                        let segments = fit_segments(path, line_tolerance, quad_tolerance);
                        if curve_fits {
                            prop_assert!(segments.len() < n);
                        }
                        if line_tolerance == 0.0 && segments.len() < n {
                            prop_assert!(segments.iter().any(|s| !s.is_line()));
                        }
                    }
                }

                /// fit_segments: segments chain end to start and close the outline
                #[test]
                fn outline_is_closed(
                    w in 1u32..10,
                    h in 1u32..10,
                    bits in proptest::collection::vec(proptest::bool::ANY, 100),
                    tolerance in 0.0f64..3.0
                ) {
                    let paths = internodes(w, h, |x, y| bits[(y * 10 + x) as usize]);
                    for path in &paths {
                        let segments = fit_segments(path, tolerance, tolerance);
                        prop_assert!(!segments.is_empty());
                        prop_assert_eq!(segments[0].start(), path.start().to_point());
                        for pair in segments.windows(2) {
                            prop_assert_eq!(pair[0].end(), pair[1].start());
                        }
                    }
                }
            }
        }
    }
}
