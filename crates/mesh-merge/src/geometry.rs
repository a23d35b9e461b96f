//! Planar curve utilities used to build bridging geometry.
//!
//! Curves are polylines stored as `Vec<Point2<f64>>`. None of the functions
//! here allocate more than the curve they return.

use nalgebra::Point2;
use tracing::trace;

/// Default tolerance for the parallel-line test in [`intersect`].
pub const PARALLEL_TOLERANCE: f64 = 1e-10;

/// Outcome of intersecting two infinite lines.
///
/// The point is never clamped to either segment. The variant records how
/// it was obtained so callers can tell exact results from approximations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// Lines meet within both segments' parameter range `[0, 1]`.
    Exact(Point2<f64>),
    /// Lines meet outside at least one segment. `t` is the parameter along
    /// `p1 -> p2`, `u` along `q1 -> q2`.
    OutOfRange { point: Point2<f64>, t: f64, u: f64 },
    /// Lines are parallel or degenerate; the point is the midpoint of `p1, p2`.
    Fallback(Point2<f64>),
}

impl Intersection {
    /// The intersection point, whatever its kind.
    #[inline]
    pub fn point(&self) -> Point2<f64> {
        match *self {
            Intersection::Exact(p) => p,
            Intersection::OutOfRange { point, .. } => point,
            Intersection::Fallback(p) => p,
        }
    }

    /// True for the parallel-line midpoint approximation.
    #[inline]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Intersection::Fallback(_))
    }

    /// Short label used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Intersection::Exact(_) => "exact",
            Intersection::OutOfRange { .. } => "out_of_range",
            Intersection::Fallback(_) => "fallback",
        }
    }
}

/// Resample a polyline to exactly `n` points.
///
/// The curve is parametrized by point index, not arc length: sample `k` sits
/// at fractional index `k * (len - 1) / (n - 1)` and each coordinate is
/// linearly interpolated between the neighbouring input points.
///
/// A single-point curve yields `n` copies of that point and an empty curve
/// yields an empty result.
pub fn resample(curve: &[Point2<f64>], n: usize) -> Vec<Point2<f64>> {
    let m = curve.len();
    if m == 0 || n == 0 {
        return Vec::new();
    }
    if m == 1 || n == 1 {
        return vec![curve[0]; n];
    }

    let last = (m - 1) as f64;
    (0..n)
        .map(|k| {
            let s = k as f64 / (n - 1) as f64 * last;
            let i = (s.floor() as usize).min(m - 2);
            let frac = s - i as f64;
            let (a, b) = (curve[i], curve[i + 1]);
            Point2::new(a.x + (b.x - a.x) * frac, a.y + (b.y - a.y) * frac)
        })
        .collect()
}

/// Intersect the infinite line through `p1, p2` with the one through `q1, q2`.
///
/// When the 2D cross product of the two directions is below `tol` in
/// magnitude the lines are treated as parallel and the midpoint of `p1, p2`
/// is returned as [`Intersection::Fallback`].
pub fn intersect(
    p1: Point2<f64>,
    p2: Point2<f64>,
    q1: Point2<f64>,
    q2: Point2<f64>,
    tol: f64,
) -> Intersection {
    let r = p2 - p1;
    let s = q2 - q1;
    let r_cross_s = r.x * s.y - r.y * s.x;

    if r_cross_s.abs() < tol {
        trace!(cross = r_cross_s, "Parallel lines, using midpoint");
        return Intersection::Fallback(Point2::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0));
    }

    let qp = q1 - p1;
    let t = (qp.x * s.y - qp.y * s.x) / r_cross_s;
    let u = (qp.x * r.y - qp.y * r.x) / r_cross_s;
    let point = p1 + r * t;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Intersection::Exact(point)
    } else {
        Intersection::OutOfRange { point, t, u }
    }
}

/// Reorder a point set along its longest extent.
///
/// Finds the two mutually most distant points (first pair in row-major
/// order on ties), then sorts every point by its scalar projection onto the
/// direction between them. Runs in O(n²).
pub fn normalize(curve: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if curve.len() < 2 {
        return curve.to_vec();
    }

    let mut best = (0usize, 0usize);
    let mut best_dist = -1.0;
    for (i, a) in curve.iter().enumerate() {
        for (j, b) in curve.iter().enumerate() {
            let d = (b - a).norm_squared();
            if d > best_dist {
                best_dist = d;
                best = (i, j);
            }
        }
    }

    let start = curve[best.0];
    let direction = curve[best.1] - start;

    let mut keyed: Vec<(f64, Point2<f64>)> = curve
        .iter()
        .map(|p| ((p - start).dot(&direction), *p))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, p)| p).collect()
}

/// Mean length of the segments of a polyline, or `None` with fewer than
/// two points.
pub fn mean_segment_length(curve: &[Point2<f64>]) -> Option<f64> {
    if curve.len() < 2 {
        return None;
    }
    let total: f64 = curve.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    Some(total / (curve.len() - 1) as f64)
}

/// Normalize both curves and orient the second so its start faces the
/// first curve's start.
///
/// The second curve is reversed when that lowers the sum of the
/// start-to-start and end-to-end distances.
pub fn align_curves(
    b1: &[Point2<f64>],
    b2: &[Point2<f64>],
) -> (Vec<Point2<f64>>, Vec<Point2<f64>>) {
    let first = normalize(b1);
    let mut second = normalize(b2);

    if let (Some(f0), Some(f1), Some(s0), Some(s1)) =
        (first.first(), first.last(), second.first(), second.last())
    {
        let same = (s0 - f0).norm() + (s1 - f1).norm();
        let reversed = (s1 - f0).norm() + (s0 - f1).norm();
        if reversed < same {
            second.reverse();
        }
    }

    (first, second)
}
