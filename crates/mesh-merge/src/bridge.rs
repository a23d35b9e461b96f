//! Bridging geometry between two boundary curves.
//!
//! The bridge is a planar straight-line graph (PSLG): both boundary curves
//! as constrained chains, guide-curve points blended between them, and two
//! end caps that close the strip. The PSLG is handed to a constrained
//! triangulator and never stored.

use nalgebra::Point2;
use tracing::{debug, warn};

use crate::error::{MeshError, MeshResult};
use crate::geometry::{
    Intersection, PARALLEL_TOLERANCE, intersect, mean_segment_length, resample,
};

/// Planar straight-line graph: vertices plus segments that a conforming
/// triangulation must keep as edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pslg {
    /// Vertex positions, unique within `tolerance`.
    pub vertices: Vec<Point2<f64>>,
    /// Vertex index pairs.
    pub segments: Vec<(u32, u32)>,
    tolerance: f64,
}

impl Pslg {
    /// Create an empty PSLG that merges vertices closer than `tolerance`
    /// in both coordinates.
    pub fn new(tolerance: f64) -> Self {
        Self {
            vertices: Vec::new(),
            segments: Vec::new(),
            tolerance,
        }
    }

    /// Vertex merge tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Add a vertex, or return the index of an existing one within tolerance.
    ///
    /// Linear scan: bridge graphs hold boundary chains, not whole meshes.
    pub fn add_point(&mut self, p: Point2<f64>) -> u32 {
        let tol = self.tolerance;
        if let Some(i) = self
            .vertices
            .iter()
            .position(|q| (q.x - p.x).abs() < tol && (q.y - p.y).abs() < tol)
        {
            return i as u32;
        }
        self.vertices.push(p);
        (self.vertices.len() - 1) as u32
    }

    /// Add a segment. Zero-length and repeated segments are skipped; returns
    /// whether the segment was added.
    pub fn add_segment(&mut self, a: u32, b: u32) -> bool {
        if a == b
            || self
                .segments
                .iter()
                .any(|&(s, t)| (s == a && t == b) || (s == b && t == a))
        {
            return false;
        }
        self.segments.push((a, b));
        true
    }

    /// Add a polyline as consecutive constrained segments.
    pub fn add_chain(&mut self, curve: &[Point2<f64>]) -> Vec<u32> {
        let ids: Vec<u32> = curve.iter().map(|&p| self.add_point(p)).collect();
        for w in ids.windows(2) {
            self.add_segment(w[0], w[1]);
        }
        ids
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// Connector vertices found for one guide curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideConnectors {
    /// Where the guide line meets the start cap `L1[0] - L2[0]`.
    pub start: Intersection,
    /// Where the guide line meets the end cap `L1[last] - L2[last]`.
    pub end: Intersection,
}

/// A bridge ready for triangulation.
#[derive(Debug, Clone)]
pub struct BridgeGeometry {
    /// The constrained graph.
    pub pslg: Pslg,
    /// Guide curves in order from `L1` towards `L2`.
    pub guides: Vec<Vec<Point2<f64>>>,
    /// Cap connectors, one entry per guide curve.
    pub connectors: Vec<GuideConnectors>,
}

impl BridgeGeometry {
    /// Number of cap connectors that fell back to a midpoint.
    pub fn fallback_count(&self) -> usize {
        self.connectors
            .iter()
            .map(|c| c.start.is_fallback() as usize + c.end.is_fallback() as usize)
            .sum()
    }
}

fn mean_lengths(l1: &[Point2<f64>], l2: &[Point2<f64>]) -> MeshResult<(f64, f64)> {
    for (name, curve) in [("first", l1), ("second", l2)] {
        if curve.len() < 2 {
            return Err(MeshError::degenerate_boundary(format!(
                "{} curve has {} point(s), at least 2 are needed",
                name,
                curve.len()
            )));
        }
    }

    let (Some(s1), Some(s2)) = (mean_segment_length(l1), mean_segment_length(l2)) else {
        return Err(MeshError::degenerate_boundary("curve too short"));
    };
    let total = s1 + s2;
    if !total.is_finite() || total <= 0.0 {
        return Err(MeshError::degenerate_boundary(format!(
            "curves have zero or non-finite length (mean segment lengths {} and {})",
            s1, s2
        )));
    }
    Ok((s1, s2))
}

/// Build `k` guide curves blended between `l1` and `l2`.
///
/// Both curves are resampled to `max(|l1|, |l2|)` points. Guide `i`
/// (`1..=k`) blends them with weight `t_i = d_i / (s1 + s2)`, where
/// `d_i` steps linearly from `s1` to `s2` over `k + 2` values and
/// `s1`, `s2` are the mean segment lengths. Each guide is then resampled to
/// `max(2, round(|l1| + i / (k + 1) * (|l2| - |l1|)))` points, so point
/// density shifts gradually from one curve's resolution to the other's.
pub fn guide_curves(
    l1: &[Point2<f64>],
    l2: &[Point2<f64>],
    k: usize,
) -> MeshResult<Vec<Vec<Point2<f64>>>> {
    let (s1, s2) = mean_lengths(l1, l2)?;
    let n = l1.len().max(l2.len());
    let r1 = resample(l1, n);
    let r2 = resample(l2, n);
    let steps = (k + 1) as f64;
    let (len1, len2) = (l1.len() as f64, l2.len() as f64);

    let guides = (1..=k)
        .map(|i| {
            let frac = i as f64 / steps;
            let t = (s1 + (s2 - s1) * frac) / (s1 + s2);
            let blended: Vec<Point2<f64>> = r1
                .iter()
                .zip(&r2)
                .map(|(a, b)| Point2::new((1.0 - t) * a.x + t * b.x, (1.0 - t) * a.y + t * b.y))
                .collect();
            let target = (len1 + frac * (len2 - len1)).round_ties_even().max(2.0) as usize;
            resample(&blended, target)
        })
        .collect();

    Ok(guides)
}

/// Build the bridging PSLG between two ordered boundary curves.
///
/// `l1` and `l2` must run in the same direction: `l1[0]` faces `l2[0]`.
/// Vertices are inserted in this order: `l1` as a chain, `l2` as a chain,
/// then for each guide curve its points followed by the cap connectors.
/// Each cap adds the segments `L1-end -> connector` and `connector -> L2-end`.
pub fn build_bridge(
    l1: &[Point2<f64>],
    l2: &[Point2<f64>],
    guide_count: usize,
    tolerance: f64,
) -> MeshResult<BridgeGeometry> {
    let guides = guide_curves(l1, l2, guide_count)?;
    let (l1_start, l1_end) = (l1[0], l1[l1.len() - 1]);
    let (l2_start, l2_end) = (l2[0], l2[l2.len() - 1]);

    let mut pslg = Pslg::new(tolerance);
    pslg.add_chain(l1);
    pslg.add_chain(l2);

    let mut connectors = Vec::with_capacity(guides.len());
    for guide in &guides {
        for &p in guide {
            pslg.add_point(p);
        }

        let (g_start, g_end) = (guide[0], guide[guide.len() - 1]);
        let start = intersect(g_start, g_end, l1_start, l2_start, PARALLEL_TOLERANCE);
        let end = intersect(g_start, g_end, l1_end, l2_end, PARALLEL_TOLERANCE);

        for (cap, hit, a, b) in [("start", start, l1_start, l2_start), ("end", end, l1_end, l2_end)] {
            if hit.is_fallback() {
                warn!(cap, "Guide curve parallel to bridge cap, using midpoint connector");
            }
            let ia = pslg.add_point(a);
            let ic = pslg.add_point(hit.point());
            let ib = pslg.add_point(b);
            pslg.add_segment(ia, ic);
            pslg.add_segment(ic, ib);
        }

        connectors.push(GuideConnectors { start, end });
    }

    debug!(
        first = l1.len(),
        second = l2.len(),
        guides = guides.len(),
        vertices = pslg.vertex_count(),
        segments = pslg.segment_count(),
        "Built bridge PSLG"
    );

    Ok(BridgeGeometry {
        pslg,
        guides,
        connectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_pslg_dedups_within_tolerance() {
        let mut pslg = Pslg::new(1e-8);
        let a = pslg.add_point(p(0.0, 0.0));
        let b = pslg.add_point(p(5e-9, -5e-9));
        let c = pslg.add_point(p(2e-8, 0.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(pslg.vertex_count(), 2);
    }

    #[test]
    fn test_pslg_skips_degenerate_segments() {
        let mut pslg = Pslg::new(1e-8);
        pslg.add_chain(&[p(0.0, 0.0), p(0.0, 0.0), p(1.0, 0.0)]);
        assert!(!pslg.add_segment(1, 0));
        assert_eq!(pslg.segments, vec![(0, 1)]);
    }

    #[test]
    fn test_single_guide_between_parallel_lines() {
        let l1 = vec![p(1.0, 0.0), p(1.0, 1.0)];
        let l2 = vec![p(2.0, 0.0), p(2.0, 1.0)];
        let guides = guide_curves(&l1, &l2, 1).unwrap();
        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].len(), 2);
        assert_relative_eq!(guides[0][0].x, 1.5);
        assert_relative_eq!(guides[0][1].y, 1.0);
    }

    #[test]
    fn test_guide_density_interpolates() {
        let l1: Vec<_> = (0..3).map(|i| p(0.0, i as f64)).collect();
        let l2: Vec<_> = (0..7).map(|i| p(4.0, i as f64 / 3.0)).collect();
        let guides = guide_curves(&l1, &l2, 3).unwrap();
        let sizes: Vec<usize> = guides.iter().map(Vec::len).collect();
        // round(3 + i/4 * 4) for i = 1..=3
        assert_eq!(sizes, vec![4, 5, 6]);
    }

    #[test]
    fn test_guide_weight_follows_spacing() {
        // Coarse first curve: guide sits nearer the second curve
        let l1 = vec![p(0.0, 0.0), p(0.0, 3.0)];
        let l2: Vec<_> = (0..4).map(|i| p(1.0, i as f64)).collect();
        let guides = guide_curves(&l1, &l2, 1).unwrap();
        // s1 = 3, s2 = 1, d_1 = 2, t = 0.5
        assert_relative_eq!(guides[0][0].x, 0.5);
    }

    #[test]
    fn test_build_bridge_square_strip() {
        let l1 = vec![p(1.0, 0.0), p(1.0, 1.0)];
        let l2 = vec![p(2.0, 0.0), p(2.0, 1.0)];
        let bridge = build_bridge(&l1, &l2, 1, 1e-8).unwrap();

        // Guide endpoints coincide with the cap connectors
        assert_eq!(bridge.pslg.vertex_count(), 6);
        assert_eq!(bridge.pslg.segment_count(), 6);
        assert!(matches!(bridge.connectors[0].start, Intersection::Exact(_)));
        assert_eq!(bridge.fallback_count(), 0);
    }

    #[test]
    fn test_build_bridge_rejects_short_curves() {
        let err = build_bridge(&[p(0.0, 0.0)], &[p(1.0, 0.0), p(1.0, 1.0)], 1, 1e-8).unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::DegenerateBoundary);

        let collapsed = vec![p(0.0, 0.0), p(0.0, 0.0)];
        assert!(build_bridge(&collapsed, &collapsed, 1, 1e-8).is_err());
    }
}
