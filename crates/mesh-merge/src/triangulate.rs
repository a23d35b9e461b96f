//! Constrained triangulation of bridge graphs.
//!
//! [`ConstrainedTriangulator`] is the seam between the merge driver and the
//! triangulation backend. The default [`SpadeTriangulator`] builds a
//! constrained Delaunay triangulation with the `spade` crate and then
//! removes every triangle reachable from the convex hull without crossing a
//! segment, so only the region enclosed by the segments is kept.

use hashbrown::HashSet;
use nalgebra::Point2;
use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint, Triangulation as _};
use tracing::{debug, trace};

use crate::adjacency::edge_key;
use crate::bridge::Pslg;
use crate::error::{MeshError, MeshResult};

/// Triangles covering the region enclosed by a PSLG's segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    /// Output vertices. May differ in order and count from the input graph.
    pub vertices: Vec<Point2<f64>>,
    /// Counter-clockwise vertex index triples.
    pub triangles: Vec<[u32; 3]>,
}

impl Triangulation {
    /// Number of output vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// A triangulation backend that keeps every input segment as an edge.
pub trait ConstrainedTriangulator {
    /// Triangulate the region enclosed by `pslg`'s segments.
    ///
    /// Malformed graphs (out-of-range, zero-length, repeated or crossing
    /// segments) must fail with [`MeshError::TriangulationFailed`].
    fn triangulate(&self, pslg: &Pslg) -> MeshResult<Triangulation>;
}

/// Check segment indices and reject zero-length or repeated segments.
pub fn check_segments(pslg: &Pslg) -> MeshResult<()> {
    let n = pslg.vertices.len();
    let mut seen: HashSet<(u32, u32)> = HashSet::with_capacity(pslg.segments.len());

    for (i, &(a, b)) in pslg.segments.iter().enumerate() {
        if a as usize >= n || b as usize >= n {
            return Err(MeshError::triangulation_failed(format!(
                "segment {} references vertex {} but the graph has {} vertices",
                i,
                a.max(b),
                n
            )));
        }
        if a == b {
            return Err(MeshError::triangulation_failed(format!(
                "segment {} has zero length (vertex {})",
                i, a
            )));
        }
        if !seen.insert(edge_key(a, b)) {
            return Err(MeshError::triangulation_failed(format!(
                "segment {} repeats edge {}-{}",
                i, a, b
            )));
        }
    }
    Ok(())
}

/// Constrained Delaunay triangulation backed by `spade`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpadeTriangulator;

impl SpadeTriangulator {
    /// Create the default triangulator.
    pub fn new() -> Self {
        Self
    }
}

impl ConstrainedTriangulator for SpadeTriangulator {
    fn triangulate(&self, pslg: &Pslg) -> MeshResult<Triangulation> {
        check_segments(pslg)?;

        let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint<f64>>::new();
        let mut handles = Vec::with_capacity(pslg.vertices.len());
        for (i, p) in pslg.vertices.iter().enumerate() {
            let handle = cdt.insert(SpadePoint::new(p.x, p.y)).map_err(|e| {
                MeshError::triangulation_failed(format!(
                    "cannot insert vertex {} ({}, {}): {:?}",
                    i, p.x, p.y, e
                ))
            })?;
            handles.push(handle);
        }

        for &(a, b) in &pslg.segments {
            let (from, to) = (handles[a as usize], handles[b as usize]);
            if from == to {
                return Err(MeshError::triangulation_failed(format!(
                    "segment {}-{} collapses to one vertex",
                    a, b
                )));
            }
            if !cdt.can_add_constraint(from, to) {
                return Err(MeshError::triangulation_failed(format!(
                    "segment {}-{} crosses another segment",
                    a, b
                )));
            }
            cdt.add_constraint(from, to);
        }

        // Flood from hull triangles across unconstrained edges
        let mut removed = vec![false; cdt.num_all_faces()];
        let mut stack = Vec::new();
        for face in cdt.inner_faces() {
            let on_hull = face.adjacent_edges().iter().any(|edge| {
                edge.rev().face().is_outer() && !cdt.is_constraint_edge(edge.as_undirected().fix())
            });
            if on_hull {
                let idx = face.fix().index();
                if !removed[idx] {
                    removed[idx] = true;
                    stack.push(face.fix());
                }
            }
        }
        while let Some(fixed) = stack.pop() {
            let face = cdt.face(fixed);
            for edge in face.adjacent_edges() {
                if cdt.is_constraint_edge(edge.as_undirected().fix()) {
                    continue;
                }
                if let Some(neighbor) = edge.rev().face().as_inner() {
                    let idx = neighbor.fix().index();
                    if !removed[idx] {
                        removed[idx] = true;
                        stack.push(neighbor.fix());
                    }
                }
            }
        }

        let vertices: Vec<Point2<f64>> = cdt
            .vertices()
            .map(|v| {
                let p = v.position();
                Point2::new(p.x, p.y)
            })
            .collect();

        let triangles: Vec<[u32; 3]> = cdt
            .inner_faces()
            .filter(|face| !removed[face.fix().index()])
            .map(|face| face.vertices().map(|v| v.fix().index() as u32))
            .collect();

        trace!(
            carved = cdt.num_inner_faces() - triangles.len(),
            "Removed triangles outside the segments"
        );
        debug!(
            vertices = vertices.len(),
            triangles = triangles.len(),
            constraints = cdt.num_constraints(),
            "Triangulated bridge"
        );

        Ok(Triangulation {
            vertices,
            triangles,
        })
    }
}
