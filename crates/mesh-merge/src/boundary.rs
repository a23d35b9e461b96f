//! Boundary segment extraction, path ordering and boundary-code recomputation.
//!
//! A segment code (`> 1`) names one open chain of boundary edges. The
//! functions here turn a mesh's coded nodes into ordered node paths that
//! can be bridged, and recompute codes once meshes have been fused.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::adjacency::{MeshAdjacency, edge_key};
use crate::error::{MeshError, MeshResult};
use crate::types::{BoundaryCode, CODE_BOUNDARY, CODE_INTERIOR, Element, Mesh};

/// Boundary edges grouped by segment code, in element traversal order.
pub type BoundaryEdgeSet = HashMap<BoundaryCode, Vec<(u32, u32)>>;

/// Collect the cyclic element edges whose endpoints both carry a segment code.
///
/// Each edge is filed under the code of its **second** endpoint. Both
/// endpoints of a real segment edge are expected to share a code; an edge
/// between two different segment codes lands under the second one.
///
/// Edges referencing nodes outside the mesh are skipped.
pub fn extract_boundary_edges(mesh: &Mesh) -> BoundaryEdgeSet {
    let mut edges: BoundaryEdgeSet = HashMap::new();

    for element in &mesh.elements {
        for (a, b) in element.edges() {
            let (Some(na), Some(nb)) = (mesh.nodes.get(a as usize), mesh.nodes.get(b as usize))
            else {
                continue;
            };
            if na.code <= CODE_BOUNDARY || nb.code <= CODE_BOUNDARY {
                continue;
            }
            edges.entry(nb.code).or_default().push((a, b));
        }
    }

    debug!(
        codes = edges.len(),
        edges = edges.values().map(Vec::len).sum::<usize>(),
        "Extracted boundary edges"
    );
    edges
}

/// Shape of the graph formed by one code's boundary edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryShape {
    /// No usable edges.
    Empty,
    /// A single simple path with two distinct ends.
    OpenChain,
    /// A single cycle; every node has degree two.
    ClosedLoop,
    /// Some node has more than two incident edges.
    Branching { node: u32, degree: usize },
    /// More than one connected component.
    Disconnected { components: usize },
}

impl BoundaryShape {
    /// True for shapes that can be walked as one path.
    pub fn is_walkable(&self) -> bool {
        matches!(self, BoundaryShape::OpenChain | BoundaryShape::ClosedLoop)
    }
}

/// Edge graph of one boundary code, after dropping self-loops and
/// repeated undirected edges.
struct EdgeGraph {
    edges: Vec<(u32, u32)>,
    /// Nodes in first-seen order.
    nodes: Vec<u32>,
    neighbors: HashMap<u32, Vec<u32>>,
}

impl EdgeGraph {
    fn build(edges: &[(u32, u32)]) -> Self {
        let mut seen: HashSet<(u32, u32)> = HashSet::with_capacity(edges.len());
        let mut kept = Vec::with_capacity(edges.len());
        let mut nodes = Vec::new();
        let mut neighbors: HashMap<u32, Vec<u32>> = HashMap::new();

        for &(a, b) in edges {
            if a == b || !seen.insert(edge_key(a, b)) {
                continue;
            }
            kept.push((a, b));
            for (from, to) in [(a, b), (b, a)] {
                let list = neighbors.entry(from).or_insert_with(|| {
                    nodes.push(from);
                    Vec::new()
                });
                list.push(to);
            }
        }

        if kept.len() < edges.len() {
            trace!(
                dropped = edges.len() - kept.len(),
                "Dropped self-loop or repeated boundary edges"
            );
        }

        Self {
            edges: kept,
            nodes,
            neighbors,
        }
    }

    fn degree(&self, node: u32) -> usize {
        self.neighbors.get(&node).map_or(0, Vec::len)
    }

    fn component_count(&self) -> usize {
        let mut visited: HashSet<u32> = HashSet::with_capacity(self.nodes.len());
        let mut components = 0;

        for &root in &self.nodes {
            if !visited.insert(root) {
                continue;
            }
            components += 1;
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                for &next in &self.neighbors[&node] {
                    if visited.insert(next) {
                        stack.push(next);
                    }
                }
            }
        }

        components
    }

    fn shape(&self) -> BoundaryShape {
        if self.edges.is_empty() {
            return BoundaryShape::Empty;
        }

        if let Some(&node) = self.nodes.iter().find(|&&n| self.degree(n) > 2) {
            return BoundaryShape::Branching {
                node,
                degree: self.degree(node),
            };
        }

        let components = self.component_count();
        if components > 1 {
            return BoundaryShape::Disconnected { components };
        }

        if self.nodes.iter().all(|&n| self.degree(n) == 2) {
            BoundaryShape::ClosedLoop
        } else {
            BoundaryShape::OpenChain
        }
    }
}

/// Classify one code's boundary edges before walking them.
pub fn classify_edges(edges: &[(u32, u32)]) -> BoundaryShape {
    EdgeGraph::build(edges).shape()
}

/// Order one code's boundary edges into a node path.
///
/// The edges must form one open chain or one closed loop; anything else
/// fails with [`MeshError::MalformedBoundary`] instead of returning a
/// truncated path.
///
/// An open chain of `n` edges yields `n + 1` nodes from one end to the
/// other. The walk starts at the end that appears as a first endpoint but
/// never as a second one, falling back to the first end seen. A closed loop
/// of `n` edges starts at the first edge's first node and also yields
/// `n + 1` nodes, ending where it began.
pub fn order_edges_strict(edges: &[(u32, u32)]) -> MeshResult<Vec<u32>> {
    let graph = EdgeGraph::build(edges);

    let start = match graph.shape() {
        BoundaryShape::OpenChain => {
            let seconds: HashSet<u32> = graph.edges.iter().map(|&(_, b)| b).collect();
            let ends: Vec<u32> = graph
                .nodes
                .iter()
                .copied()
                .filter(|&n| graph.degree(n) == 1)
                .collect();
            ends.iter()
                .copied()
                .find(|n| !seconds.contains(n))
                .unwrap_or(ends[0])
        }
        BoundaryShape::ClosedLoop => graph.edges[0].0,
        BoundaryShape::Empty => {
            return Err(MeshError::malformed_boundary("no boundary edges to order"));
        }
        BoundaryShape::Branching { node, degree } => {
            return Err(MeshError::malformed_boundary(format!(
                "boundary branches at node {} ({} incident edges)",
                node, degree
            )));
        }
        BoundaryShape::Disconnected { components } => {
            return Err(MeshError::malformed_boundary(format!(
                "boundary splits into {} disconnected pieces",
                components
            )));
        }
    };

    let mut used: HashSet<(u32, u32)> = HashSet::with_capacity(graph.edges.len());
    let mut path = Vec::with_capacity(graph.edges.len() + 1);
    path.push(start);
    let mut current = start;

    loop {
        let next = graph.neighbors[&current]
            .iter()
            .copied()
            .find(|&n| !used.contains(&edge_key(current, n)));
        let Some(next) = next else {
            break;
        };
        used.insert(edge_key(current, next));
        path.push(next);
        current = next;
    }

    trace!(start, nodes = path.len(), "Ordered boundary path");
    Ok(path)
}

/// Extract and order the boundary path carrying `code`.
pub fn boundary_path(edges: &BoundaryEdgeSet, code: BoundaryCode) -> MeshResult<Vec<u32>> {
    let list = edges.get(&code).map(Vec::as_slice).unwrap_or(&[]);
    if list.is_empty() {
        return Err(MeshError::malformed_boundary(
            "no element edge joins two nodes with this code",
        )
        .for_code(code));
    }
    order_edges_strict(list).map_err(|e| e.for_code(code))
}

/// Recompute boundary codes from topology alone.
///
/// Every node touching an edge used by exactly one element gets code `1`,
/// every other node gets code `0`. Segment identities are not preserved.
pub fn recompute_boundary_codes(node_count: usize, elements: &[Element]) -> Vec<BoundaryCode> {
    MeshAdjacency::build(elements)
        .boundary_node_mask(node_count)
        .into_iter()
        .map(|on_boundary| {
            if on_boundary {
                CODE_BOUNDARY
            } else {
                CODE_INTERIOR
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(codes: &[BoundaryCode]) -> Mesh {
        // 2 x 1 quads: nodes 0..3 bottom row, 3..6 top row
        let coords: Vec<[f64; 3]> = (0..2)
            .flat_map(|j| (0..3).map(move |i| [i as f64, j as f64, 0.0]))
            .collect();
        Mesh::from_arrays(&coords, &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]], codes).unwrap()
    }

    #[test]
    fn test_extract_buckets_by_second_endpoint() {
        let mesh = strip(&[2, 2, 2, 0, 0, 3]);
        let edges = extract_boundary_edges(&mesh);
        assert_eq!(edges.get(&2), Some(&vec![(0, 1), (1, 2)]));
        // (2, 5): code 2 then code 3, filed under 3
        assert_eq!(edges.get(&3), Some(&vec![(2, 5)]));
    }

    #[test]
    fn test_extract_ignores_codes_one_and_below() {
        let mesh = strip(&[1, 1, 1, 0, 0, 0]);
        assert!(extract_boundary_edges(&mesh).is_empty());
    }

    #[test]
    fn test_order_open_chain_any_orientation() {
        // Chain 10 - 11 - 12 - 13 with mixed edge directions
        let edges = vec![(12, 11), (12, 13), (10, 11)];
        let path = order_edges_strict(&edges).unwrap();
        assert_eq!(path.len(), 4);
        assert!(path == vec![10, 11, 12, 13] || path == vec![13, 12, 11, 10]);
    }

    #[test]
    fn test_order_open_chain_prefers_first_only_end() {
        let edges = vec![(0, 1), (1, 2), (2, 3)];
        assert_eq!(order_edges_strict(&edges).unwrap(), vec![0, 1, 2, 3]);
        let reversed = vec![(3, 2), (2, 1), (1, 0)];
        assert_eq!(order_edges_strict(&reversed).unwrap(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_order_closed_loop_returns_to_start() {
        let edges = vec![(5, 6), (6, 7), (7, 5)];
        assert_eq!(classify_edges(&edges), BoundaryShape::ClosedLoop);
        assert_eq!(order_edges_strict(&edges).unwrap(), vec![5, 6, 7, 5]);
    }

    #[test]
    fn test_duplicate_and_self_loop_edges_ignored() {
        let edges = vec![(0, 1), (1, 0), (1, 1), (1, 2)];
        assert_eq!(classify_edges(&edges), BoundaryShape::OpenChain);
        assert_eq!(order_edges_strict(&edges).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_branching_fails_fast() {
        let edges = vec![(0, 1), (1, 2), (1, 3)];
        assert_eq!(
            classify_edges(&edges),
            BoundaryShape::Branching { node: 1, degree: 3 }
        );
        let err = order_edges_strict(&edges).unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::MalformedBoundary);
    }

    #[test]
    fn test_disconnected_fails_fast() {
        let edges = vec![(0, 1), (5, 6)];
        assert_eq!(
            classify_edges(&edges),
            BoundaryShape::Disconnected { components: 2 }
        );
        assert!(order_edges_strict(&edges).is_err());
    }

    #[test]
    fn test_boundary_path_missing_code() {
        let edges = BoundaryEdgeSet::new();
        match boundary_path(&edges, 4).unwrap_err() {
            MeshError::MalformedBoundary { code, .. } => assert_eq!(code, Some(4)),
            other => panic!("Expected MalformedBoundary, got {:?}", other),
        }
    }

    #[test]
    fn test_recompute_codes() {
        // Two quads sharing edge 1-4: only nodes 1 and 4 are shared,
        // but they still sit on exterior edges (0-1, 1-2, 3-4, 4-5)
        let elements = vec![Element::Quad([0, 1, 4, 3]), Element::Quad([1, 2, 5, 4])];
        assert_eq!(recompute_boundary_codes(7, &elements), vec![1, 1, 1, 1, 1, 1, 0]);
    }
}
