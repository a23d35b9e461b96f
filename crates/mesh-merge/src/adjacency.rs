//! Undirected edge-use counting over mesh elements.

use hashbrown::HashMap;

use crate::types::Element;

/// Normalize an undirected edge so the smaller index comes first.
#[inline]
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// How many elements use each undirected edge.
///
/// Edges are kept in first-seen order (element order, then cyclic edge
/// order within an element), so every iterator here is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MeshAdjacency {
    counts: HashMap<(u32, u32), u32>,
    order: Vec<(u32, u32)>,
}

impl MeshAdjacency {
    /// Count every cyclic edge of every element.
    pub fn build(elements: &[Element]) -> Self {
        let mut adjacency = Self {
            counts: HashMap::with_capacity(elements.len() * 2),
            order: Vec::with_capacity(elements.len() * 2),
        };
        for element in elements {
            for (a, b) in element.edges() {
                let key = edge_key(a, b);
                let count = adjacency.counts.entry(key).or_insert(0);
                if *count == 0 {
                    adjacency.order.push(key);
                }
                *count += 1;
            }
        }
        adjacency
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.order.len()
    }

    /// Number of elements using the edge `a - b`.
    pub fn edge_uses(&self, a: u32, b: u32) -> u32 {
        self.counts.get(&edge_key(a, b)).copied().unwrap_or(0)
    }

    /// All edges with their use counts, in first-seen order.
    pub fn edges(&self) -> impl Iterator<Item = ((u32, u32), u32)> + '_ {
        self.order.iter().map(|key| (*key, self.counts[key]))
    }

    /// Edges used by exactly one element.
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edges()
            .filter(|&(_, count)| count == 1)
            .map(|(edge, _)| edge)
    }

    /// Edges used by more than two elements.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edges()
            .filter(|&(_, count)| count > 2)
            .map(|(edge, _)| edge)
    }

    /// Count of exterior boundary edges.
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges().count()
    }

    /// Count of non-manifold edges.
    pub fn non_manifold_edge_count(&self) -> usize {
        self.non_manifold_edges().count()
    }

    /// Per-node flag: true if the node touches a boundary edge.
    pub fn boundary_node_mask(&self, node_count: usize) -> Vec<bool> {
        let mut mask = vec![false; node_count];
        for (a, b) in self.boundary_edges() {
            for n in [a, b] {
                if let Some(slot) = mask.get_mut(n as usize) {
                    *slot = true;
                }
            }
        }
        mask
    }
}
