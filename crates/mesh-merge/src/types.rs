//! Core mesh data types.

use nalgebra::{Point2, Point3};

use crate::error::{MeshError, MeshResult};

/// Integer tag attached to every mesh node.
///
/// - `0`: unconstrained interior node
/// - `1`: generic boundary node with no segment identity
/// - `2..`: named open-boundary segment, one contiguous chain of boundary edges
pub type BoundaryCode = i32;

/// Code of an interior node.
pub const CODE_INTERIOR: BoundaryCode = 0;

/// Code of a generic (auto-detected) boundary node.
pub const CODE_BOUNDARY: BoundaryCode = 1;

/// Smallest code that identifies a distinct boundary segment.
pub const FIRST_SEGMENT_CODE: BoundaryCode = 2;

/// Returns true if the code identifies a named boundary segment.
#[inline]
pub fn is_segment_code(code: BoundaryCode) -> bool {
    code >= FIRST_SEGMENT_CODE
}

/// A mesh node: a position plus its boundary code.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node position. Merged meshes always carry `z = 0`.
    pub position: Point3<f64>,

    /// Boundary code of the node.
    pub code: BoundaryCode,
}

impl Node {
    /// Create a node from a position and a code.
    #[inline]
    pub fn new(position: Point3<f64>, code: BoundaryCode) -> Self {
        Self { position, code }
    }

    /// Create a node from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64, code: BoundaryCode) -> Self {
        Self::new(Point3::new(x, y, z), code)
    }

    /// Planar position of the node (z dropped).
    #[inline]
    pub fn xy(&self) -> Point2<f64> {
        Point2::new(self.position.x, self.position.y)
    }
}

/// A mesh element, interpreted as a cyclic polygon over node indices.
///
/// Index order defines orientation, but nothing in this crate enforces a
/// consistent winding across elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// Three-node element.
    Triangle([u32; 3]),
    /// Four-node element.
    Quad([u32; 4]),
}

impl Element {
    /// Build an element from a node-index slice of length 3 or 4.
    pub fn from_slice(nodes: &[u32]) -> Option<Self> {
        match *nodes {
            [a, b, c] => Some(Element::Triangle([a, b, c])),
            [a, b, c, d] => Some(Element::Quad([a, b, c, d])),
            _ => None,
        }
    }

    /// Node indices in element order.
    #[inline]
    pub fn nodes(&self) -> &[u32] {
        match self {
            Element::Triangle(n) => n,
            Element::Quad(n) => n,
        }
    }

    /// Number of nodes (3 or 4).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    /// Elements always have at least three nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Cyclic edges `(n[i], n[(i + 1) % len])` in element order.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let nodes = self.nodes();
        let n = nodes.len();
        (0..n).map(move |i| (nodes[i], nodes[(i + 1) % n]))
    }

    /// Apply `f` to every node index, keeping the element kind.
    pub fn map(&self, mut f: impl FnMut(u32) -> u32) -> Self {
        match *self {
            Element::Triangle([a, b, c]) => Element::Triangle([f(a), f(b), f(c)]),
            Element::Quad([a, b, c, d]) => Element::Quad([f(a), f(b), f(c), f(d)]),
        }
    }

    /// True if any node index appears more than once.
    pub fn has_repeated_node(&self) -> bool {
        let nodes = self.nodes();
        (0..nodes.len()).any(|i| nodes[i + 1..].contains(&nodes[i]))
    }
}

/// An unstructured mesh of triangles and quadrilaterals with coded nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Node data; an element's indices point into this list.
    pub nodes: Vec<Node>,

    /// Element connectivity.
    pub elements: Vec<Element>,

    /// Projection string carried through the text format header.
    pub projection: Option<String>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(node_count: usize, element_count: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_count),
            elements: Vec::with_capacity(element_count),
            projection: None,
        }
    }

    /// Build a mesh from parallel arrays: `(x, y, z)` triples, element
    /// index tuples and one code per node.
    pub fn from_arrays(
        coords: &[[f64; 3]],
        elements: &[Vec<u32>],
        codes: &[BoundaryCode],
    ) -> MeshResult<Self> {
        if coords.len() != codes.len() {
            return Err(MeshError::invalid_parameter(
                "codes",
                format!(
                    "expected one code per node ({} nodes, {} codes)",
                    coords.len(),
                    codes.len()
                ),
            ));
        }

        let mut mesh = Mesh::with_capacity(coords.len(), elements.len());
        mesh.nodes.extend(
            coords
                .iter()
                .zip(codes)
                .map(|(&[x, y, z], &code)| Node::from_coords(x, y, z, code)),
        );

        for (element_index, nodes) in elements.iter().enumerate() {
            let element = Element::from_slice(nodes).ok_or_else(|| {
                MeshError::invalid_parameter(
                    "elements",
                    format!(
                        "element {} has {} nodes, expected 3 or 4",
                        element_index,
                        nodes.len()
                    ),
                )
            })?;
            mesh.elements.push(element);
        }

        Ok(mesh)
    }

    /// Number of nodes in the mesh.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements in the mesh.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if mesh is empty (no nodes or elements).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.elements.is_empty()
    }

    /// Number of triangular elements.
    pub fn triangle_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, Element::Triangle(_)))
            .count()
    }

    /// Number of quadrilateral elements.
    pub fn quad_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, Element::Quad(_)))
            .count()
    }

    /// Boundary codes aligned by index with `nodes`.
    pub fn codes(&self) -> Vec<BoundaryCode> {
        self.nodes.iter().map(|n| n.code).collect()
    }

    /// Distinct segment codes (`> 1`) in ascending order.
    pub fn segment_codes(&self) -> Vec<BoundaryCode> {
        let mut codes: Vec<BoundaryCode> = self
            .nodes
            .iter()
            .map(|n| n.code)
            .filter(|&c| is_segment_code(c))
            .collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }

    /// Planar positions of the given nodes, in the given order.
    ///
    /// Panics if an index is out of range; callers pass indices taken from
    /// this mesh's own topology.
    pub fn planar_positions(&self, indices: &[u32]) -> Vec<Point2<f64>> {
        indices
            .iter()
            .map(|&i| self.nodes[i as usize].xy())
            .collect()
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if mesh has no nodes.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.nodes.first()?.position;
        let mut min = first;
        let mut max = first;

        for node in &self.nodes[1..] {
            let p = &node.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_edges_wrap() {
        let quad = Element::Quad([4, 5, 6, 7]);
        let edges: Vec<_> = quad.edges().collect();
        assert_eq!(edges, vec![(4, 5), (5, 6), (6, 7), (7, 4)]);

        let tri = Element::Triangle([0, 2, 1]);
        assert_eq!(tri.edges().last(), Some((1, 0)));
    }

    #[test]
    fn test_element_from_slice() {
        assert_eq!(
            Element::from_slice(&[1, 2, 3]),
            Some(Element::Triangle([1, 2, 3]))
        );
        assert_eq!(
            Element::from_slice(&[1, 2, 3, 4]),
            Some(Element::Quad([1, 2, 3, 4]))
        );
        assert_eq!(Element::from_slice(&[1, 2]), None);
        assert_eq!(Element::from_slice(&[1, 2, 3, 4, 5]), None);
    }

    #[test]
    fn test_repeated_node() {
        assert!(Element::Quad([1, 2, 1, 3]).has_repeated_node());
        assert!(!Element::Triangle([1, 2, 3]).has_repeated_node());
    }

    #[test]
    fn test_segment_codes_sorted_distinct() {
        let mesh = Mesh::from_arrays(
            &[[0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            &[vec![0, 1, 2, 3]],
            &[5, 2, 1, 5],
        )
        .unwrap();
        assert_eq!(mesh.segment_codes(), vec![2, 5]);
        assert_eq!(mesh.codes(), vec![5, 2, 1, 5]);
    }

    #[test]
    fn test_from_arrays_rejects_bad_input() {
        assert!(Mesh::from_arrays(&[[0.0; 3]], &[], &[]).is_err());
        assert!(Mesh::from_arrays(&[[0.0; 3]; 2], &[vec![0, 1]], &[0, 0]).is_err());
    }

    #[test]
    fn test_bounds() {
        let mut mesh = Mesh::new();
        assert!(mesh.bounds().is_none());
        mesh.nodes.push(Node::from_coords(1.0, -2.0, 0.0, 0));
        mesh.nodes.push(Node::from_coords(-1.0, 3.0, 0.5, 1));
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 3.0, 0.5));
    }
}
