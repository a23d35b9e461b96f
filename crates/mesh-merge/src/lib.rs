//! Merging of unstructured 2D meshes along matching boundary segments.
//!
//! This crate stitches two planar meshes (triangles and quads, as used by
//! coastal and hydrodynamic models) into one by triangulating the gap
//! between their open boundary segments. It also reads and writes the
//! plain-text mesh format and converts structured grids to quad meshes.
//!
//! # Features
//!
//! - **File I/O**: Load and save the text mesh format, read ESRI ASCII grids
//! - **Validation**: Index and coordinate checks, topology report
//! - **Boundary analysis**: Extract, classify and order coded boundary segments
//! - **Bridging**: Guide curves between two boundaries, constrained triangulation
//! - **Merging**: Node deduplication and boundary code recomputation
//! - **Grid conversion**: Structured grid to quad mesh with coded frame segments
//!
//! # Boundary Codes
//!
//! Every node carries an integer code:
//!
//! - `0`: interior node
//! - `1`: boundary node with no segment
//! - `2, 3, ...`: node on an open boundary segment that can be bridged
//!
//! Segment codes of the two meshes are paired by rank. Both meshes must
//! carry the same number of distinct segment codes.
//!
//! # Coordinate System
//!
//! Meshes are planar. Node positions store `z` (usually bathymetry) but all
//! geometry (ordering, bridging, dedup) uses `x` and `y` only.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh_merge::Mesh;
//!
//! let coarse = Mesh::load("coarse.mesh").unwrap();
//! let fine = Mesh::load("fine.mesh").unwrap();
//!
//! // Check both inputs
//! println!("{}", coarse.validate());
//! println!("{}", fine.validate());
//!
//! // Stitch them together
//! let result = coarse.merge(&fine).unwrap();
//! println!("{}", result);
//!
//! result.mesh.save("merged.mesh").unwrap();
//! ```
//!
//! # Common Workflows
//!
//! ## Custom Parameters
//!
//! ```no_run
//! use mesh_merge::{CurveAlignment, MergeParams, Mesh};
//!
//! let a = Mesh::load("a.mesh").unwrap();
//! let b = Mesh::load("b.mesh").unwrap();
//!
//! let params = MergeParams::default()
//!     .with_guide_curves(3)
//!     .with_tolerance(1e-6)
//!     .with_alignment(CurveAlignment::Normalize);
//!
//! let result = a.merge_with(&b, &params).unwrap();
//! println!("{} bridge triangles", result.bridge_triangles());
//! ```
//!
//! ## Grid to Mesh
//!
//! ```no_run
//! use mesh_merge::{GridMeshParams, grid_to_mesh, load_ascii_grid};
//! use std::path::Path;
//!
//! let grid = load_ascii_grid(Path::new("bathymetry.asc")).unwrap();
//! let mesh = grid_to_mesh(&grid, &GridMeshParams::default()).unwrap();
//! println!("{} quads, segments {:?}", mesh.quad_count(), mesh.segment_codes());
//! ```
//!
//! ## Error Handling
//!
//! ```
//! use mesh_merge::{ErrorCode, Mesh, Node};
//!
//! let mut a = Mesh::new();
//! a.nodes.push(Node::from_coords(0.0, 0.0, 0.0, 2));
//! let b = Mesh::new();
//!
//! // One segment code on the first mesh, none on the second
//! let err = a.merge(&b).unwrap_err();
//! assert_eq!(err.code(), ErrorCode::BoundaryCodeMismatch);
//! println!("{}: {}", err.code(), err.recovery_suggestion());
//! ```
//!
//! # Mesh File Format
//!
//! ```text
//! <version> <unit> <node_count> <projection>
//! <id> <x> <y> <z> <code>                 (one line per node, 1-based)
//! <nodes_per_element> <max_nodes> <type>
//! <n1> <n2> <n3> [<n4>]                   (one line per element, 1-based)
//! ```
//!
//! Quads are written with four node ids, triangles with three.

mod error;
pub mod tracing_ext;
mod types;

pub mod adjacency;
pub mod boundary;
pub mod bridge;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod merge;
pub mod triangulate;
pub mod validate;

pub use adjacency::MeshAdjacency;
pub use boundary::{
    BoundaryEdgeSet, BoundaryShape, boundary_path, classify_edges, extract_boundary_edges,
    order_edges_strict, recompute_boundary_codes,
};
pub use bridge::{BridgeGeometry, GuideConnectors, Pslg, build_bridge, guide_curves};
pub use error::{
    ErrorCode, IssueSeverity, MeshError, MeshLocation, MeshResult, RecoverySuggestion,
    ValidationIssue,
};
pub use geometry::{Intersection, align_curves, intersect, normalize, resample};
pub use grid::{GridMeshParams, StructuredGrid, grid_to_mesh};
pub use io::{
    DEFAULT_PROJECTION, load_ascii_grid, load_mesh, mesh_to_string, parse_ascii_grid, parse_mesh,
    save_mesh, write_mesh,
};
#[cfg(feature = "merge-config")]
pub use merge::MergeConfigError;
pub use merge::{
    BridgeSummary, CurveAlignment, MergeParams, MergeResult, NodeTable, merge_meshes,
    merge_meshes_with, pair_segment_codes,
};
pub use triangulate::{ConstrainedTriangulator, SpadeTriangulator, Triangulation};
pub use types::{
    BoundaryCode, CODE_BOUNDARY, CODE_INTERIOR, Element, FIRST_SEGMENT_CODE, Mesh, Node,
    is_segment_code,
};
pub use validate::{
    DataValidationResult, MeshReport, ValidationOptions, validate_mesh, validate_mesh_data,
    validate_mesh_data_strict,
};

pub use tracing_ext::{OperationTimer, log_io_operation, log_merge_result, log_mesh_stats};

// Convenience methods on Mesh
impl Mesh {
    /// Load a mesh from a text mesh file.
    pub fn load(path: impl AsRef<std::path::Path>) -> MeshResult<Self> {
        io::load_mesh(path.as_ref())
    }

    /// Save the mesh to a text mesh file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> MeshResult<()> {
        io::save_mesh(self, path.as_ref())
    }

    /// Validate the mesh and return a topology report.
    pub fn validate(&self) -> MeshReport {
        validate::validate_mesh(self)
    }

    /// Merge `other` into a new mesh using default parameters.
    ///
    /// For more control, use `merge_with`.
    pub fn merge(&self, other: &Mesh) -> MeshResult<MergeResult> {
        merge::merge_meshes(self, other)
    }

    /// Merge `other` into a new mesh with custom parameters.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mesh_merge::{Mesh, MergeParams};
    ///
    /// let a = Mesh::load("a.mesh").unwrap();
    /// let b = Mesh::load("b.mesh").unwrap();
    /// let result = a.merge_with(&b, &MergeParams::default().with_guide_curves(2)).unwrap();
    /// assert_eq!(result.mesh.node_count(), result.mesh.nodes.len());
    /// ```
    pub fn merge_with(&self, other: &Mesh, params: &MergeParams) -> MeshResult<MergeResult> {
        merge::merge_meshes_with(self, other, params, &SpadeTriangulator::new())
    }

    /// Boundary edges grouped by the code of their second node.
    pub fn boundary_edges(&self) -> BoundaryEdgeSet {
        boundary::extract_boundary_edges(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_mesh() -> Mesh {
        Mesh::from_arrays(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            &[vec![0, 1, 2, 3]],
            &[1, 2, 2, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_convenience_validate() {
        let report = quad_mesh().validate();
        assert!(report.is_valid());
        assert_eq!(report.quad_count, 1);
    }

    #[test]
    fn test_convenience_boundary_edges() {
        let edges = quad_mesh().boundary_edges();
        assert_eq!(edges[&2], vec![(1, 2)]);
    }

    #[test]
    fn test_convenience_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.mesh");
        let mesh = quad_mesh();
        mesh.save(&path).unwrap();
        let loaded = Mesh::load(&path).unwrap();
        assert_eq!(loaded.elements, mesh.elements);
        assert_eq!(loaded.codes(), mesh.codes());
    }
}
