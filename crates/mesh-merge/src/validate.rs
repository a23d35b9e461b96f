//! Mesh validation and reporting.

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::Mesh;
use crate::adjacency::MeshAdjacency;
use crate::error::{IssueSeverity, MeshError, MeshResult, ValidationIssue};
use crate::types::{BoundaryCode, is_segment_code};

/// Validation report for a mesh.
#[derive(Debug, Clone)]
pub struct MeshReport {
    /// Total node count.
    pub node_count: usize,

    /// Total element count.
    pub element_count: usize,

    /// Number of triangular elements.
    pub triangle_count: usize,

    /// Number of quadrilateral elements.
    pub quad_count: usize,

    /// Number of exterior boundary edges (used by exactly one element).
    pub boundary_edge_count: usize,

    /// Number of edges shared by more than two elements.
    pub non_manifold_edge_count: usize,

    /// Whether all edges have at most 2 adjacent elements.
    pub is_manifold: bool,

    /// Number of nodes per boundary code, ascending by code.
    pub code_histogram: Vec<(BoundaryCode, usize)>,

    /// Distinct segment codes (`> 1`), ascending.
    pub segment_codes: Vec<BoundaryCode>,

    /// Nodes not referenced by any element.
    pub unreferenced_node_count: usize,

    /// Bounding box as (min_corner, max_corner).
    pub bounds: Option<(Point3<f64>, Point3<f64>)>,

    /// Planar dimensions (x, y).
    pub dimensions: Option<(f64, f64)>,

    /// Projection string carried by the mesh.
    pub projection: Option<String>,
}

impl MeshReport {
    /// Check if mesh passes basic validity checks.
    pub fn is_valid(&self) -> bool {
        self.node_count > 0 && self.element_count > 0
    }

    /// Number of segment codes available for pairing.
    pub fn segment_count(&self) -> usize {
        self.segment_codes.len()
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh Report:")?;
        writeln!(f, "  Nodes: {}", self.node_count)?;
        writeln!(
            f,
            "  Elements: {} ({} triangles, {} quads)",
            self.element_count, self.triangle_count, self.quad_count
        )?;

        if let Some(projection) = &self.projection {
            writeln!(f, "  Projection: {}", projection)?;
        }

        if let Some((min, max)) = &self.bounds {
            writeln!(
                f,
                "  Bounds: [{:.3}, {:.3}] to [{:.3}, {:.3}]",
                min.x, min.y, max.x, max.y
            )?;
        }

        if let Some((dx, dy)) = &self.dimensions {
            writeln!(f, "  Dimensions: {:.3} x {:.3}", dx, dy)?;
        }

        writeln!(f, "  Boundary edges: {}", self.boundary_edge_count)?;
        writeln!(
            f,
            "  Manifold: {} (non-manifold edges: {})",
            if self.is_manifold { "yes" } else { "NO" },
            self.non_manifold_edge_count
        )?;

        let histogram: Vec<String> = self
            .code_histogram
            .iter()
            .map(|(code, count)| format!("{}: {}", code, count))
            .collect();
        writeln!(f, "  Codes: {}", histogram.join(", "))?;
        writeln!(f, "  Segment codes: {:?}", self.segment_codes)?;

        if self.unreferenced_node_count > 0 {
            writeln!(f, "  Unreferenced nodes: {}", self.unreferenced_node_count)?;
        }

        Ok(())
    }
}

/// Validate a mesh and return a report.
///
/// Element indices are assumed valid; run [`validate_mesh_data`] first on
/// untrusted input.
pub fn validate_mesh(mesh: &Mesh) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.elements);
    let boundary_edge_count = adjacency.boundary_edge_count();
    let non_manifold_edge_count = adjacency.non_manifold_edge_count();

    let mut histogram: Vec<(BoundaryCode, usize)> = Vec::new();
    let mut codes = mesh.codes();
    codes.sort_unstable();
    for code in codes {
        match histogram.last_mut() {
            Some((last, count)) if *last == code => *count += 1,
            _ => histogram.push((code, 1)),
        }
    }
    let segment_codes = histogram
        .iter()
        .map(|&(code, _)| code)
        .filter(|&c| is_segment_code(c))
        .collect();

    let mut referenced = vec![false; mesh.node_count()];
    for element in &mesh.elements {
        for &n in element.nodes() {
            if let Some(slot) = referenced.get_mut(n as usize) {
                *slot = true;
            }
        }
    }
    let unreferenced_node_count = referenced.iter().filter(|&&r| !r).count();

    let bounds = mesh.bounds();
    let dimensions = bounds.map(|(min, max)| (max.x - min.x, max.y - min.y));

    let report = MeshReport {
        node_count: mesh.node_count(),
        element_count: mesh.element_count(),
        triangle_count: mesh.triangle_count(),
        quad_count: mesh.quad_count(),
        boundary_edge_count,
        non_manifold_edge_count,
        is_manifold: non_manifold_edge_count == 0,
        code_histogram: histogram,
        segment_codes,
        unreferenced_node_count,
        bounds,
        dimensions,
        projection: mesh.projection.clone(),
    };

    if !report.is_manifold {
        warn!(
            "Mesh is not manifold: {} non-manifold edges",
            non_manifold_edge_count
        );
    }

    debug!("{}", report);

    report
}

/// Log a summary of mesh validation.
pub fn log_validation(report: &MeshReport) {
    info!(
        "Mesh: {} nodes, {} elements, {} boundary edges, segment codes {:?}",
        report.node_count, report.element_count, report.boundary_edge_count, report.segment_codes
    );

    if !report.is_manifold {
        warn!(
            "Not manifold: {} non-manifold edges",
            report.non_manifold_edge_count
        );
    }
}

/// Options for mesh data validation.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Whether to reject the mesh on finding invalid data (default: true).
    /// If false, issues are collected but validation continues.
    pub reject_on_invalid: bool,
    /// Maximum number of issues to collect before stopping (default: 100).
    pub max_issues: usize,
    /// Whether the z coordinate (depth) must be finite (default: true).
    pub check_depth: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            reject_on_invalid: true,
            max_issues: 100,
            check_depth: true,
        }
    }
}

impl ValidationOptions {
    /// Create options that collect all issues without rejecting.
    pub fn collect_all() -> Self {
        Self {
            reject_on_invalid: false,
            max_issues: 1000,
            check_depth: true,
        }
    }

    /// Rejecting options that only check planar coordinates.
    ///
    /// Used for merge inputs, whose depths are discarded.
    pub fn planar() -> Self {
        Self {
            check_depth: false,
            ..Self::default()
        }
    }
}

/// Result of mesh data validation.
#[derive(Debug, Clone)]
pub struct DataValidationResult {
    /// List of issues found during validation.
    pub issues: Vec<ValidationIssue>,
    /// Number of invalid node indices found.
    pub invalid_index_count: usize,
    /// Number of NaN coordinates found.
    pub nan_count: usize,
    /// Number of infinite coordinates found.
    pub infinity_count: usize,
    /// Number of elements listing a node twice.
    pub repeated_node_count: usize,
}

impl DataValidationResult {
    /// True when no error-level issue was found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|i| i.severity() == IssueSeverity::Error)
    }

    /// Get total number of issues found.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }
}

impl std::fmt::Display for DataValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.issues.is_empty() {
            write!(f, "Data validation passed: no issues found")
        } else {
            writeln!(f, "Data validation found {} issue(s):", self.issue_count())?;
            if self.invalid_index_count > 0 {
                writeln!(f, "  - {} invalid node indices", self.invalid_index_count)?;
            }
            if self.nan_count > 0 {
                writeln!(f, "  - {} NaN coordinates", self.nan_count)?;
            }
            if self.infinity_count > 0 {
                writeln!(f, "  - {} infinite coordinates", self.infinity_count)?;
            }
            if self.repeated_node_count > 0 {
                writeln!(
                    f,
                    "  - {} elements with a repeated node",
                    self.repeated_node_count
                )?;
            }
            Ok(())
        }
    }
}

/// Validate mesh data for invalid indices and coordinates.
///
/// This function checks:
/// - Element indices are within node bounds
/// - Node coordinates are not NaN
/// - Node coordinates are not infinite
/// - Elements do not list a node twice (warning only)
///
/// # Returns
/// - `Ok(DataValidationResult)` - Validation completed (check `is_valid()` for result)
/// - `Err(MeshError)` - An error-level issue was found and `reject_on_invalid` is set
///
/// # Example
/// ```
/// use mesh_merge::{Mesh, validate::{validate_mesh_data, ValidationOptions}};
///
/// let mesh = Mesh::new();
/// let result = validate_mesh_data(&mesh, &ValidationOptions::default()).unwrap();
/// assert!(result.is_valid());
/// ```
pub fn validate_mesh_data(
    mesh: &Mesh,
    options: &ValidationOptions,
) -> MeshResult<DataValidationResult> {
    let mut issues = Vec::new();
    let mut invalid_index_count = 0;
    let mut nan_count = 0;
    let mut infinity_count = 0;
    let mut repeated_node_count = 0;

    let node_count = mesh.nodes.len();

    for (node_idx, node) in mesh.nodes.iter().enumerate() {
        if issues.len() >= options.max_issues {
            break;
        }

        let coords = [
            ("x", node.position.x),
            ("y", node.position.y),
            ("z", node.position.z),
        ];

        let checked = if options.check_depth { 3 } else { 2 };
        for (coord_name, value) in coords.into_iter().take(checked) {
            if value.is_finite() {
                continue;
            }
            if options.reject_on_invalid {
                return Err(MeshError::invalid_coordinate(node_idx, coord_name, value));
            }
            if value.is_nan() {
                nan_count += 1;
                issues.push(ValidationIssue::NaNCoordinate {
                    node_index: node_idx,
                    coordinate: coord_name,
                });
            } else {
                infinity_count += 1;
                issues.push(ValidationIssue::InfiniteCoordinate {
                    node_index: node_idx,
                    coordinate: coord_name,
                    value,
                });
            }
        }
    }

    for (element_idx, element) in mesh.elements.iter().enumerate() {
        if issues.len() >= options.max_issues {
            break;
        }

        for &node_idx in element.nodes() {
            if node_idx as usize >= node_count {
                if options.reject_on_invalid {
                    return Err(MeshError::invalid_node_index(
                        element_idx,
                        node_idx,
                        node_count,
                    ));
                }
                invalid_index_count += 1;
                issues.push(ValidationIssue::InvalidNodeIndex {
                    element_index: element_idx,
                    node_index: node_idx,
                    node_count,
                });
            }
        }

        if element.has_repeated_node() {
            repeated_node_count += 1;
            issues.push(ValidationIssue::RepeatedNode {
                element_index: element_idx,
            });
        }
    }

    let mut referenced = vec![false; node_count];
    for element in &mesh.elements {
        for &n in element.nodes() {
            if let Some(slot) = referenced.get_mut(n as usize) {
                *slot = true;
            }
        }
    }
    for (node_index, _) in referenced.iter().enumerate().filter(|(_, used)| !**used) {
        if issues.len() >= options.max_issues {
            break;
        }
        issues.push(ValidationIssue::UnreferencedNode { node_index });
    }

    if !issues.is_empty() {
        warn!(
            "Mesh data validation found {} issue(s): {} invalid indices, {} NaN, {} Inf, {} repeated",
            issues.len(),
            invalid_index_count,
            nan_count,
            infinity_count,
            repeated_node_count
        );
    } else {
        debug!("Mesh data validation passed");
    }

    Ok(DataValidationResult {
        issues,
        invalid_index_count,
        nan_count,
        infinity_count,
        repeated_node_count,
    })
}

/// Validate mesh data with default options (rejects on first error).
pub fn validate_mesh_data_strict(mesh: &Mesh) -> MeshResult<()> {
    validate_mesh_data(mesh, &ValidationOptions::default())?;
    Ok(())
}
