//! Merging two meshes by bridging matching boundary segments.
//!
//! Segment codes (`> 1`) of both meshes are sorted and paired by rank: the
//! k-th smallest code of the first mesh is stitched to the k-th smallest of
//! the second. For each pair the two boundary paths are ordered, aligned,
//! bridged with guide curves and triangulated. All nodes then go through
//! one deduplicating [`NodeTable`] and boundary codes are recomputed from
//! the fused topology.
//!
//! Node ids in the result depend on insertion order: first mesh nodes,
//! second mesh nodes, then bridge vertices pair by pair. Swapping the
//! inputs yields the same geometry with different ids.

use hashbrown::HashMap;
use nalgebra::{Point2, Point3};
use tracing::{debug, info, warn};

use crate::boundary::{boundary_path, extract_boundary_edges, recompute_boundary_codes};
use crate::bridge::{GuideConnectors, build_bridge};
use crate::error::{MeshError, MeshResult};
use crate::geometry::align_curves;
use crate::io::DEFAULT_PROJECTION;
use crate::tracing_ext::{OperationTimer, log_merge_result, log_mesh_stats};
use crate::triangulate::{ConstrainedTriangulator, SpadeTriangulator, Triangulation};
use crate::types::{BoundaryCode, CODE_BOUNDARY, Element, Mesh, Node};
use crate::validate::{ValidationOptions, validate_mesh_data};

/// How the two boundary curves of a pair are oriented before bridging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "merge-config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "merge-config", serde(rename_all = "snake_case"))]
pub enum CurveAlignment {
    /// Keep the first path as ordered and reverse the second.
    #[default]
    ReverseSecond,
    /// Reorder both curves along their longest extent and flip the second
    /// when that brings matching ends closer.
    Normalize,
}

/// Parameters for merging meshes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "merge-config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "merge-config", serde(default))]
pub struct MergeParams {
    /// Quantization step of the node dedup key. Two nodes are merged when
    /// `round(coord / tolerance)` agrees in both x and y.
    /// Default: 1e-8.
    pub tolerance: f64,

    /// Distance (per coordinate) below which bridge graph vertices are merged.
    /// Default: 1e-8.
    pub pslg_tolerance: f64,

    /// Number of guide curves blended between the two boundaries of a pair.
    /// Default: 1.
    pub guide_curves: usize,

    /// Orientation policy for the second boundary curve.
    /// Default: [`CurveAlignment::ReverseSecond`].
    pub alignment: CurveAlignment,

    /// Projection written to the output header. Falls back to the first
    /// mesh's projection, then to [`DEFAULT_PROJECTION`].
    pub projection: Option<String>,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            pslg_tolerance: 1e-8,
            guide_curves: 1,
            alignment: CurveAlignment::ReverseSecond,
            projection: None,
        }
    }
}

impl MergeParams {
    /// Set the node dedup tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the bridge graph vertex tolerance.
    pub fn with_pslg_tolerance(mut self, tolerance: f64) -> Self {
        self.pslg_tolerance = tolerance;
        self
    }

    /// Set the number of guide curves per bridge.
    pub fn with_guide_curves(mut self, count: usize) -> Self {
        self.guide_curves = count;
        self
    }

    /// Set the curve alignment policy.
    pub fn with_alignment(mut self, alignment: CurveAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the output projection string.
    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    /// Reject non-finite or non-positive tolerances and zero guide curves.
    pub fn validate(&self) -> MeshResult<()> {
        for (name, value) in [
            ("tolerance", self.tolerance),
            ("pslg_tolerance", self.pslg_tolerance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MeshError::invalid_parameter(
                    name,
                    format!("must be a finite positive number, got {}", value),
                ));
            }
        }
        if self.guide_curves == 0 {
            return Err(MeshError::invalid_parameter(
                "guide_curves",
                "at least one guide curve is needed to close the bridge",
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "merge-config")]
impl MergeParams {
    /// Load parameters from a TOML string. Missing keys take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load parameters from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, MergeConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&contents)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load parameters from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Errors that can occur when loading merge parameters from a file.
#[cfg(feature = "merge-config")]
#[derive(Debug, thiserror::Error)]
pub enum MergeConfigError {
    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Deduplicating node table keyed by quantized planar coordinates.
///
/// The first node inserted for a key wins: later nodes with the same key
/// return the existing index and their code is ignored.
#[derive(Debug, Clone)]
pub struct NodeTable {
    tolerance: f64,
    index: HashMap<(u64, u64), u32>,
    nodes: Vec<Node>,
    inserted: usize,
}

impl NodeTable {
    /// Create an empty table with the given quantization step.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            index: HashMap::new(),
            nodes: Vec::new(),
            inserted: 0,
        }
    }

    /// Quantized key of a planar position, rounding half to even.
    ///
    /// The key holds the bit patterns of the rounded quotients, so it stays
    /// exact at any magnitude. `-0.0` shares the key of `0.0`.
    pub fn key(&self, p: Point2<f64>) -> (u64, u64) {
        (quantize(p.x, self.tolerance), quantize(p.y, self.tolerance))
    }

    /// True when both coordinates quantize to a finite step count.
    pub fn can_quantize(&self, p: Point2<f64>) -> bool {
        (p.x / self.tolerance).is_finite() && (p.y / self.tolerance).is_finite()
    }

    /// Insert a node, or return the index of the node already holding its key.
    /// Stored nodes always have `z = 0`.
    pub fn insert(&mut self, p: Point2<f64>, code: BoundaryCode) -> u32 {
        self.inserted += 1;
        let key = self.key(p);
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.nodes.len() as u32;
        self.nodes.push(Node::new(Point3::new(p.x, p.y, 0.0), code));
        self.index.insert(key, idx);
        idx
    }

    /// Number of distinct nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no node has been inserted.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of insert calls that hit an existing key.
    pub fn duplicates(&self) -> usize {
        self.inserted - self.nodes.len()
    }

    /// Distinct nodes in insertion order.
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

fn quantize(value: f64, tolerance: f64) -> u64 {
    // Adding 0.0 turns -0.0 into 0.0
    ((value / tolerance).round_ties_even() + 0.0).to_bits()
}

/// Fail if a node of `mesh` is too far out for the dedup tolerance.
fn check_quantizable(mesh: &Mesh, table: &NodeTable) -> MeshResult<()> {
    match mesh.nodes.iter().find(|n| !table.can_quantize(n.xy())) {
        Some(node) => Err(MeshError::invalid_parameter(
            "tolerance",
            format!(
                "{} is too small for node at ({}, {})",
                table.tolerance, node.position.x, node.position.y
            ),
        )),
        None => Ok(()),
    }
}

/// Summary of one bridged code pair.
#[derive(Debug, Clone)]
pub struct BridgeSummary {
    /// Segment code in the first mesh.
    pub first_code: BoundaryCode,
    /// Segment code in the second mesh.
    pub second_code: BoundaryCode,
    /// Nodes on the first mesh's ordered boundary path.
    pub first_path_len: usize,
    /// Nodes on the second mesh's ordered boundary path.
    pub second_path_len: usize,
    /// Vertices in the bridge graph.
    pub pslg_vertices: usize,
    /// Segments in the bridge graph.
    pub pslg_segments: usize,
    /// Vertices returned by the triangulator.
    pub bridge_vertices: usize,
    /// Triangles returned by the triangulator.
    pub triangles: usize,
    /// Cap connectors, one entry per guide curve.
    pub connectors: Vec<GuideConnectors>,
    /// Connectors that used the parallel-line midpoint fallback.
    pub fallback_connectors: usize,
}

/// Result of a merge.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The merged mesh with recomputed boundary codes.
    pub mesh: Mesh,
    /// One summary per bridged code pair, in pairing order.
    pub bridges: Vec<BridgeSummary>,
    /// Nodes in both input meshes.
    pub input_nodes: usize,
    /// Vertices contributed by all bridge triangulations.
    pub bridge_nodes: usize,
    /// Inserted nodes that collapsed onto an existing node.
    pub duplicates_collapsed: usize,
    /// Elements dropped because dedup merged two of their nodes.
    pub elements_dropped: usize,
}

impl MergeResult {
    /// Triangles added by all bridges.
    pub fn bridge_triangles(&self) -> usize {
        self.bridges.iter().map(|b| b.triangles).sum()
    }
}

impl std::fmt::Display for MergeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Merge Result:")?;
        writeln!(f, "  Bridges: {}", self.bridges.len())?;
        for b in &self.bridges {
            writeln!(
                f,
                "    {} <-> {}: {} + {} path nodes, {} triangles",
                b.first_code, b.second_code, b.first_path_len, b.second_path_len, b.triangles
            )?;
        }
        writeln!(
            f,
            "  Nodes: {} ({} input + {} bridge, {} collapsed)",
            self.mesh.node_count(),
            self.input_nodes,
            self.bridge_nodes,
            self.duplicates_collapsed
        )?;
        writeln!(f, "  Elements: {}", self.mesh.element_count())?;
        if self.elements_dropped > 0 {
            writeln!(f, "  Dropped elements: {}", self.elements_dropped)?;
        }
        Ok(())
    }
}

/// Pair segment codes by rank.
///
/// Fails with [`MeshError::BoundaryCodeMismatch`] when the meshes carry a
/// different number of distinct segment codes.
pub fn pair_segment_codes(
    mesh1: &Mesh,
    mesh2: &Mesh,
) -> MeshResult<Vec<(BoundaryCode, BoundaryCode)>> {
    let first = mesh1.segment_codes();
    let second = mesh2.segment_codes();
    if first.len() != second.len() {
        return Err(MeshError::boundary_code_mismatch(first, second));
    }
    Ok(first.into_iter().zip(second).collect())
}

/// Merge two meshes with the default parameters and triangulator.
pub fn merge_meshes(mesh1: &Mesh, mesh2: &Mesh) -> MeshResult<MergeResult> {
    merge_meshes_with(mesh1, mesh2, &MergeParams::default(), &SpadeTriangulator::new())
}

/// Merge two meshes using the given parameters and triangulator.
///
/// The inputs are not modified. Any failure (code mismatch, malformed
/// boundary, degenerate curve, triangulation error) aborts the whole merge.
pub fn merge_meshes_with<T: ConstrainedTriangulator + ?Sized>(
    mesh1: &Mesh,
    mesh2: &Mesh,
    params: &MergeParams,
    triangulator: &T,
) -> MeshResult<MergeResult> {
    let _timer = OperationTimer::with_context(
        "merge",
        mesh1.node_count() + mesh2.node_count(),
        mesh1.element_count() + mesh2.element_count(),
    );

    params.validate()?;
    validate_mesh_data(mesh1, &ValidationOptions::planar())?;
    validate_mesh_data(mesh2, &ValidationOptions::planar())?;
    let mut table = NodeTable::new(params.tolerance);
    check_quantizable(mesh1, &table)?;
    check_quantizable(mesh2, &table)?;
    log_mesh_stats(mesh1, "first input");
    log_mesh_stats(mesh2, "second input");

    let pairs = pair_segment_codes(mesh1, mesh2)?;
    info!("Merging {} boundary pair(s): {:?}", pairs.len(), pairs);

    let edges1 = extract_boundary_edges(mesh1);
    let edges2 = extract_boundary_edges(mesh2);

    let mut bridges: Vec<(BridgeSummary, Triangulation)> = Vec::with_capacity(pairs.len());
    for &(code1, code2) in &pairs {
        let path1 = boundary_path(&edges1, code1)?;
        let path2 = boundary_path(&edges2, code2)?;

        let mut curve1 = mesh1.planar_positions(&path1);
        let mut curve2 = mesh2.planar_positions(&path2);
        match params.alignment {
            CurveAlignment::ReverseSecond => curve2.reverse(),
            CurveAlignment::Normalize => (curve1, curve2) = align_curves(&curve1, &curve2),
        }

        let bridge = build_bridge(&curve1, &curve2, params.guide_curves, params.pslg_tolerance)?;
        let triangulation = triangulator.triangulate(&bridge.pslg)?;

        debug!(
            code1,
            code2,
            path1 = path1.len(),
            path2 = path2.len(),
            triangles = triangulation.triangle_count(),
            "Bridged boundary pair"
        );

        let summary = BridgeSummary {
            first_code: code1,
            second_code: code2,
            first_path_len: path1.len(),
            second_path_len: path2.len(),
            pslg_vertices: bridge.pslg.vertex_count(),
            pslg_segments: bridge.pslg.segment_count(),
            bridge_vertices: triangulation.vertex_count(),
            triangles: triangulation.triangle_count(),
            fallback_connectors: bridge.fallback_count(),
            connectors: bridge.connectors,
        };
        bridges.push((summary, triangulation));
    }

    let map1: Vec<u32> = mesh1
        .nodes
        .iter()
        .map(|n| table.insert(n.xy(), n.code))
        .collect();
    let map2: Vec<u32> = mesh2
        .nodes
        .iter()
        .map(|n| table.insert(n.xy(), n.code))
        .collect();

    let bridge_triangles: usize = bridges.iter().map(|(s, _)| s.triangles).sum();
    let mut elements =
        Vec::with_capacity(mesh1.element_count() + mesh2.element_count() + bridge_triangles);
    elements.extend(mesh1.elements.iter().map(|e| e.map(|i| map1[i as usize])));
    elements.extend(mesh2.elements.iter().map(|e| e.map(|i| map2[i as usize])));

    let mut bridge_nodes = 0;
    for (_, triangulation) in &bridges {
        bridge_nodes += triangulation.vertex_count();
        let map: Vec<u32> = triangulation
            .vertices
            .iter()
            .map(|&p| table.insert(p, CODE_BOUNDARY))
            .collect();
        elements.extend(
            triangulation
                .triangles
                .iter()
                .map(|t| Element::Triangle(t.map(|i| map[i as usize]))),
        );
    }

    let before = elements.len();
    elements.retain(|e| !e.has_repeated_node());
    let elements_dropped = before - elements.len();
    if elements_dropped > 0 {
        warn!(
            "Dropped {} element(s) whose nodes collapsed under tolerance {}",
            elements_dropped, params.tolerance
        );
    }

    let duplicates_collapsed = table.duplicates();
    let mut nodes = table.into_nodes();
    let codes = recompute_boundary_codes(nodes.len(), &elements);
    for (node, code) in nodes.iter_mut().zip(codes) {
        node.code = code;
    }

    let projection = params
        .projection
        .clone()
        .or_else(|| mesh1.projection.clone())
        .unwrap_or_else(|| DEFAULT_PROJECTION.to_string());

    let result = MergeResult {
        mesh: Mesh {
            nodes,
            elements,
            projection: Some(projection),
        },
        bridges: bridges.into_iter().map(|(s, _)| s).collect(),
        input_nodes: mesh1.node_count() + mesh2.node_count(),
        bridge_nodes,
        duplicates_collapsed,
        elements_dropped,
    };

    log_merge_result(&result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use crate::triangulate::SpadeTriangulator;

    fn unit_quad(x0: f64, codes: [BoundaryCode; 4]) -> Mesh {
        Mesh::from_arrays(
            &[
                [x0, 0.0, 0.0],
                [x0 + 1.0, 0.0, 0.0],
                [x0 + 1.0, 1.0, 0.0],
                [x0, 1.0, 0.0],
            ],
            &[vec![0, 1, 2, 3]],
            &codes,
        )
        .unwrap()
    }

    #[test]
    fn test_node_table_key_rounding() {
        let table = NodeTable::new(1e-8);
        let origin = table.key(Point2::new(0.0, 0.0));
        assert_eq!(table.key(Point2::new(4e-9, -4e-9)), origin);
        assert_eq!(table.key(Point2::new(-0.0, 0.0)), origin);
        assert_eq!(
            table.key(Point2::new(1.6e-8, 0.0)),
            (2.0f64.to_bits(), 0.0f64.to_bits())
        );
    }

    #[test]
    fn test_node_table_keys_past_i64_range() {
        // 9.5e6 / 1e-12 is far beyond i64::MAX
        let mut table = NodeTable::new(1e-12);
        let a = table.insert(Point2::new(9.5e6, 0.0), 1);
        let b = table.insert(Point2::new(9.6e6, 0.0), 1);
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
        assert_eq!(table.insert(Point2::new(9.5e6, 0.0), 0), a);
    }

    #[test]
    fn test_merge_utm_northings_with_fine_tolerance() {
        let quad = |x0: f64| {
            Mesh::from_arrays(
                &[
                    [x0, 9.9e6, 0.0],
                    [x0 + 10.0, 9.9e6, 0.0],
                    [x0 + 10.0, 9.9e6 + 10.0, 0.0],
                    [x0, 9.9e6 + 10.0, 0.0],
                ],
                &[vec![0, 1, 2, 3]],
                &[1, 1, 1, 1],
            )
            .unwrap()
        };
        let params = MergeParams::default().with_tolerance(1e-12);
        let result =
            merge_meshes_with(&quad(0.0), &quad(20.0), &params, &SpadeTriangulator::new())
                .unwrap();
        assert_eq!(result.mesh.node_count(), 8);
        assert_eq!(result.elements_dropped, 0);
        assert_eq!(result.mesh.element_count(), 2);
    }

    #[test]
    fn test_merge_rejects_unquantizable_tolerance() {
        let a = unit_quad(0.0, [0, 1, 1, 0]);
        let b = unit_quad(3.0, [0, 0, 0, 0]);
        let params = MergeParams::default().with_tolerance(1e-320);
        let err = merge_meshes_with(&a, &b, &params, &SpadeTriangulator::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_merge_ignores_non_finite_depth() {
        let mut a = unit_quad(0.0, [0, 1, 1, 0]);
        a.nodes[2].position.z = f64::NAN;
        let b = unit_quad(3.0, [0, 0, 0, 0]);
        let result = merge_meshes(&a, &b).unwrap();
        assert_eq!(result.mesh.node_count(), 8);
        assert!(result.mesh.nodes.iter().all(|n| n.position.z == 0.0));
    }

    #[test]
    fn test_node_table_first_code_wins() {
        let mut table = NodeTable::new(1e-8);
        assert_eq!(table.insert(Point2::new(1.0, 2.0), 5), 0);
        assert_eq!(table.insert(Point2::new(3.0, 2.0), 0), 1);
        assert_eq!(table.insert(Point2::new(1.0 + 1e-10, 2.0), 1), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.duplicates(), 1);
        let nodes = table.into_nodes();
        assert_eq!(nodes[0].code, 5);
        assert_eq!(nodes[0].position.z, 0.0);
    }

    #[test]
    fn test_params_validate() {
        assert!(MergeParams::default().validate().is_ok());
        assert!(MergeParams::default().with_tolerance(0.0).validate().is_err());
        assert!(
            MergeParams::default()
                .with_pslg_tolerance(f64::NAN)
                .validate()
                .is_err()
        );
        let err = MergeParams::default()
            .with_guide_curves(0)
            .validate()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_pairing_mismatch() {
        let a = unit_quad(0.0, [0, 2, 2, 0]);
        let b = unit_quad(2.0, [0, 0, 0, 0]);
        let err = pair_segment_codes(&a, &b).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BoundaryCodeMismatch);
    }

    #[test]
    fn test_pairing_by_rank() {
        let a = unit_quad(0.0, [3, 3, 7, 7]);
        let b = unit_quad(2.0, [4, 2, 2, 4]);
        assert_eq!(pair_segment_codes(&a, &b).unwrap(), vec![(3, 2), (7, 4)]);
    }

    #[test]
    fn test_merge_two_facing_quads() {
        let a = unit_quad(0.0, [0, 2, 2, 0]);
        let b = unit_quad(2.0, [2, 0, 0, 2]);
        let result = merge_meshes(&a, &b).unwrap();

        assert_eq!(result.bridges.len(), 1);
        assert_eq!(result.bridges[0].triangles, 4);
        assert_eq!(result.mesh.quad_count(), 2);
        assert_eq!(result.mesh.triangle_count(), 4);
        // 8 quad corners plus the two guide connectors at x = 1.5
        assert_eq!(result.mesh.node_count(), 10);
        assert_eq!(
            result.mesh.node_count(),
            result.input_nodes + result.bridge_nodes - result.duplicates_collapsed
        );
        assert!(result.mesh.nodes.iter().all(|n| n.code == 1));
        assert_eq!(result.mesh.projection.as_deref(), Some(DEFAULT_PROJECTION));
    }

    #[test]
    fn test_merge_without_segments_concatenates() {
        let a = unit_quad(0.0, [0, 1, 1, 0]);
        let b = unit_quad(1.0, [0, 0, 1, 1]);
        let result = merge_meshes(&a, &b).unwrap();
        assert!(result.bridges.is_empty());
        // Shared edge x = 1 collapses two nodes
        assert_eq!(result.mesh.node_count(), 6);
        assert_eq!(result.duplicates_collapsed, 2);
    }

    #[test]
    fn test_merge_reports_missing_chain() {
        // Code 2 nodes are not adjacent along any element edge
        let a = unit_quad(0.0, [2, 0, 2, 0]);
        let b = unit_quad(2.0, [2, 0, 0, 2]);
        let err = merge_meshes(&a, &b).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedBoundary);
    }

    #[test]
    fn test_projection_override() {
        let a = unit_quad(0.0, [0, 1, 1, 0]);
        let b = unit_quad(3.0, [0, 0, 0, 0]);
        let params = MergeParams::default().with_projection("LONG/LAT");
        let result = merge_meshes_with(&a, &b, &params, &SpadeTriangulator::new()).unwrap();
        assert_eq!(result.mesh.projection.as_deref(), Some("LONG/LAT"));
    }

    #[cfg(feature = "merge-config")]
    #[test]
    fn test_params_toml_round_trip() {
        let params = MergeParams::default()
            .with_guide_curves(2)
            .with_alignment(CurveAlignment::Normalize);
        let text = params.to_toml().unwrap();
        assert_eq!(MergeParams::from_toml(&text).unwrap(), params);

        let partial = MergeParams::from_toml("guide_curves = 3").unwrap();
        assert_eq!(partial.guide_curves, 3);
        assert_eq!(partial.tolerance, 1e-8);
    }

    #[cfg(feature = "merge-config")]
    #[test]
    fn test_params_json_round_trip() {
        let params = MergeParams::default().with_projection("UTM-32");
        let json = params.to_json().unwrap();
        assert!(json.contains("\"reverse_second\""));
        assert_eq!(MergeParams::from_json(&json).unwrap(), params);
    }
}
