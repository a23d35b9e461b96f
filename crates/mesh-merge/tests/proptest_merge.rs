//! Property-based tests for merge invariants.
//!
//! These tests use proptest to generate random inputs and verify invariants.
//!
//! Run with: cargo test -p mesh-merge -- proptest

use mesh_merge::{
    Mesh, MergeParams, NodeTable, SpadeTriangulator, merge_meshes_with, mesh_to_string,
    order_edges_strict, parse_mesh,
};
use nalgebra::Point2;
use proptest::prelude::*;
use std::path::Path;

// =============================================================================
// Strategies
// =============================================================================

/// Strictly increasing row heights from 0 to `height`.
fn arb_rows(height: f64) -> impl Strategy<Value = Vec<f64>> {
    (1usize..8).prop_map(move |n| (0..=n).map(|i| height * i as f64 / n as f64).collect())
}

/// A vertical strip of quads with one coded side.
fn strip(x0: f64, x1: f64, ys: &[f64], left: i32, right: i32) -> Mesh {
    let mut coords = Vec::new();
    let mut codes = Vec::new();
    for &y in ys {
        coords.push([x0, y, 0.0]);
        coords.push([x1, y, 0.0]);
        codes.push(left);
        codes.push(right);
    }
    let elements: Vec<Vec<u32>> = (0..ys.len() as u32 - 1)
        .map(|i| vec![2 * i, 2 * i + 1, 2 * i + 3, 2 * i + 2])
        .collect();
    Mesh::from_arrays(&coords, &elements, &codes).unwrap()
}

/// A random open chain: node labels in visiting order, and its edges in
/// shuffled order with random directions.
fn arb_chain() -> impl Strategy<Value = (Vec<u32>, Vec<(u32, u32)>)> {
    (1usize..30)
        .prop_flat_map(|n| {
            let labels = Just((0..=n as u32).collect::<Vec<_>>()).prop_shuffle();
            (labels, prop::collection::vec(any::<bool>(), n))
        })
        .prop_flat_map(|(labels, flips)| {
            let edges: Vec<(u32, u32)> = labels
                .windows(2)
                .zip(&flips)
                .map(|(w, &flip)| if flip { (w[1], w[0]) } else { (w[0], w[1]) })
                .collect();
            (Just(labels), Just(edges).prop_shuffle())
        })
}

/// A random mixed triangle/quad mesh with valid indices.
fn arb_mesh() -> impl Strategy<Value = Mesh> {
    (4usize..40).prop_flat_map(|n| {
        let coords = prop::collection::vec(prop::array::uniform3(-1000.0..1000.0f64), n);
        let codes = prop::collection::vec(0i32..6, n);
        let element = prop::collection::vec(0..n as u32, 3..=4);
        let elements = prop::collection::vec(element, 1..30);
        (coords, elements, codes).prop_map(|(coords, elements, codes)| {
            let mut mesh = Mesh::from_arrays(&coords, &elements, &codes).unwrap();
            mesh.projection = Some("UTM-48".to_string());
            mesh
        })
    })
}

// =============================================================================
// Node Deduplication
// =============================================================================

/// Quantized step counts, computed without `NodeTable`.
fn steps(p: Point2<f64>, tol: f64) -> (f64, f64) {
    ((p.x / tol).round_ties_even(), (p.y / tol).round_ties_even())
}

proptest! {
    /// Two points share a node exactly when their rounded step counts match,
    /// including coordinates and tolerances whose step counts pass `i64::MAX`.
    #[test]
    fn proptest_dedup_iff_steps_match(
        x in -1.0e7..1.0e7f64,
        y in -1.0e7..1.0e7f64,
        tol_exp in -12i32..=-2,
        dx_steps in -3.0..3.0f64,
        dy_steps in -3.0..3.0f64,
        far in any::<bool>(),
    ) {
        let tol = 10f64.powi(tol_exp);
        let mut table = NodeTable::new(tol);
        let p = Point2::new(x, y);
        let q = if far {
            Point2::new(x + 1.0 + dx_steps.abs(), y)
        } else {
            Point2::new(x + dx_steps * tol, y + dy_steps * tol)
        };
        let a = table.insert(p, 1);
        let b = table.insert(q, 1);
        prop_assert_eq!(a == b, steps(p, tol) == steps(q, tol));
        if far {
            prop_assert_ne!(a, b);
        }
    }
}

// =============================================================================
// Merge Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The merged node count never exceeds the inputs plus bridge vertices.
    #[test]
    fn proptest_merge_node_count_bound(
        rows1 in arb_rows(4.0),
        rows2 in arb_rows(4.0),
        gap in 0.25..3.0f64,
        guides in 1usize..4,
    ) {
        let left = strip(0.0, 1.0, &rows1, 1, 2);
        let right = strip(1.0 + gap, 2.0 + gap, &rows2, 2, 1);
        let params = MergeParams::default().with_guide_curves(guides);

        let result = merge_meshes_with(&left, &right, &params, &SpadeTriangulator::new()).unwrap();

        let bound = left.node_count() + right.node_count() + result.bridge_nodes;
        prop_assert!(result.mesh.node_count() <= bound);
        prop_assert_eq!(
            result.mesh.node_count(),
            bound - result.duplicates_collapsed
        );
        prop_assert!(result.bridge_triangles() > 0);
        prop_assert_eq!(result.elements_dropped, 0);
        prop_assert!(result.mesh.nodes.iter().all(|n| n.code == 0 || n.code == 1));
    }
}

// =============================================================================
// Boundary Path Ordering
// =============================================================================

proptest! {
    /// An open chain of n edges orders into n + 1 nodes from end to end.
    #[test]
    fn proptest_chain_orders_end_to_end((labels, edges) in arb_chain()) {
        let path = order_edges_strict(&edges).unwrap();
        let n = edges.len();

        prop_assert_eq!(path.len(), n + 1);

        let ends = (labels[0], labels[n]);
        let (first, last) = (path[0], path[n]);
        prop_assert!(
            (first, last) == ends || (last, first) == ends,
            "path {:?} does not run between {:?}", path, ends
        );

        for w in path.windows(2) {
            prop_assert!(
                edges.contains(&(w[0], w[1])) || edges.contains(&(w[1], w[0])),
                "step {}-{} is not an edge", w[0], w[1]
            );
        }
    }
}

// =============================================================================
// Text Format
// =============================================================================

proptest! {
    /// Writing then parsing preserves topology, codes and coordinates to
    /// the written precision.
    #[test]
    fn proptest_text_round_trip(mesh in arb_mesh()) {
        let text = mesh_to_string(&mesh);
        let parsed = parse_mesh(&text, Path::new("memory.mesh")).unwrap();

        prop_assert_eq!(&parsed.elements, &mesh.elements);
        prop_assert_eq!(parsed.codes(), mesh.codes());
        prop_assert_eq!(&parsed.projection, &mesh.projection);
        for (p, m) in parsed.nodes.iter().zip(&mesh.nodes) {
            prop_assert!((p.position - m.position).abs().max() <= 1e-9);
        }
    }
}
