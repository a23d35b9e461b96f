//! Benchmarks for mesh-merge operations.
//!
//! Run with: cargo bench -p mesh-merge
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-merge -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-merge -- --baseline main

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_merge::{
    GridMeshParams, MergeParams, Mesh, SpadeTriangulator, StructuredGrid, grid_to_mesh,
    merge_meshes_with, mesh_to_string, order_edges_strict, parse_mesh, validate_mesh,
};
use std::path::Path;

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Create a `cols x rows` quad grid over `[x0, x0 + width] x [0, height]`.
///
/// Nodes on the side named by `coded_side` (`"left"` or `"right"`) get
/// segment code 2, every other node 0.
fn create_block(x0: f64, width: f64, height: f64, cols: usize, rows: usize, coded_side: &str) -> Mesh {
    let mut coords = Vec::with_capacity((cols + 1) * (rows + 1));
    let mut codes = Vec::with_capacity((cols + 1) * (rows + 1));
    for j in 0..=rows {
        for i in 0..=cols {
            coords.push([
                x0 + width * i as f64 / cols as f64,
                height * j as f64 / rows as f64,
                -10.0,
            ]);
            let coded = match coded_side {
                "left" => i == 0,
                _ => i == cols,
            };
            codes.push(if coded { 2 } else { 0 });
        }
    }

    let stride = (cols + 1) as u32;
    let mut elements = Vec::with_capacity(cols * rows);
    for j in 0..rows as u32 {
        for i in 0..cols as u32 {
            let n = j * stride + i;
            elements.push(vec![n, n + 1, n + stride + 1, n + stride]);
        }
    }

    Mesh::from_arrays(&coords, &elements, &codes).expect("valid block")
}

/// Create a square grid of wet cells with a dry island in the middle.
fn create_grid(n: usize) -> StructuredGrid {
    let mut values = vec![-5.0; n * n];
    for j in n / 3..2 * n / 3 {
        for i in n / 3..2 * n / 3 {
            values[j * n + i] = 20.0;
        }
    }
    StructuredGrid {
        nx: n,
        ny: n,
        x0: 0.5,
        y0: 0.5,
        dx: 1.0,
        dy: 1.0,
        orientation: 15.0,
        values,
    }
}

// =============================================================================
// Merge Benchmarks
// =============================================================================

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for &rows in &[10usize, 50, 200] {
        // Fine mesh on the left, coarser mesh on the right
        let fine = create_block(0.0, 10.0, 100.0, 5, rows, "right");
        let coarse = create_block(15.0, 10.0, 100.0, 3, rows / 2, "left");
        let params = MergeParams::default().with_guide_curves(3);

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(
            BenchmarkId::new("two_blocks", rows),
            &(fine, coarse),
            |b, (fine, coarse)| {
                b.iter(|| {
                    merge_meshes_with(
                        black_box(fine),
                        black_box(coarse),
                        black_box(&params),
                        &SpadeTriangulator::new(),
                    )
                })
            },
        );
    }

    group.finish();
}

fn bench_path_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_ordering");

    for &n in &[100u32, 1000, 10000] {
        // Interleave edges so the walk cannot follow insertion order
        let mut edges: Vec<(u32, u32)> = (0..n).map(|i| (i, i + 1)).collect();
        let (evens, odds): (Vec<_>, Vec<_>) = edges.drain(..).partition(|e| e.0 % 2 == 0);
        edges.extend(odds.into_iter().rev());
        edges.extend(evens);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("open_chain", n), &edges, |b, edges| {
            b.iter(|| order_edges_strict(black_box(edges)))
        });
    }

    group.finish();
}

// =============================================================================
// Validation, I/O and Grid Benchmarks
// =============================================================================

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");

    for &n in &[10usize, 100] {
        let mesh = create_block(0.0, 1.0, 1.0, n, n, "left");
        group.throughput(Throughput::Elements(mesh.element_count() as u64));
        group.bench_with_input(BenchmarkId::new("block", n), &mesh, |b, mesh| {
            b.iter(|| validate_mesh(black_box(mesh)))
        });
    }

    group.finish();
}

fn bench_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("io");

    let mesh = create_block(0.0, 1.0, 1.0, 100, 100, "left");
    let text = mesh_to_string(&mesh);
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("write_text", |b| b.iter(|| mesh_to_string(black_box(&mesh))));
    group.bench_function("parse_text", |b| {
        b.iter(|| parse_mesh(black_box(&text), Path::new("bench.mesh")))
    });

    group.finish();
}

fn bench_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid");

    for &n in &[30usize, 150] {
        let grid = create_grid(n);
        let params = GridMeshParams::default();
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::new("grid_to_mesh", n), &grid, |b, grid| {
            b.iter(|| grid_to_mesh(black_box(grid), black_box(&params)))
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(
    benches,
    bench_merge,
    bench_path_ordering,
    bench_validation,
    bench_io,
    bench_grid,
);

criterion_main!(benches);
