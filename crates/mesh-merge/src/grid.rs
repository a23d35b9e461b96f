//! Structured grid to quad mesh conversion.
//!
//! Every wet cell of a regular (optionally rotated) grid becomes one quad.
//! Boundary nodes on the outer grid frame get segment codes so the result
//! can be merged with another mesh directly; boundary nodes inside the
//! frame (coastlines, islands) get the generic boundary code.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::{debug, info};

use crate::adjacency::MeshAdjacency;
use crate::error::{MeshError, MeshResult};
use crate::types::{
    BoundaryCode, CODE_BOUNDARY, CODE_INTERIOR, Element, FIRST_SEGMENT_CODE, Mesh, Node,
};

/// A regular grid of cell-centred values.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredGrid {
    /// Number of cells along x.
    pub nx: usize,
    /// Number of cells along y.
    pub ny: usize,
    /// x of the first cell centre.
    pub x0: f64,
    /// y of the first cell centre.
    pub y0: f64,
    /// Cell size along x.
    pub dx: f64,
    /// Cell size along y.
    pub dy: f64,
    /// Grid rotation in degrees about `(x0, y0)`.
    pub orientation: f64,
    /// Cell values, row-major with row 0 at `y0`: `values[j * nx + i]`.
    pub values: Vec<f64>,
}

impl StructuredGrid {
    /// Value of cell `(i, j)`.
    #[inline]
    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.nx + i]
    }

    /// Check dimensions, spacing and value count.
    pub fn check(&self) -> MeshResult<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(MeshError::invalid_parameter(
                "grid",
                format!("grid has no cells ({} x {})", self.nx, self.ny),
            ));
        }
        for (name, d) in [("dx", self.dx), ("dy", self.dy)] {
            if !d.is_finite() || d <= 0.0 {
                return Err(MeshError::invalid_parameter(
                    name,
                    format!("cell size must be finite and positive, got {}", d),
                ));
            }
        }
        if self.values.len() != self.nx * self.ny {
            return Err(MeshError::invalid_parameter(
                "values",
                format!(
                    "expected {} values for a {} x {} grid, got {}",
                    self.nx * self.ny,
                    self.nx,
                    self.ny,
                    self.values.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Parameters for grid conversion.
#[derive(Debug, Clone)]
pub struct GridMeshParams {
    /// Values above this are clamped to it, and cells equal to it are land
    /// (no element). Default: 10.0.
    pub land_value: f64,

    /// Projection string of the output mesh.
    pub projection: Option<String>,
}

impl Default for GridMeshParams {
    fn default() -> Self {
        Self {
            land_value: 10.0,
            projection: None,
        }
    }
}

/// Convert a structured grid to a quad mesh.
///
/// Corners sit half a cell outside the outermost centres and are rotated
/// about `(x0, y0)` by the grid orientation. Frame boundary nodes are coded
/// by walking the frame (bottom left to right, right side upwards, top
/// right to left, left side downwards), starting a new code `2, 3, ...`
/// for every contiguous run of boundary nodes and at the end of each side.
/// Only nodes used by an element are kept, numbered row by row.
pub fn grid_to_mesh(grid: &StructuredGrid, params: &GridMeshParams) -> MeshResult<Mesh> {
    grid.check()?;
    let (nx, ny) = (grid.nx, grid.ny);
    let land = params.land_value;
    let corner = |i: usize, j: usize| (j * (nx + 1) + i) as u32;

    let mut elements = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            let v = grid.value(i, j);
            if v.is_nan() || v.min(land) == land {
                continue;
            }
            elements.push(Element::Quad([
                corner(i, j),
                corner(i + 1, j),
                corner(i + 1, j + 1),
                corner(i, j + 1),
            ]));
        }
    }

    if elements.is_empty() {
        return Err(MeshError::empty_mesh("every grid cell is land or missing"));
    }

    let corner_count = (nx + 1) * (ny + 1);
    let on_frame = |n: u32| {
        let (i, j) = (n as usize % (nx + 1), n as usize / (nx + 1));
        i == 0 || i == nx || j == 0 || j == ny
    };

    let mut codes: Vec<BoundaryCode> = vec![CODE_INTERIOR; corner_count];
    let mut frame_boundary = vec![false; corner_count];
    for (a, b) in MeshAdjacency::build(&elements).boundary_edges() {
        for n in [a, b] {
            if on_frame(n) {
                frame_boundary[n as usize] = true;
            } else {
                codes[n as usize] = CODE_BOUNDARY;
            }
        }
    }

    let sides: [Vec<(usize, usize)>; 4] = [
        (0..=nx).map(|i| (i, 0)).collect(),
        (1..=ny).map(|j| (nx, j)).collect(),
        (0..nx).rev().map(|i| (i, ny)).collect(),
        (1..ny).rev().map(|j| (0, j)).collect(),
    ];
    let mut next_code = FIRST_SEGMENT_CODE;
    for side in &sides {
        let mut run_active = false;
        for &(i, j) in side {
            let n = corner(i, j) as usize;
            if frame_boundary[n] {
                run_active = true;
                codes[n] = next_code;
            } else if run_active {
                next_code += 1;
                run_active = false;
            }
        }
        if run_active {
            next_code += 1;
        }
    }

    let theta = grid.orientation.to_radians();
    let (sin, cos) = theta.sin_cos();
    let (x0, y0) = (grid.x0, grid.y0);
    let xs: Vec<f64> = (0..=nx).map(|k| x0 + (k as f64 - 0.5) * grid.dx).collect();
    let ys: Vec<f64> = (0..=ny).map(|k| y0 + (k as f64 - 0.5) * grid.dy).collect();

    let mut used = vec![false; corner_count];
    for element in &elements {
        for &n in element.nodes() {
            used[n as usize] = true;
        }
    }

    let mut renumber: HashMap<u32, u32> = HashMap::new();
    let mut mesh = Mesh::new();
    for j in 0..=ny {
        for i in 0..=nx {
            let n = corner(i, j);
            if !used[n as usize] {
                continue;
            }
            let (x, y) = (xs[i] - x0, ys[j] - y0);
            let position = Point3::new(x * cos + y * sin + x0, -x * sin + y * cos + y0, 0.0);
            renumber.insert(n, mesh.nodes.len() as u32);
            mesh.nodes.push(Node::new(position, codes[n as usize]));
        }
    }

    mesh.elements = elements
        .iter()
        .map(|e| e.map(|n| renumber[&n]))
        .collect();
    mesh.projection = params.projection.clone();

    debug!(
        frame_segments = next_code - FIRST_SEGMENT_CODE,
        "Coded grid frame boundary"
    );
    info!(
        "Converted {} x {} grid to {} nodes, {} elements",
        nx,
        ny,
        mesh.node_count(),
        mesh.element_count()
    );
    Ok(mesh)
}
