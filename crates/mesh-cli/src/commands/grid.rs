//! meshmerge grid command - convert an ESRI ASCII grid to a quad mesh.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_merge::{GridMeshParams, grid_to_mesh, load_ascii_grid};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct GridResult {
    input: String,
    output: String,
    success: bool,
    columns: usize,
    rows: usize,
    cells: usize,
    nodes: usize,
    elements: usize,
    segment_codes: Vec<i32>,
}

pub fn run(
    input: &Path,
    output_path: &Path,
    land_value: f64,
    orientation: f64,
    projection: Option<&str>,
    cli: &Cli,
) -> Result<()> {
    let mut grid =
        load_ascii_grid(input).with_context(|| format!("Failed to load grid from {:?}", input))?;
    grid.orientation = orientation;

    let params = GridMeshParams {
        land_value,
        projection: projection.map(str::to_string),
    };
    let mesh = grid_to_mesh(&grid, &params).with_context(|| "Grid conversion failed")?;

    mesh.save(output_path)
        .with_context(|| format!("Failed to save mesh to {:?}", output_path))?;

    let result = GridResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        success: true,
        columns: grid.nx,
        rows: grid.ny,
        cells: grid.nx * grid.ny,
        nodes: mesh.node_count(),
        elements: mesh.element_count(),
        segment_codes: mesh.segment_codes(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!("Grid mesh saved to {}", output_path.display()),
                    cli.format,
                    cli.quiet,
                );
                println!(
                    "  {}: {} x {} ({} cells)",
                    "Grid".cyan(),
                    result.columns,
                    result.rows,
                    result.cells
                );
                println!(
                    "  {}: {} ({} land or missing)",
                    "Elements".cyan(),
                    result.elements,
                    result.cells - result.elements
                );
                println!("  {}: {}", "Nodes".cyan(), result.nodes);
                println!("  {}: {:?}", "Segment codes".cyan(), result.segment_codes);
            }
        }
    }

    Ok(())
}
