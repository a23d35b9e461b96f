//! meshmerge info command - display mesh statistics.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_merge::Mesh;
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct MeshInfo {
    path: String,
    projection: Option<String>,
    nodes: usize,
    elements: usize,
    triangles: usize,
    quads: usize,
    boundary_edges: usize,
    segment_codes: Vec<i32>,
    code_counts: Vec<CodeCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
}

#[derive(Serialize)]
struct CodeCount {
    code: i32,
    nodes: usize,
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 2],
}

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;
    let report = mesh.validate();

    let bounds = report.bounds.map(|(min, max)| BoundsInfo {
        min: [min.x, min.y, min.z],
        max: [max.x, max.y, max.z],
        dimensions: [max.x - min.x, max.y - min.y],
    });

    let info = MeshInfo {
        path: input.display().to_string(),
        projection: report.projection.clone(),
        nodes: report.node_count,
        elements: report.element_count,
        triangles: report.triangle_count,
        quads: report.quad_count,
        boundary_edges: report.boundary_edge_count,
        segment_codes: report.segment_codes.clone(),
        code_counts: report
            .code_histogram
            .iter()
            .map(|&(code, nodes)| CodeCount { code, nodes })
            .collect(),
        bounds,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Mesh Information".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                if let Some(ref projection) = info.projection {
                    println!("  {}: {}", "Projection".cyan(), projection);
                }
                println!("  {}: {}", "Nodes".cyan(), info.nodes);
                println!(
                    "  {}: {} ({} triangles, {} quads)",
                    "Elements".cyan(),
                    info.elements,
                    info.triangles,
                    info.quads
                );
                println!("  {}: {}", "Boundary edges".cyan(), info.boundary_edges);

                if let Some(ref b) = info.bounds {
                    println!(
                        "  {}: {:.3} x {:.3}",
                        "Dimensions".cyan(),
                        b.dimensions[0],
                        b.dimensions[1]
                    );
                    println!(
                        "  {}: ({:.3}, {:.3})",
                        "Min bounds".cyan(),
                        b.min[0],
                        b.min[1]
                    );
                    println!(
                        "  {}: ({:.3}, {:.3})",
                        "Max bounds".cyan(),
                        b.max[0],
                        b.max[1]
                    );
                    println!(
                        "  {}: {:.3} to {:.3}",
                        "Depth range".cyan(),
                        b.min[2],
                        b.max[2]
                    );
                }

                println!("\n{}", "Boundary codes:".bold());
                for c in &info.code_counts {
                    let label = match c.code {
                        0 => format!("{:<9}", "interior").dimmed(),
                        1 => format!("{:<9}", "boundary").normal(),
                        _ => format!("{:<9}", "segment").green(),
                    };
                    println!("  {:>4} {} {} nodes", c.code, label, c.nodes);
                }
            }
        }
    }

    Ok(())
}
