//! meshmerge merge command - stitch two meshes along their segments.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_merge::{CurveAlignment, MergeParams, Mesh};
use serde::Serialize;
use tracing::debug;

use crate::{Alignment, Cli, OutputFormat, output};

/// Parameter sources given on the command line. Flags override the config file.
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub tolerance: Option<f64>,
    pub pslg_tolerance: Option<f64>,
    pub guide_curves: Option<usize>,
    pub alignment: Option<Alignment>,
    pub projection: Option<String>,
}

#[derive(Serialize)]
struct MergeOutput {
    first: String,
    second: String,
    output: String,
    success: bool,
    params: MergeParams,
    input_nodes: usize,
    bridge_nodes: usize,
    duplicates_collapsed: usize,
    elements_dropped: usize,
    output_nodes: usize,
    output_elements: usize,
    bridges: Vec<BridgeInfo>,
}

#[derive(Serialize)]
struct BridgeInfo {
    first_code: i32,
    second_code: i32,
    first_path_nodes: usize,
    second_path_nodes: usize,
    triangles: usize,
    fallback_connectors: usize,
}

fn build_params(overrides: &Overrides) -> Result<MergeParams> {
    let mut params = match &overrides.config {
        Some(path) => MergeParams::from_toml_file(path)
            .with_context(|| format!("Failed to load merge config from {:?}", path))?,
        None => MergeParams::default(),
    };

    if let Some(tolerance) = overrides.tolerance {
        params.tolerance = tolerance;
    }
    if let Some(tolerance) = overrides.pslg_tolerance {
        params.pslg_tolerance = tolerance;
    }
    if let Some(count) = overrides.guide_curves {
        params.guide_curves = count;
    }
    if let Some(alignment) = overrides.alignment {
        params.alignment = match alignment {
            Alignment::Reverse => CurveAlignment::ReverseSecond,
            Alignment::Normalize => CurveAlignment::Normalize,
        };
    }
    if let Some(projection) = &overrides.projection {
        params.projection = Some(projection.clone());
    }

    params.validate()?;
    debug!(?params, "Resolved merge parameters");
    Ok(params)
}

pub fn run(
    first: &Path,
    second: &Path,
    output_path: &Path,
    overrides: &Overrides,
    cli: &Cli,
) -> Result<()> {
    let params = build_params(overrides)?;

    let mesh1 =
        Mesh::load(first).with_context(|| format!("Failed to load mesh from {:?}", first))?;
    let mesh2 =
        Mesh::load(second).with_context(|| format!("Failed to load mesh from {:?}", second))?;

    output::info(
        &format!(
            "Merging {} nodes with {} nodes...",
            mesh1.node_count(),
            mesh2.node_count()
        ),
        cli.format,
        cli.quiet,
    );

    let result = mesh1
        .merge_with(&mesh2, &params)
        .with_context(|| "Merge operation failed")?;

    result
        .mesh
        .save(output_path)
        .with_context(|| format!("Failed to save merged mesh to {:?}", output_path))?;

    let summary = MergeOutput {
        first: first.display().to_string(),
        second: second.display().to_string(),
        output: output_path.display().to_string(),
        success: true,
        params,
        input_nodes: result.input_nodes,
        bridge_nodes: result.bridge_nodes,
        duplicates_collapsed: result.duplicates_collapsed,
        elements_dropped: result.elements_dropped,
        output_nodes: result.mesh.node_count(),
        output_elements: result.mesh.element_count(),
        bridges: result
            .bridges
            .iter()
            .map(|b| BridgeInfo {
                first_code: b.first_code,
                second_code: b.second_code,
                first_path_nodes: b.first_path_len,
                second_path_nodes: b.second_path_len,
                triangles: b.triangles,
                fallback_connectors: b.fallback_connectors,
            })
            .collect(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&summary, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!("Merged mesh saved to {}", output_path.display()),
                    cli.format,
                    cli.quiet,
                );
                for b in &summary.bridges {
                    println!(
                        "  {}: {} <-> {} ({} + {} path nodes, {} triangles)",
                        "Bridge".cyan(),
                        b.first_code,
                        b.second_code,
                        b.first_path_nodes,
                        b.second_path_nodes,
                        b.triangles
                    );
                    if b.fallback_connectors > 0 {
                        output::warning(
                            &format!(
                                "{} connector(s) used the midpoint fallback; check the segment orientation",
                                b.fallback_connectors
                            ),
                            cli.format,
                            cli.quiet,
                        );
                    }
                }
                println!(
                    "  {}: {} + {} → {} ({} collapsed)",
                    "Nodes".cyan(),
                    summary.input_nodes,
                    summary.bridge_nodes,
                    summary.output_nodes,
                    summary.duplicates_collapsed
                );
                println!("  {}: {}", "Elements".cyan(), summary.output_elements);
                if summary.elements_dropped > 0 {
                    println!(
                        "  {}: {}",
                        "Dropped elements".yellow(),
                        summary.elements_dropped
                    );
                }
            }
        }
    }

    Ok(())
}
