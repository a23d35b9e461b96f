//! meshmerge validate command - check a mesh and its boundary segments.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_merge::validate::log_validation;
use mesh_merge::{
    BoundaryShape, IssueSeverity, Mesh, ValidationOptions, classify_edges, validate_mesh_data,
};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct ValidationResult {
    path: String,
    valid: bool,
    issues: Vec<IssueInfo>,
    segments: Vec<SegmentInfo>,
}

#[derive(Serialize)]
struct IssueInfo {
    category: String,
    message: String,
    severity: String,
}

#[derive(Serialize)]
struct SegmentInfo {
    code: i32,
    edges: usize,
    shape: String,
    mergeable: bool,
}

fn severity_name(severity: IssueSeverity) -> &'static str {
    match severity {
        IssueSeverity::Error => "error",
        IssueSeverity::Warning => "warning",
        IssueSeverity::Info => "info",
    }
}

fn shape_name(shape: &BoundaryShape) -> String {
    match shape {
        BoundaryShape::Empty => "empty".to_string(),
        BoundaryShape::OpenChain => "open chain".to_string(),
        BoundaryShape::ClosedLoop => "closed loop".to_string(),
        BoundaryShape::Branching { node, degree } => {
            format!("branching at node {} (degree {})", node, degree)
        }
        BoundaryShape::Disconnected { components } => {
            format!("{} disconnected pieces", components)
        }
    }
}

pub fn run(input: &Path, strict: bool, cli: &Cli) -> Result<()> {
    let mesh =
        Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    let data = validate_mesh_data(&mesh, &ValidationOptions::collect_all())
        .with_context(|| "Mesh data validation failed")?;
    let report = mesh.validate();
    log_validation(&report);

    let mut issues: Vec<IssueInfo> = data
        .issues
        .iter()
        .map(|issue| IssueInfo {
            category: issue.code().to_string(),
            message: issue.to_string(),
            severity: severity_name(issue.severity()).to_string(),
        })
        .collect();

    if report.element_count == 0 {
        issues.push(IssueInfo {
            category: "topology".to_string(),
            message: "Mesh has no elements".to_string(),
            severity: "error".to_string(),
        });
    }

    if !report.is_manifold {
        issues.push(IssueInfo {
            category: "topology".to_string(),
            message: format!(
                "Mesh is not manifold ({} non-manifold edges)",
                report.non_manifold_edge_count
            ),
            severity: "warning".to_string(),
        });
    }

    let edges = mesh.boundary_edges();
    let mut segments = Vec::new();
    for &code in &report.segment_codes {
        let code_edges = edges.get(&code).map(Vec::as_slice).unwrap_or_default();
        let shape = classify_edges(code_edges);
        let mergeable = shape.is_walkable();
        if !mergeable {
            issues.push(IssueInfo {
                category: "boundary".to_string(),
                message: format!(
                    "Segment code {} cannot be bridged: {}",
                    code,
                    shape_name(&shape)
                ),
                severity: "warning".to_string(),
            });
        }
        segments.push(SegmentInfo {
            code,
            edges: code_edges.len(),
            shape: shape_name(&shape),
            mergeable,
        });
    }

    let valid = issues.iter().all(|i| match i.severity.as_str() {
        "error" => false,
        "warning" => !strict,
        _ => true,
    });

    let result = ValidationResult {
        path: input.display().to_string(),
        valid,
        issues,
        segments,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Validation Report".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());

                if result.valid {
                    println!("  {}: {}", "Status".cyan(), "Valid".green().bold());
                } else {
                    println!("  {}: {}", "Status".cyan(), "Issues found".red().bold());
                }

                if !result.segments.is_empty() {
                    println!("\n{}", "Segments:".bold());
                    for s in &result.segments {
                        let mark = if s.mergeable { "✓".green() } else { "✗".red() };
                        println!("  {} code {}: {} edges, {}", mark, s.code, s.edges, s.shape);
                    }
                }

                if !result.issues.is_empty() {
                    println!("\n{}", "Issues:".bold());
                    for issue in &result.issues {
                        let icon = match issue.severity.as_str() {
                            "error" => "✗".red(),
                            "warning" => "⚠".yellow(),
                            _ => "ℹ".blue(),
                        };
                        println!("  {} [{}] {}", icon, issue.category, issue.message);
                    }
                }
            }
        }
    }

    // Exit with error code if invalid
    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}
