//! Error types for mesh merging with rich diagnostics.
//!
//! This module provides:
//! - Machine-readable error codes for programmatic handling
//! - Context about where things went wrong (node, element, boundary code, file)
//! - Recovery suggestions for common issues
//! - Terminal display via miette
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `MESH-XXXX`:
//! - `MESH-1xxx`: I/O errors (file reading, writing, parsing)
//! - `MESH-2xxx`: Validation errors (indices, coordinates, parameters)
//! - `MESH-3xxx`: Merge errors (boundary pairing, bridging, triangulation)
//!
//! # Example
//!
//! ```
//! use mesh_merge::{ErrorCode, MeshError};
//!
//! let err = MeshError::boundary_code_mismatch(vec![2, 3], vec![2]);
//! assert_eq!(err.code(), ErrorCode::BoundaryCodeMismatch);
//! assert_eq!(err.code().as_str(), "MESH-3001");
//! ```

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::BoundaryCode;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Machine-readable error codes.
///
/// Codes follow the pattern `MESH-XXXX` where:
/// - 1xxx = I/O errors
/// - 2xxx = Validation errors
/// - 3xxx = Merge errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // I/O errors (1xxx)
    /// MESH-1001: Failed to read file
    IoRead = 1001,
    /// MESH-1002: Failed to write file
    IoWrite = 1002,
    /// MESH-1003: Failed to parse file
    ParseError = 1003,

    // Validation errors (2xxx)
    /// MESH-2001: Element references invalid node index
    InvalidNodeIndex = 2001,
    /// MESH-2002: Node has NaN or Infinity coordinate
    InvalidCoordinate = 2002,
    /// MESH-2003: Mesh has no nodes or elements
    EmptyMesh = 2003,
    /// MESH-2010: Invalid operation parameter
    InvalidParameter = 2010,

    // Merge errors (3xxx)
    /// MESH-3001: Meshes carry different numbers of boundary segments
    BoundaryCodeMismatch = 3001,
    /// MESH-3002: Boundary edges do not form a single simple path
    MalformedBoundary = 3002,
    /// MESH-3003: Boundary curve too short to bridge
    DegenerateBoundary = 3003,
    /// MESH-3004: Constrained triangulation failed
    TriangulationFailed = 3004,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `MESH-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "MESH-1001",
            ErrorCode::IoWrite => "MESH-1002",
            ErrorCode::ParseError => "MESH-1003",
            ErrorCode::InvalidNodeIndex => "MESH-2001",
            ErrorCode::InvalidCoordinate => "MESH-2002",
            ErrorCode::EmptyMesh => "MESH-2003",
            ErrorCode::InvalidParameter => "MESH-2010",
            ErrorCode::BoundaryCodeMismatch => "MESH-3001",
            ErrorCode::MalformedBoundary => "MESH-3002",
            ErrorCode::DegenerateBoundary => "MESH-3003",
            ErrorCode::TriangulationFailed => "MESH-3004",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for mesh errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Re-export the file from the original software.
    ReexportFile { format: Option<String> },
    /// Check the input mesh for issues.
    CheckSourceMesh { checks: Vec<String> },
    /// Fix the boundary codes of one of the inputs.
    FixBoundaryCodes { details: String },
    /// Adjust parameters for the operation.
    AdjustParameters { parameters: Vec<(String, String)> },
    /// Manual intervention may be required.
    ManualIntervention { description: String },
    /// No automatic recovery available.
    None,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::ReexportFile { format } => {
                if let Some(fmt) = format {
                    write!(f, "Try re-exporting the mesh as {} from the original software", fmt)
                } else {
                    write!(f, "Try re-exporting the mesh from the original software")
                }
            }
            RecoverySuggestion::CheckSourceMesh { checks } => {
                write!(f, "Check the source mesh for: {}", checks.join(", "))
            }
            RecoverySuggestion::FixBoundaryCodes { details } => {
                write!(f, "Fix the boundary codes: {}", details)
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
            RecoverySuggestion::ManualIntervention { description } => {
                write!(f, "{}", description)
            }
            RecoverySuggestion::None => {
                write!(f, "No automatic recovery available")
            }
        }
    }
}

/// Location information for mesh errors.
#[derive(Debug, Clone)]
pub enum MeshLocation {
    /// Error at a specific node.
    Node { index: usize },
    /// Error at a specific element.
    Element { index: usize },
    /// Error on the boundary segment carrying a code.
    Segment { code: BoundaryCode },
    /// Error in a file at a specific line.
    File { path: PathBuf, line: Option<usize> },
}

impl std::fmt::Display for MeshLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshLocation::Node { index } => write!(f, "node {}", index),
            MeshLocation::Element { index } => write!(f, "element {}", index),
            MeshLocation::Segment { code } => write!(f, "boundary segment with code {}", code),
            MeshLocation::File { path, line } => {
                write!(f, "{}", path.display())?;
                if let Some(l) = line {
                    write!(f, ":{}", l)?;
                }
                Ok(())
            }
        }
    }
}

/// Errors that can occur while reading, validating or merging meshes.
#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    /// Error reading from a file.
    #[error("failed to read mesh from {path}")]
    #[diagnostic(
        code(mesh::io::read),
        help("Check that the file exists and is readable. Try: ls -la {}", path.display())
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write mesh to {path}")]
    #[diagnostic(
        code(mesh::io::write),
        help("Check that the directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a mesh or grid file.
    #[error("failed to parse {path}{}: {details}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    #[diagnostic(
        code(mesh::parse::error),
        help("The file may be truncated or written by an incompatible tool.")
    )]
    ParseError {
        path: PathBuf,
        line: Option<usize>,
        details: String,
    },

    /// Empty mesh (no nodes or elements).
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(mesh::validation::empty),
        help("The mesh must have at least one node and one element.")
    )]
    EmptyMesh { details: String },

    /// Element references a node that does not exist.
    #[error(
        "invalid node index: element {element_index} references node {node_index}, but mesh only has {node_count} nodes"
    )]
    #[diagnostic(
        code(mesh::validation::node_index),
        help("Check the element table of the input mesh; indices are 0-based in memory and 1-based on disk.")
    )]
    InvalidNodeIndex {
        element_index: usize,
        node_index: u32,
        node_count: usize,
    },

    /// Invalid coordinate value (NaN or Infinity).
    #[error("invalid coordinate at node {node_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(mesh::validation::coordinate),
        help("Check for numerical issues in the source data.")
    )]
    InvalidCoordinate {
        node_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// Invalid operation parameter.
    #[error("invalid parameter `{name}`: {details}")]
    #[diagnostic(code(mesh::validation::parameter))]
    InvalidParameter { name: &'static str, details: String },

    /// The two meshes carry different numbers of boundary segment codes.
    #[error(
        "meshes have different number of boundary codes: {} vs {} (first: {first:?}, second: {second:?})",
        first.len(),
        second.len()
    )]
    #[diagnostic(
        code(mesh::merge::code_mismatch),
        help("Segment codes > 1 are paired by rank; both meshes need the same number of them.")
    )]
    BoundaryCodeMismatch {
        first: Vec<BoundaryCode>,
        second: Vec<BoundaryCode>,
    },

    /// Boundary edges of one code do not form a single simple path.
    #[error("malformed boundary{}: {details}", code.map(|c| format!(" (code {})", c)).unwrap_or_default())]
    #[diagnostic(
        code(mesh::merge::malformed_boundary),
        help("Each segment code must label exactly one open chain of boundary edges.")
    )]
    MalformedBoundary {
        code: Option<BoundaryCode>,
        details: String,
    },

    /// A boundary curve cannot be bridged.
    #[error("degenerate boundary curve: {details}")]
    #[diagnostic(code(mesh::merge::degenerate_boundary))]
    DegenerateBoundary { details: String },

    /// The constrained triangulation rejected the bridging graph.
    #[error("triangulation failed: {details}")]
    #[diagnostic(
        code(mesh::merge::triangulation),
        help("The bridging graph may self-intersect; check that the paired segments face each other.")
    )]
    TriangulationFailed { details: String },
}

impl MeshError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::IoRead { .. } => ErrorCode::IoRead,
            MeshError::IoWrite { .. } => ErrorCode::IoWrite,
            MeshError::ParseError { .. } => ErrorCode::ParseError,
            MeshError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            MeshError::InvalidNodeIndex { .. } => ErrorCode::InvalidNodeIndex,
            MeshError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            MeshError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            MeshError::BoundaryCodeMismatch { .. } => ErrorCode::BoundaryCodeMismatch,
            MeshError::MalformedBoundary { .. } => ErrorCode::MalformedBoundary,
            MeshError::DegenerateBoundary { .. } => ErrorCode::DegenerateBoundary,
            MeshError::TriangulationFailed { .. } => ErrorCode::TriangulationFailed,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            MeshError::IoRead { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["file exists".into(), "file permissions".into()],
            },
            MeshError::IoWrite { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["directory exists".into(), "write permissions".into()],
            },
            MeshError::ParseError { .. } => RecoverySuggestion::ReexportFile {
                format: Some(".mesh".into()),
            },
            MeshError::EmptyMesh { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["mesh has nodes and elements".into()],
            },
            MeshError::InvalidNodeIndex { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["element table".into(), "node count in header".into()],
            },
            MeshError::InvalidCoordinate { .. } => RecoverySuggestion::CheckSourceMesh {
                checks: vec!["coordinate values".into(), "export precision".into()],
            },
            MeshError::InvalidParameter { name, .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![((*name).into(), "use a finite positive value".into())],
            },
            MeshError::BoundaryCodeMismatch { .. } => RecoverySuggestion::FixBoundaryCodes {
                details: "give both meshes the same number of segment codes (> 1)".into(),
            },
            MeshError::MalformedBoundary { .. } => RecoverySuggestion::FixBoundaryCodes {
                details: "split branching or disconnected segments into separate codes".into(),
            },
            MeshError::DegenerateBoundary { .. } => RecoverySuggestion::FixBoundaryCodes {
                details: "each paired segment needs at least one boundary edge of non-zero length"
                    .into(),
            },
            MeshError::TriangulationFailed { .. } => RecoverySuggestion::ManualIntervention {
                description: "Check that the paired boundary segments face each other and do not overlap"
                    .into(),
            },
        }
    }

    /// Returns location information if available.
    pub fn location(&self) -> Option<MeshLocation> {
        match self {
            MeshError::InvalidNodeIndex { element_index, .. } => Some(MeshLocation::Element {
                index: *element_index,
            }),
            MeshError::InvalidCoordinate { node_index, .. } => Some(MeshLocation::Node {
                index: *node_index,
            }),
            MeshError::MalformedBoundary { code: Some(code), .. } => {
                Some(MeshLocation::Segment { code: *code })
            }
            MeshError::ParseError { path, line, .. } => Some(MeshLocation::File {
                path: path.clone(),
                line: *line,
            }),
            MeshError::IoRead { path, .. } | MeshError::IoWrite { path, .. } => {
                Some(MeshLocation::File {
                    path: path.clone(),
                    line: None,
                })
            }
            _ => None,
        }
    }

    /// Attach a boundary code to a `MalformedBoundary` error that lacks one.
    pub fn for_code(self, code: BoundaryCode) -> Self {
        match self {
            MeshError::MalformedBoundary { code: None, details } => MeshError::MalformedBoundary {
                code: Some(code),
                details,
            },
            other => other,
        }
    }

    // Constructor helpers for common error patterns

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create an IoWrite error.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError.
    pub fn parse_error(
        path: impl Into<PathBuf>,
        line: Option<usize>,
        details: impl Into<String>,
    ) -> Self {
        MeshError::ParseError {
            path: path.into(),
            line,
            details: details.into(),
        }
    }

    /// Create an EmptyMesh error.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        MeshError::EmptyMesh {
            details: details.into(),
        }
    }

    /// Create an InvalidNodeIndex error.
    pub fn invalid_node_index(element_index: usize, node_index: u32, node_count: usize) -> Self {
        MeshError::InvalidNodeIndex {
            element_index,
            node_index,
            node_count,
        }
    }

    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(node_index: usize, coordinate: &'static str, value: f64) -> Self {
        MeshError::InvalidCoordinate {
            node_index,
            coordinate,
            value,
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(name: &'static str, details: impl Into<String>) -> Self {
        MeshError::InvalidParameter {
            name,
            details: details.into(),
        }
    }

    /// Create a BoundaryCodeMismatch error.
    pub fn boundary_code_mismatch(first: Vec<BoundaryCode>, second: Vec<BoundaryCode>) -> Self {
        MeshError::BoundaryCodeMismatch { first, second }
    }

    /// Create a MalformedBoundary error with no code attached yet.
    pub fn malformed_boundary(details: impl Into<String>) -> Self {
        MeshError::MalformedBoundary {
            code: None,
            details: details.into(),
        }
    }

    /// Create a DegenerateBoundary error.
    pub fn degenerate_boundary(details: impl Into<String>) -> Self {
        MeshError::DegenerateBoundary {
            details: details.into(),
        }
    }

    /// Create a TriangulationFailed error.
    pub fn triangulation_failed(details: impl Into<String>) -> Self {
        MeshError::TriangulationFailed {
            details: details.into(),
        }
    }
}

/// Validation issues collected while checking mesh data.
///
/// Unlike `MeshError`, these may be warnings, and several can be collected
/// without stopping validation.
#[derive(Debug, Clone)]
pub enum ValidationIssue {
    /// Element references a node index that doesn't exist.
    InvalidNodeIndex {
        element_index: usize,
        node_index: u32,
        node_count: usize,
    },
    /// Node has NaN coordinate.
    NaNCoordinate {
        node_index: usize,
        coordinate: &'static str,
    },
    /// Node has infinite coordinate.
    InfiniteCoordinate {
        node_index: usize,
        coordinate: &'static str,
        value: f64,
    },
    /// Element lists the same node more than once.
    RepeatedNode { element_index: usize },
    /// Node is not referenced by any element.
    UnreferencedNode { node_index: usize },
}

impl ValidationIssue {
    /// Returns a severity level for the issue.
    pub fn severity(&self) -> IssueSeverity {
        match self {
            ValidationIssue::InvalidNodeIndex { .. } => IssueSeverity::Error,
            ValidationIssue::NaNCoordinate { .. } => IssueSeverity::Error,
            ValidationIssue::InfiniteCoordinate { .. } => IssueSeverity::Error,
            ValidationIssue::RepeatedNode { .. } => IssueSeverity::Warning,
            ValidationIssue::UnreferencedNode { .. } => IssueSeverity::Info,
        }
    }

    /// Returns an error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationIssue::InvalidNodeIndex { .. } => "MESH-2001",
            ValidationIssue::NaNCoordinate { .. } => "MESH-2002",
            ValidationIssue::InfiniteCoordinate { .. } => "MESH-2002",
            ValidationIssue::RepeatedNode { .. } => "MESH-2005",
            ValidationIssue::UnreferencedNode { .. } => "MESH-2006",
        }
    }
}

/// Severity levels for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueSeverity {
    /// Informational, no action needed.
    Info,
    /// Warning, mesh may have issues.
    Warning,
    /// Error, mesh is invalid.
    Error,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::InvalidNodeIndex {
                element_index,
                node_index,
                node_count,
            } => write!(
                f,
                "element {} references node {}, but mesh only has {} nodes",
                element_index, node_index, node_count
            ),
            ValidationIssue::NaNCoordinate {
                node_index,
                coordinate,
            } => write!(f, "node {} has NaN {} coordinate", node_index, coordinate),
            ValidationIssue::InfiniteCoordinate {
                node_index,
                coordinate,
                value,
            } => write!(
                f,
                "node {} has infinite {} coordinate ({})",
                node_index, coordinate, value
            ),
            ValidationIssue::RepeatedNode { element_index } => {
                write!(f, "element {} lists a node more than once", element_index)
            }
            ValidationIssue::UnreferencedNode { node_index } => {
                write!(f, "node {} is not used by any element", node_index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = MeshError::invalid_node_index(5, 100, 50);
        assert_eq!(err.code(), ErrorCode::InvalidNodeIndex);
        assert_eq!(err.code().as_str(), "MESH-2001");
        assert_eq!(
            MeshError::triangulation_failed("x").code().to_string(),
            "MESH-3004"
        );
    }

    #[test]
    fn test_mismatch_display_lists_codes() {
        let err = MeshError::boundary_code_mismatch(vec![2, 3], vec![2]);
        let display = err.to_string();
        assert!(display.contains("2 vs 1"));
        assert!(display.contains("[2, 3]"));
    }

    #[test]
    fn test_for_code_fills_missing_code() {
        let err = MeshError::malformed_boundary("branching at node 4").for_code(7);
        match &err {
            MeshError::MalformedBoundary { code, .. } => assert_eq!(*code, Some(7)),
            _ => panic!("Expected MalformedBoundary"),
        }
        assert!(err.to_string().contains("code 7"));
        assert!(matches!(
            err.location(),
            Some(MeshLocation::Segment { code: 7 })
        ));

        // Other errors pass through untouched
        let other = MeshError::degenerate_boundary("x").for_code(7);
        assert_eq!(other.code(), ErrorCode::DegenerateBoundary);
    }

    #[test]
    fn test_parse_error_location() {
        let err = MeshError::parse_error("a.mesh", Some(12), "bad node line");
        assert!(err.to_string().contains("at line 12"));
        match err.location() {
            Some(MeshLocation::File { line, .. }) => assert_eq!(line, Some(12)),
            _ => panic!("Expected File location"),
        }
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = MeshError::boundary_code_mismatch(vec![], vec![2]);
        assert!(matches!(
            err.recovery_suggestion(),
            RecoverySuggestion::FixBoundaryCodes { .. }
        ));
    }

    #[test]
    fn test_validation_issue_severity() {
        let issue = ValidationIssue::RepeatedNode { element_index: 0 };
        assert_eq!(issue.severity(), IssueSeverity::Warning);

        let issue = ValidationIssue::InvalidNodeIndex {
            element_index: 0,
            node_index: 100,
            node_count: 50,
        };
        assert_eq!(issue.severity(), IssueSeverity::Error);
        assert!(issue.to_string().contains("node 100"));
    }
}
