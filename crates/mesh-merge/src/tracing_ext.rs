//! Tracing extensions for mesh operations.
//!
//! This module provides structured logging and timing for merge operations.
//! It integrates with the `tracing` ecosystem to provide:
//!
//! - **Performance spans**: Track operation timing with [`OperationTimer`]
//! - **Structured fields**: Log node, element and bridge counts
//! - **Debug logging**: Detailed state logging for troubleshooting
//!
//! # Usage
//!
//! Enable tracing by initializing a subscriber in your application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // Set RUST_LOG=mesh_merge=debug for detailed output
//! ```
//!
//! # Log Levels
//!
//! - **WARN**: Midpoint connector fallbacks, elements dropped after dedup
//! - **INFO**: Operation summaries, timing
//! - **DEBUG**: Per-step progress (boundary paths, bridge graphs)
//! - **TRACE**: Per-edge and per-vertex detail

use std::time::Instant;
use tracing::{Span, debug, info, warn};

use crate::merge::MergeResult;

/// A performance timer that logs duration on drop.
///
/// # Example
///
/// ```rust,ignore
/// use mesh_merge::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // Timer logs duration when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("mesh_operation", operation = name);
        debug!(target: "mesh_merge::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer with node and element counts attached.
    pub fn with_context(name: &'static str, node_count: usize, element_count: usize) -> Self {
        let span = tracing::info_span!(
            "mesh_operation",
            operation = name,
            nodes = node_count,
            elements = element_count
        );
        debug!(
            target: "mesh_merge::timing",
            operation = name,
            nodes = node_count,
            elements = element_count,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "mesh_merge::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &crate::Mesh, context: &str) {
    let (min_bounds, max_bounds) = mesh.bounds().unwrap_or_default();
    let dims = max_bounds - min_bounds;

    debug!(
        target: "mesh_merge::mesh_state",
        context = context,
        nodes = mesh.node_count(),
        elements = mesh.element_count(),
        triangles = mesh.triangle_count(),
        quads = mesh.quad_count(),
        segment_codes = format!("{:?}", mesh.segment_codes()),
        extent = format!("{:.3} x {:.3}", dims.x, dims.y),
        "Mesh state"
    );
}

/// Log a merge result summary.
pub fn log_merge_result(result: &MergeResult) {
    info!(
        target: "mesh_merge::merge",
        bridges = result.bridges.len(),
        input_nodes = result.input_nodes,
        bridge_nodes = result.bridge_nodes,
        nodes = result.mesh.node_count(),
        duplicates_collapsed = result.duplicates_collapsed,
        elements = result.mesh.element_count(),
        elements_dropped = result.elements_dropped,
        "Merge completed"
    );

    for bridge in &result.bridges {
        debug!(
            target: "mesh_merge::merge",
            codes = format!("{} <-> {}", bridge.first_code, bridge.second_code),
            path_nodes = format!("{} / {}", bridge.first_path_len, bridge.second_path_len),
            pslg_vertices = bridge.pslg_vertices,
            pslg_segments = bridge.pslg_segments,
            triangles = bridge.triangles,
            fallbacks = bridge.fallback_connectors,
            "Bridge"
        );
    }

    if result.elements_dropped > 0 {
        warn!(
            target: "mesh_merge::merge",
            dropped = result.elements_dropped,
            "Elements collapsed by node dedup were dropped"
        );
    }
}

/// Log a file I/O operation.
pub fn log_io_operation(operation: &str, path: &std::path::Path, success: bool) {
    if success {
        info!(
            target: "mesh_merge::io",
            operation = operation,
            path = path.display().to_string(),
            "I/O operation completed"
        );
    } else {
        warn!(
            target: "mesh_merge::io",
            operation = operation,
            path = path.display().to_string(),
            "I/O operation failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mesh;

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::new("test_operation");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10.0);
    }

    #[test]
    fn test_log_mesh_stats() {
        let mesh = Mesh::new();
        // Just verify it doesn't panic
        log_mesh_stats(&mesh, "test");
    }
}
