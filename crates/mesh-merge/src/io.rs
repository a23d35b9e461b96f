//! Mesh and grid file I/O.
//!
//! The mesh text format is a fixed-column layout:
//!
//! ```text
//! 100079  1000  <node_count>  <projection>
//! <id:10> <x:16.10> <y:16.10> <z:16.10> <code:6>      (one line per node)
//! <element_count:10><4:12><25:11>
//! <id:12><node 1:12>...<node k:12>                    (one line per element)
//! ```
//!
//! Ids on disk are 1-based. Readers accept any whitespace between fields
//! and ignore trailing zero node ids on element lines.
//!
//! Grids are read from ESRI ASCII raster files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::grid::StructuredGrid;
use crate::tracing_ext::log_io_operation;
use crate::types::{BoundaryCode, Element, Mesh, Node};

/// Format version written in the header.
pub const FORMAT_VERSION: u32 = 100079;

/// Second header field; carried for compatibility, never read.
pub const HEADER_UNIT: u32 = 1000;

/// Projection written when a mesh carries none.
pub const DEFAULT_PROJECTION: &str = "UTM-48";

/// Nodes-per-element column of the element header.
pub const ELEMENT_HEADER_NODES: u32 = 4;

/// Element type column of the element header.
pub const ELEMENT_HEADER_TYPE: u32 = 25;

/// Write a mesh in the text format.
///
/// Node and element ids are written 1-based. Triangles are written with
/// three node ids, quads with four.
pub fn write_mesh<W: Write>(mesh: &Mesh, writer: &mut W) -> std::io::Result<()> {
    let projection = mesh.projection.as_deref().unwrap_or(DEFAULT_PROJECTION);
    writeln!(
        writer,
        "{}  {}  {}  {}",
        FORMAT_VERSION,
        HEADER_UNIT,
        mesh.node_count(),
        projection
    )?;

    for (i, node) in mesh.nodes.iter().enumerate() {
        let p = &node.position;
        writeln!(
            writer,
            "{:10} {:16.10} {:16.10} {:16.10} {:6}",
            i + 1,
            p.x,
            p.y,
            p.z,
            node.code
        )?;
    }

    writeln!(
        writer,
        "{:10}{:12}{:11}",
        mesh.element_count(),
        ELEMENT_HEADER_NODES,
        ELEMENT_HEADER_TYPE
    )?;

    for (i, element) in mesh.elements.iter().enumerate() {
        write!(writer, "{:12}", i + 1)?;
        for &n in element.nodes() {
            write!(writer, "{:12}", n + 1)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Render a mesh to a string in the text format.
pub fn mesh_to_string(mesh: &Mesh) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec<u8> cannot fail
    let _ = write_mesh(mesh, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Save a mesh to a file in the text format.
pub fn save_mesh(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    info!("Saving mesh to {:?}", path);

    let file = File::create(path).map_err(|e| MeshError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);
    write_mesh(mesh, &mut writer).map_err(|e| MeshError::io_write(path, e))?;
    writer.flush().map_err(|e| MeshError::io_write(path, e))?;

    info!(
        "Saved {} nodes, {} elements to {:?}",
        mesh.node_count(),
        mesh.element_count(),
        path
    );
    log_io_operation("save_mesh", path, true);
    Ok(())
}

/// Load a mesh from a file in the text format.
pub fn load_mesh(path: &Path) -> MeshResult<Mesh> {
    info!("Loading mesh from {:?}", path);

    let text = std::fs::read_to_string(path).map_err(|e| MeshError::io_read(path, e))?;
    let mesh = parse_mesh(&text, path)?;

    info!(
        "Loaded mesh: {} nodes, {} elements, segment codes {:?}",
        mesh.node_count(),
        mesh.element_count(),
        mesh.segment_codes()
    );
    log_io_operation("load_mesh", path, true);
    Ok(mesh)
}

/// Non-blank lines with their 1-based line numbers.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    path: &'a Path,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str, path: &'a Path) -> Self {
        Self {
            inner: text.lines().enumerate(),
            path,
        }
    }

    fn next_line(&mut self, what: &str) -> MeshResult<(usize, &'a str)> {
        for (i, line) in self.inner.by_ref() {
            if !line.trim().is_empty() {
                return Ok((i + 1, line));
            }
        }
        Err(MeshError::parse_error(
            self.path,
            None,
            format!("unexpected end of file, expected {}", what),
        ))
    }

    fn error(&self, line: usize, details: impl Into<String>) -> MeshError {
        MeshError::parse_error(self.path, Some(line), details)
    }
}

fn parse_field<T: std::str::FromStr>(
    path: &Path,
    line: usize,
    token: Option<&str>,
    what: &str,
) -> MeshResult<T> {
    let token = token
        .ok_or_else(|| MeshError::parse_error(path, Some(line), format!("missing {}", what)))?;
    token.parse().map_err(|_| {
        MeshError::parse_error(path, Some(line), format!("invalid {} `{}`", what, token))
    })
}

/// Parse a mesh from text. `path` is only used in error messages.
pub fn parse_mesh(text: &str, path: &Path) -> MeshResult<Mesh> {
    let mut lines = Lines::new(text, path);

    let (line_no, header) = lines.next_line("header")?;
    let mut tokens = header.split_whitespace();
    let _version: i64 = parse_field(path, line_no, tokens.next(), "format version")?;
    let _unit: i64 = parse_field(path, line_no, tokens.next(), "header unit")?;
    let node_count: usize = parse_field(path, line_no, tokens.next(), "node count")?;
    let projection = tokens.collect::<Vec<_>>().join(" ");

    let mut mesh = Mesh::with_capacity(node_count.min(1 << 20), 0);
    mesh.projection = (!projection.is_empty()).then_some(projection);

    for _ in 0..node_count {
        let (line_no, line) = lines.next_line("node line")?;
        let mut tokens = line.split_whitespace();
        let _id: u64 = parse_field(path, line_no, tokens.next(), "node id")?;
        let x: f64 = parse_field(path, line_no, tokens.next(), "x coordinate")?;
        let y: f64 = parse_field(path, line_no, tokens.next(), "y coordinate")?;
        let z: f64 = parse_field(path, line_no, tokens.next(), "z coordinate")?;
        let code: BoundaryCode = parse_field(path, line_no, tokens.next(), "boundary code")?;
        mesh.nodes.push(Node::from_coords(x, y, z, code));
    }

    let (line_no, line) = lines.next_line("element header")?;
    let mut tokens = line.split_whitespace();
    let element_count: usize = parse_field(path, line_no, tokens.next(), "element count")?;
    let _per_element: u32 = parse_field(path, line_no, tokens.next(), "nodes per element")?;
    let _element_type: u32 = parse_field(path, line_no, tokens.next(), "element type")?;
    mesh.elements.reserve(element_count.min(1 << 20));

    for element_index in 0..element_count {
        let (line_no, line) = lines.next_line("element line")?;
        let mut tokens = line.split_whitespace();
        let _id: u64 = parse_field(path, line_no, tokens.next(), "element id")?;

        let mut ids = Vec::with_capacity(4);
        for token in tokens {
            let id: u32 = parse_field(path, line_no, Some(token), "node id")?;
            ids.push(id);
        }
        while ids.last() == Some(&0) {
            ids.pop();
        }

        let mut nodes = Vec::with_capacity(ids.len());
        for id in ids {
            if id == 0 || id as usize > node_count {
                return Err(lines.error(
                    line_no,
                    format!(
                        "element {} references node {} but the mesh has {} nodes",
                        element_index + 1,
                        id,
                        node_count
                    ),
                ));
            }
            nodes.push(id - 1);
        }

        let element = Element::from_slice(&nodes).ok_or_else(|| {
            lines.error(
                line_no,
                format!(
                    "element {} has {} nodes, expected 3 or 4",
                    element_index + 1,
                    nodes.len()
                ),
            )
        })?;
        mesh.elements.push(element);
    }

    debug!(
        nodes = mesh.node_count(),
        elements = mesh.element_count(),
        "Parsed mesh text"
    );
    Ok(mesh)
}

/// Load an ESRI ASCII grid.
pub fn load_ascii_grid(path: &Path) -> MeshResult<StructuredGrid> {
    info!("Loading grid from {:?}", path);
    let text = std::fs::read_to_string(path).map_err(|e| MeshError::io_read(path, e))?;
    let grid = parse_ascii_grid(&text, path)?;
    info!("Loaded grid: {} x {} cells", grid.nx, grid.ny);
    log_io_operation("load_ascii_grid", path, true);
    Ok(grid)
}

/// Parse an ESRI ASCII grid. `path` is only used in error messages.
///
/// Header keys are case-insensitive. Rows in the file run north to south;
/// the returned grid stores row 0 as the southernmost. `NODATA_value`
/// cells become NaN. Lower-left corner coordinates are shifted by half a
/// cell so `x0`, `y0` always name the first cell centre.
pub fn parse_ascii_grid(text: &str, path: &Path) -> MeshResult<StructuredGrid> {
    let mut ncols: Option<usize> = None;
    let mut nrows: Option<usize> = None;
    let mut x: Option<(f64, bool)> = None;
    let mut y: Option<(f64, bool)> = None;
    let mut cellsize: Option<f64> = None;
    let mut nodata: Option<f64> = None;
    let mut values: Vec<f64> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };

        if values.is_empty() && first.starts_with(|c: char| c.is_ascii_alphabetic()) {
            let key = first.to_ascii_lowercase();
            let value = tokens.next();
            match key.as_str() {
                "ncols" => ncols = Some(parse_field(path, line_no, value, "ncols")?),
                "nrows" => nrows = Some(parse_field(path, line_no, value, "nrows")?),
                "xllcorner" => x = Some((parse_field(path, line_no, value, "xllcorner")?, true)),
                "xllcenter" => x = Some((parse_field(path, line_no, value, "xllcenter")?, false)),
                "yllcorner" => y = Some((parse_field(path, line_no, value, "yllcorner")?, true)),
                "yllcenter" => y = Some((parse_field(path, line_no, value, "yllcenter")?, false)),
                "cellsize" => cellsize = Some(parse_field(path, line_no, value, "cellsize")?),
                "nodata_value" => {
                    nodata = Some(parse_field(path, line_no, value, "NODATA_value")?)
                }
                _ => {
                    return Err(MeshError::parse_error(
                        path,
                        Some(line_no),
                        format!("unknown header key `{}`", first),
                    ));
                }
            }
            continue;
        }

        for token in std::iter::once(first).chain(tokens) {
            values.push(parse_field(path, line_no, Some(token), "cell value")?);
        }
    }

    let missing = |key: &str| MeshError::parse_error(path, None, format!("missing `{}` header", key));
    let nx = ncols.ok_or_else(|| missing("ncols"))?;
    let ny = nrows.ok_or_else(|| missing("nrows"))?;
    let cell = cellsize.ok_or_else(|| missing("cellsize"))?;
    let (xll, x_corner) = x.ok_or_else(|| missing("xllcorner"))?;
    let (yll, y_corner) = y.ok_or_else(|| missing("yllcorner"))?;

    if values.len() != nx * ny {
        return Err(MeshError::parse_error(
            path,
            None,
            format!(
                "expected {} x {} = {} cell values, found {}",
                nx,
                ny,
                nx * ny,
                values.len()
            ),
        ));
    }

    let mut south_first = Vec::with_capacity(values.len());
    for row in values.chunks(nx.max(1)).rev() {
        south_first.extend(row.iter().map(|&v| match nodata {
            Some(nd) if v == nd => f64::NAN,
            _ => v,
        }));
    }

    let half = cell / 2.0;
    let grid = StructuredGrid {
        nx,
        ny,
        x0: if x_corner { xll + half } else { xll },
        y0: if y_corner { yll + half } else { yll },
        dx: cell,
        dy: cell,
        orientation: 0.0,
        values: south_first,
    };
    grid.check()?;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sample() -> Mesh {
        let mut mesh = Mesh::from_arrays(
            &[
                [0.0, 0.0, 0.0],
                [1.5, 0.0, 0.0],
                [1.5, 2.25, 0.0],
                [-3.125, 1.0, 0.0],
                [2.5, 1.0, 0.0],
            ],
            &[vec![0, 1, 2, 3], vec![1, 4, 2]],
            &[1, 2, 2, 0, 1],
        )
        .unwrap();
        mesh.projection = Some("UTM-32".into());
        mesh
    }

    #[test]
    fn test_write_fixed_columns() {
        let text = mesh_to_string(&sample());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "100079  1000  5  UTM-32");
        assert_eq!(
            lines[1],
            "         1     0.0000000000     0.0000000000     0.0000000000      1"
        );
        assert_eq!(
            lines[4],
            "         4    -3.1250000000     1.0000000000     0.0000000000      0"
        );
        assert_eq!(lines[6], "         2           4         25");
        assert_eq!(
            lines[7],
            "           1           1           2           3           4"
        );
        assert_eq!(lines[8], "           2           2           5           3");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_default_projection() {
        let mut mesh = sample();
        mesh.projection = None;
        assert!(mesh_to_string(&mesh).starts_with("100079  1000  5  UTM-48\n"));
    }

    #[test]
    fn test_parse_round_trip() {
        let mesh = sample();
        let parsed = parse_mesh(&mesh_to_string(&mesh), Path::new("sample.mesh")).unwrap();
        assert_eq!(parsed, mesh);
    }

    #[test]
    fn test_parse_ignores_zero_padding() {
        let text = "100079 1000 3 LONG/LAT\n\
                    1 0 0 0 1\n\
                    2 1 0 0 1\n\
                    3 0 1 0 1\n\
                    1 3 21\n\
                    1 1 2 3 0\n";
        let mesh = parse_mesh(text, Path::new("t.mesh")).unwrap();
        assert_eq!(mesh.elements, vec![Element::Triangle([0, 1, 2])]);
        assert_eq!(mesh.projection.as_deref(), Some("LONG/LAT"));
    }

    #[test]
    fn test_parse_reports_line() {
        let text = "100079 1000 2 UTM-48\n1 0 0 0 1\n2 abc 0 0 1\n";
        match parse_mesh(text, Path::new("bad.mesh")).unwrap_err() {
            MeshError::ParseError { line, details, .. } => {
                assert_eq!(line, Some(3));
                assert!(details.contains("x coordinate"));
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range_node() {
        let text = "100079 1000 3 UTM-48\n1 0 0 0 1\n2 1 0 0 1\n3 0 1 0 1\n1 4 25\n1 1 2 7\n";
        assert!(parse_mesh(text, Path::new("bad.mesh")).is_err());
    }

    #[test]
    fn test_parse_oversized_element_count() {
        let text = "100079 1000 1 UTM-48\n1 0 0 0 1\n99999999999999 4 25\n1 1 1 1\n";
        match parse_mesh(text, Path::new("huge.mesh")).unwrap_err() {
            MeshError::ParseError { details, .. } => assert!(details.contains("end of file")),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_truncated() {
        let text = "100079 1000 3 UTM-48\n1 0 0 0 1\n";
        match parse_mesh(text, Path::new("short.mesh")).unwrap_err() {
            MeshError::ParseError { details, .. } => assert!(details.contains("end of file")),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.mesh");
        let mesh = sample();
        save_mesh(&mesh, &path).unwrap();
        assert_eq!(load_mesh(&path).unwrap(), mesh);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_mesh(&PathBuf::from("/nonexistent/x.mesh")).unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::IoRead);
    }

    #[test]
    fn test_parse_ascii_grid() {
        let text = "ncols 3\nnrows 2\nxllcorner 100.0\nyllcorner 200.0\ncellsize 10\n\
                    NODATA_value -9999\n\
                    1 2 3\n\
                    4 -9999 6\n";
        let grid = parse_ascii_grid(text, Path::new("g.asc")).unwrap();
        assert_eq!((grid.nx, grid.ny), (3, 2));
        assert_eq!((grid.x0, grid.y0), (105.0, 205.0));
        // Southern row first
        assert_eq!(grid.value(0, 0), 4.0);
        assert!(grid.value(1, 0).is_nan());
        assert_eq!(grid.value(2, 1), 3.0);
    }

    #[test]
    fn test_parse_ascii_grid_wrong_count() {
        let text = "ncols 2\nnrows 2\nxllcenter 0\nyllcenter 0\ncellsize 1\n1 2 3\n";
        assert!(parse_ascii_grid(text, Path::new("g.asc")).is_err());
    }
}
