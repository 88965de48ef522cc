//! `NBLOCK` coordinate block.
//!
//! ```text
//! NBLOCK,6,SOLID,        4,        4
//! (3i9,6e21.13e3)
//!         1        0        0 0.0000000000000E+000 0.0000000000000E+000 0.0000000000000E+000
//!         2        0        0 1.0000000000000E+000
//! N,R5.3,LOC,       -1,
//! ```
//!
//! Each record is the node id, two solid-model references, then up to six
//! reals (x, y, z and three rotation angles). Trailing zero reals are
//! omitted by ANSYS. Fields are fixed-width per the format line, so a
//! negative real may touch the field before it; lines that do not fit the
//! declared widths are split on whitespace instead. The block ends at the
//! first line that does not start with three integers; that line is left for
//! the driver.

use std::io::BufRead;

use cdb_inp::{LineCursor, is_integer_token};
use cdb_model::MeshSink;
use log::debug;

use crate::error::{ImportError, Result};
use crate::options::DuplicateNodePolicy;
use crate::session::{ImportSession, NodeEntry};

const ID_FIELDS: usize = 3;
const MAX_REALS: usize = 6;

/// Field widths declared by a Fortran format line such as `(3i9,6e21.13e3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordLayout {
    int_fields: usize,
    int_width: usize,
    real_fields: usize,
    real_width: usize,
}

impl RecordLayout {
    fn parse(format: &str) -> Option<Self> {
        let inner = format.trim().strip_prefix('(')?.strip_suffix(')')?;
        let (ints, reals) = inner.split_once(',')?;
        let (int_fields, int_width) = parse_descriptor(ints, 'i')?;
        let (real_fields, real_width) = parse_descriptor(reals, 'e')?;
        if int_fields < ID_FIELDS || int_width == 0 || real_width == 0 {
            return None;
        }
        Some(Self {
            int_fields,
            int_width,
            real_fields,
            real_width,
        })
    }

    /// Cut `line` into the id fields and the real fields that are present.
    /// `None` if any field fails to parse or text is left over.
    fn split<'a>(&self, line: &'a str) -> Option<(Vec<&'a str>, Vec<&'a str>)> {
        let mut pos = 0;
        let mut ints = Vec::with_capacity(self.int_fields);
        for _ in 0..self.int_fields {
            let field = line.get(pos..pos + self.int_width)?.trim();
            if !is_integer_token(field) {
                return None;
            }
            ints.push(field);
            pos += self.int_width;
        }

        let used = line.trim_end().len();
        let mut reals = Vec::new();
        while reals.len() < self.real_fields && pos < used {
            let end = (pos + self.real_width).min(used);
            let field = line.get(pos..end)?.trim();
            parse_real(field)?;
            reals.push(field);
            pos = end;
        }
        if pos < used {
            return None;
        }
        Some((ints, reals))
    }
}

/// `3i9` -> (3, 9), `6e21.13e3` -> (6, 21).
fn parse_descriptor(desc: &str, kind: char) -> Option<(usize, usize)> {
    let desc = desc.trim().to_ascii_lowercase();
    let (count, rest) = desc.split_once(kind)?;
    let count = if count.is_empty() { 1 } else { count.parse().ok()? };
    let width = rest.split('.').next()?.parse().ok()?;
    Some((count, width))
}

/// A finite real. `nan` and `inf` parse as `f64` but are not coordinates.
fn parse_real(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// A line whose first three fields are integers, in either fixed-width or
/// whitespace-separated form.
fn is_coordinate_record(line: &str, layout: Option<RecordLayout>) -> bool {
    if layout.is_some_and(|l| l.split(line).is_some()) {
        return true;
    }
    let mut tokens = line.split_whitespace();
    (0..ID_FIELDS).all(|_| tokens.next().is_some_and(is_integer_token))
}

fn parse_coordinate_record(
    line: &str,
    layout: Option<RecordLayout>,
    line_no: usize,
) -> Result<(i64, [f64; 3])> {
    let malformed = |message: String| ImportError::MalformedNumericLine {
        line: line_no,
        message,
    };

    let (ints, reals) = match layout.and_then(|l| l.split(line)) {
        Some(fields) => fields,
        None => {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < ID_FIELDS {
                return Err(malformed(format!("expected {ID_FIELDS} id fields")));
            }
            let (ints, reals) = tokens.split_at(ID_FIELDS);
            (ints.to_vec(), reals.to_vec())
        }
    };

    let foreign = ints[0]
        .parse::<i64>()
        .map_err(|_| malformed(format!("bad node id {:?}", ints[0])))?;

    if reals.len() > MAX_REALS {
        return Err(malformed(format!(
            "node {foreign} has {} real fields, at most {MAX_REALS} allowed",
            reals.len()
        )));
    }

    let mut coords = [0.0; 3];
    for (axis, token) in reals.iter().enumerate() {
        let value = parse_real(token)
            .ok_or_else(|| malformed(format!("node {foreign}: {token:?} is not a number")))?;
        if let Some(c) = coords.get_mut(axis) {
            *c = value;
        }
    }
    Ok((foreign, coords))
}

pub(crate) fn import_nodes<R: BufRead, S: MeshSink + ?Sized>(
    cursor: &mut LineCursor<R>,
    session: &mut ImportSession<'_>,
    sink: &mut S,
) -> Result<usize> {
    cursor.next_line()?;
    let header_line = cursor.line_number();
    let Some(format) = cursor.next_line()? else {
        return Err(ImportError::UnexpectedEndOfStream {
            line: header_line,
            context: "coordinate block header",
        });
    };
    let layout = RecordLayout::parse(&format);
    if layout.is_none() {
        debug!("line {}: unrecognised format {format:?}, splitting on whitespace", header_line + 1);
    }

    let mut created = 0usize;
    while cursor
        .peek()?
        .is_some_and(|line| is_coordinate_record(line, layout))
    {
        let Some(line) = cursor.next_line()? else {
            break;
        };
        let line_no = cursor.line_number();
        let (foreign, coords) = parse_coordinate_record(&line, layout, line_no)?;

        if let Some(existing) = session.node_map.get(&foreign) {
            match session.options.duplicate_nodes {
                DuplicateNodePolicy::AcceptIdentical if existing.coords == coords => {
                    debug!("line {line_no}: node {foreign} repeated with identical coordinates");
                    continue;
                }
                DuplicateNodePolicy::Overwrite => {
                    debug!("line {line_no}: node {foreign} redefined, keeping the new point");
                }
                _ => {
                    return Err(ImportError::DuplicateForeignNodeId {
                        line: line_no,
                        node: foreign,
                    });
                }
            }
        }

        let local = session.next_node;
        sink.add_point(coords, local);
        session.node_map.insert(foreign, NodeEntry { local, coords });
        session.next_node += 1;
        created += 1;
    }

    debug!("coordinate block at line {header_line}: {created} points");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_table::ElementTypeTable;
    use crate::options::ImportOptions;
    use cdb_model::Mesh;
    use std::io::Cursor;

    fn run(src: &str, options: ImportOptions) -> (Result<usize>, Mesh, LineCursor<Cursor<&str>>) {
        let mut cursor = LineCursor::new(Cursor::new(src));
        let mut session = ImportSession::new(ElementTypeTable::ansys(), options);
        let mut mesh = Mesh::new();
        let result = import_nodes(&mut cursor, &mut session, &mut mesh);
        (result, mesh, cursor)
    }

    fn ansys_layout() -> Option<RecordLayout> {
        RecordLayout::parse("(3i9,6e21.13e3)")
    }

    #[test]
    fn format_line_gives_field_widths() {
        assert_eq!(
            ansys_layout(),
            Some(RecordLayout {
                int_fields: 3,
                int_width: 9,
                real_fields: 6,
                real_width: 21,
            })
        );
        assert_eq!(
            RecordLayout::parse("(3I8,6E20.13)").map(|l| (l.int_width, l.real_width)),
            Some((8, 20))
        );
        assert_eq!(RecordLayout::parse("fmt"), None);
        assert_eq!(RecordLayout::parse("(2i9,6e21.13e3)"), None);
    }

    #[test]
    fn record_detection() {
        let layout = ansys_layout();
        assert!(is_coordinate_record(
            "        1        0        0 1.0000000000000E+000",
            layout
        ));
        assert!(is_coordinate_record("        7        0        0", layout));
        assert!(is_coordinate_record(" 7 0 0 1.5", None));
        assert!(!is_coordinate_record("N,R5.3,LOC,       -1,", layout));
        assert!(!is_coordinate_record("-1", layout));
        assert!(!is_coordinate_record("(3i9,6e21.13e3)", layout));
        assert!(!is_coordinate_record("", layout));
    }

    #[test]
    fn touching_fields_split_by_width() {
        let (id, coords) = parse_coordinate_record(
            "        4        0        0-1.5000000000000E+000-2.0000000000000E+000",
            ansys_layout(),
            9,
        )
        .expect("fixed-width record");
        assert_eq!(id, 4);
        assert_eq!(coords, [-1.5, -2.0, 0.0]);
    }

    #[test]
    fn reads_points_in_file_order_and_leaves_terminator() {
        let src = "\
NBLOCK,6,SOLID,        3,        3
(3i9,6e21.13e3)
       10        0        0 1.0000000000000E+000 2.0000000000000E+000 3.0000000000000E+000
       20        0        0-4.5000000000000E-001
       30        0        0 0.0 0.0 7.5 0.0 0.0 0.0
N,R5.3,LOC,       -1,
";
        let (result, mesh, mut cursor) = run(src, ImportOptions::default());
        assert_eq!(result.expect("block should import"), 3);
        assert_eq!(mesh.points.len(), 3);
        assert_eq!(mesh.point(0).map(|p| p.coords), Some([1.0, 2.0, 3.0]));
        assert_eq!(mesh.point(2).map(|p| p.coords), Some([0.0, 0.0, 7.5]));
        assert_eq!(
            cursor.peek().expect("peek"),
            Some("N,R5.3,LOC,       -1,")
        );
    }

    #[test]
    fn missing_reals_default_to_zero() {
        let src = "NBLOCK,6,SOLID\n(3i9,6e21.13e3)\n        1        0        0 2.5\n        2        0        0\n";
        let (result, mesh, _) = run(src, ImportOptions::default());
        assert_eq!(result.expect("block should import"), 2);
        assert_eq!(mesh.point(0).map(|p| p.coords), Some([2.5, 0.0, 0.0]));
        assert_eq!(mesh.point(1).map(|p| p.coords), Some([0.0, 0.0, 0.0]));
    }

    #[test]
    fn non_numeric_coordinate_fails() {
        let src = "NBLOCK,6,SOLID\n(3i9,6e21.13e3)\n        1        0        0 1.0 abc 0.0\n";
        let (result, _, _) = run(src, ImportOptions::default());
        assert!(matches!(
            result,
            Err(ImportError::MalformedNumericLine { line: 3, .. })
        ));
    }

    #[test]
    fn non_finite_coordinates_fail() {
        let fixed = "NBLOCK,6,SOLID\n(3i9,6e21.13e3)\n        1        0        0                  nan\n";
        let (result, mesh, _) = run(fixed, ImportOptions::default());
        assert!(matches!(
            result,
            Err(ImportError::MalformedNumericLine { line: 3, .. })
        ));
        assert!(mesh.points.is_empty());

        let spaced = "NBLOCK,6,SOLID\n(3i9,6e21.13e3)\n 1 0 0 inf NaN 0.0\n";
        let (result, mesh, _) = run(spaced, ImportOptions::default());
        assert!(matches!(
            result,
            Err(ImportError::MalformedNumericLine { line: 3, .. })
        ));
        assert!(mesh.points.is_empty());
        assert_eq!(parse_real("infinity"), None);
        assert_eq!(parse_real("-1.5E+000"), Some(-1.5));
    }

    #[test]
    fn too_many_reals_fails() {
        let src = "NBLOCK,6,SOLID\n(3i9,6e21.13e3)\n 1 0 0 1 2 3 4 5 6 7\n";
        let (result, _, _) = run(src, ImportOptions::default());
        assert!(matches!(
            result,
            Err(ImportError::MalformedNumericLine { line: 3, .. })
        ));
    }

    #[test]
    fn duplicate_policies() {
        let same = "NBLOCK,6,SOLID\nfmt\n 1 0 0 1.0 0.0 0.0\n 1 0 0 1.0 0.0 0.0\n";
        let moved = "NBLOCK,6,SOLID\nfmt\n 1 0 0 1.0 0.0 0.0\n 1 0 0 2.0 0.0 0.0\n";

        let (result, mesh, _) = run(same, ImportOptions::default());
        assert_eq!(result.expect("identical repeat is accepted"), 1);
        assert_eq!(mesh.points.len(), 1);

        let (result, _, _) = run(moved, ImportOptions::default());
        assert!(matches!(
            result,
            Err(ImportError::DuplicateForeignNodeId { line: 4, node: 1 })
        ));

        let reject = ImportOptions {
            duplicate_nodes: DuplicateNodePolicy::Reject,
            ..Default::default()
        };
        let (result, _, _) = run(same, reject);
        assert!(matches!(
            result,
            Err(ImportError::DuplicateForeignNodeId { .. })
        ));

        let overwrite = ImportOptions {
            duplicate_nodes: DuplicateNodePolicy::Overwrite,
            ..Default::default()
        };
        let (result, mesh, _) = run(moved, overwrite);
        assert_eq!(result.expect("overwrite accepts"), 2);
        assert_eq!(mesh.point(1).map(|p| p.coords), Some([2.0, 0.0, 0.0]));
    }

    #[test]
    fn truncated_header_is_reported() {
        let (result, _, _) = run("NBLOCK,6,SOLID\n", ImportOptions::default());
        assert!(matches!(
            result,
            Err(ImportError::UnexpectedEndOfStream { line: 1, .. })
        ));
    }
}
