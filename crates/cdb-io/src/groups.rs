//! `CMBLOCK` component blocks.
//!
//! ```text
//! CMBLOCK,INLET,NODE,        5
//! (8i10)
//!          1         2         4        -6
//! CMBLOCK,OUTLET,NODE,       2
//! ```
//!
//! A negative member closes a range opened by the value before it, so the
//! record above lists nodes 1, 2, 4, 5 and 6. The block has no terminator:
//! it ends at the first line that is not a member record, and that line is
//! put back for the driver.

use std::collections::HashSet;
use std::io::BufRead;

use cdb_inp::{LineCursor, is_integer_token, parse_signed_ints, tokenize};
use cdb_model::MeshSink;
use log::{debug, warn};

use crate::error::{ImportError, Result};
use crate::session::ImportSession;

const MAX_MEMBERS_PER_LINE: usize = 8;

/// What a component collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComponentKind {
    Node,
    Element,
    /// Keypoints, lines, areas, volumes: geometry the mesh does not carry.
    Other,
}

impl ComponentKind {
    fn parse(field: &str) -> Self {
        match field {
            "NODE" => ComponentKind::Node,
            "ELEM" => ComponentKind::Element,
            _ => ComponentKind::Other,
        }
    }
}

fn is_member_record(line: &str) -> bool {
    let mut count = 0;
    for token in line.split_whitespace() {
        if !is_integer_token(token) {
            return false;
        }
        count += 1;
    }
    (1..=MAX_MEMBERS_PER_LINE).contains(&count)
}

/// Append the members of one record to `members`, expanding `a -b` into
/// `a..=b`. `last` is the most recent positive value and carries over
/// between records. A range may add at most `limit` ids, the number of
/// entities it could name.
fn expand_members(
    values: &[i64],
    line_no: usize,
    limit: usize,
    last: &mut Option<i64>,
    members: &mut Vec<(i64, usize)>,
) -> Result<()> {
    let malformed = |message: String| ImportError::MalformedNumericLine {
        line: line_no,
        message,
    };

    for &value in values {
        if value >= 0 {
            members.push((value, line_no));
            *last = Some(value);
            continue;
        }

        let end = value
            .checked_neg()
            .ok_or_else(|| malformed(format!("range end {value} is out of range")))?;
        let start = last.ok_or_else(|| malformed(format!("range end {value} has no start")))?;
        if end < start {
            return Err(malformed(format!("range {start}..{end} runs backwards")));
        }
        if end - start > i64::try_from(limit).unwrap_or(i64::MAX) {
            return Err(malformed(format!(
                "range {start}..{end} spans more than the {limit} ids imported"
            )));
        }
        members.extend((start + 1..=end).map(|id| (id, line_no)));
        *last = Some(end);
    }
    Ok(())
}

/// Consume one component block and register its members. Returns the kind
/// and the number of distinct members read.
pub(crate) fn import_component<R: BufRead, S: MeshSink + ?Sized>(
    cursor: &mut LineCursor<R>,
    session: &mut ImportSession<'_>,
    sink: &mut S,
) -> Result<(ComponentKind, usize)> {
    let Some(header) = cursor.next_line()? else {
        return Err(ImportError::UnexpectedEndOfStream {
            line: cursor.line_number(),
            context: "component header",
        });
    };
    let header_line = cursor.line_number();

    let tokens = tokenize(&header, ',');
    let name = tokens.get(1).map(|t| t.trim()).unwrap_or_default().to_string();
    if name.is_empty() {
        return Err(ImportError::MalformedDeclaration {
            line: header_line,
            message: format!("{header:?} has no component name"),
        });
    }
    let kind = ComponentKind::parse(tokens.get(2).map(|t| t.trim()).unwrap_or_default());
    let declared = tokens
        .get(3)
        .and_then(|t| t.split_whitespace().next())
        .and_then(|t| t.parse::<usize>().ok());

    // Fortran format line
    if cursor.next_line()?.is_none() {
        return Err(ImportError::UnexpectedEndOfStream {
            line: header_line,
            context: "component header",
        });
    }

    let limit = match kind {
        ComponentKind::Node => session.node_map.len(),
        ComponentKind::Element => session.element_map.len(),
        ComponentKind::Other => 0,
    };

    let mut members = Vec::new();
    let mut last = None;
    loop {
        cursor.mark();
        let Some(line) = cursor.next_line()? else {
            cursor.release();
            break;
        };
        if !is_member_record(&line) {
            cursor.rewind();
            break;
        }
        cursor.release();
        let line_no = cursor.line_number();
        let values = parse_signed_ints(&line, line_no)?;
        if kind != ComponentKind::Other {
            expand_members(&values, line_no, limit, &mut last, &mut members)?;
        }
    }

    let mut seen = HashSet::with_capacity(members.len());
    members.retain(|(id, _)| seen.insert(*id));

    if let Some(declared) = declared.filter(|&n| n != members.len()) {
        debug!(
            "line {header_line}: component {name} declares {declared} members, read {}",
            members.len()
        );
    }

    match kind {
        ComponentKind::Node => {
            let group = session.next_group;
            for &(foreign, line) in &members {
                let local = session.resolve_node(foreign, line)?;
                sink.groups_mut().add_node(local, group);
            }
            sink.groups_mut().set_group_name(group, &name);
            session.next_group += 1;
            debug!("node group {group} {name}: {} nodes", members.len());
        }
        ComponentKind::Element => {
            let group = session.next_element_group;
            for &(foreign, line) in &members {
                let local = session.resolve_element(foreign, line)?;
                sink.groups_mut().add_element(local, group);
            }
            sink.groups_mut().set_element_group_name(group, &name);
            session.next_element_group += 1;
            debug!("element group {group} {name}: {} elements", members.len());
        }
        ComponentKind::Other => {
            warn!(
                "line {header_line}: skipping component {name} of kind {:?}",
                tokens.get(2).map(|t| t.trim()).unwrap_or_default()
            );
        }
    }

    Ok((kind, members.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_table::ElementTypeTable;
    use crate::options::ImportOptions;
    use crate::session::NodeEntry;
    use cdb_model::Mesh;
    use std::io::Cursor;

    fn session() -> ImportSession<'static> {
        let mut session = ImportSession::new(ElementTypeTable::ansys(), ImportOptions::default());
        // Foreign node n maps to local n + 100 so the remap is visible.
        for foreign in 1..=20 {
            session.node_map.insert(
                foreign,
                NodeEntry {
                    local: foreign as usize + 100,
                    coords: [0.0; 3],
                },
            );
        }
        session.element_map.insert(31, 0);
        session.element_map.insert(32, 1);
        session
    }

    fn expand(values: &[i64]) -> Result<Vec<i64>> {
        let mut members = Vec::new();
        expand_members(values, 1, 20, &mut None, &mut members)?;
        Ok(members.into_iter().map(|(id, _)| id).collect())
    }

    #[test]
    fn ranges_expand() {
        assert_eq!(expand(&[1, 2, 4, -6]).expect("valid"), vec![1, 2, 4, 5, 6]);
        assert_eq!(expand(&[3, -3]).expect("valid"), vec![3]);
        assert!(matches!(
            expand(&[-4, 5]),
            Err(ImportError::MalformedNumericLine { line: 1, .. })
        ));
        assert!(matches!(
            expand(&[9, -4]),
            Err(ImportError::MalformedNumericLine { .. })
        ));
    }

    #[test]
    fn extreme_range_ends_are_rejected() {
        assert!(matches!(
            expand(&[1, i64::MIN]),
            Err(ImportError::MalformedNumericLine { line: 1, .. })
        ));
        assert!(matches!(
            expand(&[1, -4_000_000_000]),
            Err(ImportError::MalformedNumericLine { line: 1, .. })
        ));
        // 19 new ids fit the 20 known entities, 20 do not
        assert_eq!(expand(&[1, -20]).expect("within bound").len(), 20);
        assert!(expand(&[0, -21]).is_err());
    }

    #[test]
    fn wide_range_in_a_component_fails_before_resolving() {
        let src = "CMBLOCK,ALL,NODE,       2\n(8i10)\n         1 -9223372036854775808\n";
        let mut cursor = LineCursor::new(Cursor::new(src));
        let mut session = session();
        let mut mesh = Mesh::new();
        let err = import_component(&mut cursor, &mut session, &mut mesh).expect_err("overflow");
        assert!(matches!(err, ImportError::MalformedNumericLine { line: 3, .. }));

        let src = "CMBLOCK,ALL,NODE,       2\n(8i10)\n         1 -4000000000\n";
        let mut cursor = LineCursor::new(Cursor::new(src));
        let err = import_component(&mut cursor, &mut session, &mut mesh).expect_err("too wide");
        assert!(matches!(err, ImportError::MalformedNumericLine { line: 3, .. }));
        assert!(mesh.groups.is_empty());
    }

    #[test]
    fn range_start_carries_across_records() {
        let mut last = None;
        let mut members = Vec::new();
        expand_members(&[10, 11, 12], 3, 20, &mut last, &mut members).expect("first line");
        expand_members(&[-14], 4, 20, &mut last, &mut members).expect("second line");
        let ids: Vec<i64> = members.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);
        assert_eq!(members.last(), Some(&(14, 4)));
    }

    #[test]
    fn member_records() {
        assert!(is_member_record("         1         2         4        -6"));
        assert!(is_member_record("         7\r"));
        assert!(!is_member_record("         1         2         3         4         5         6         7         8         9"));
        assert!(!is_member_record("CMBLOCK,OUTLET,NODE,       2"));
        assert!(!is_member_record("(8i10)"));
        assert!(!is_member_record(""));
    }

    #[test]
    fn node_component_registers_group_and_puts_back_next_header() {
        let src = "\
CMBLOCK,INLET,NODE,        5
(8i10)
         1         2         4        -6
CMBLOCK,OUTLET,NODE,       1
(8i10)
        20
";
        let mut cursor = LineCursor::new(Cursor::new(src));
        let mut session = session();
        let mut mesh = Mesh::new();

        let (kind, count) =
            import_component(&mut cursor, &mut session, &mut mesh).expect("first component");
        assert_eq!((kind, count), (ComponentKind::Node, 5));
        assert_eq!(cursor.peek().expect("peek"), Some("CMBLOCK,OUTLET,NODE,       1"));
        assert_eq!(cursor.line_number(), 3);

        let (_, count) =
            import_component(&mut cursor, &mut session, &mut mesh).expect("second component");
        assert_eq!(count, 1);

        assert_eq!(mesh.groups.get_nodes("INLET"), Some(vec![101, 102, 104, 105, 106]));
        assert_eq!(mesh.groups.node_group(2).map(|g| g.name.as_str()), Some("OUTLET"));
        assert_eq!(session.next_group, 3);
    }

    #[test]
    fn element_component_uses_element_map() {
        let src = "CMBLOCK,BRACKET,ELEM,       2\n(8i10)\n        31        32\n";
        let mut cursor = LineCursor::new(Cursor::new(src));
        let mut session = session();
        let mut mesh = Mesh::new();

        let (kind, _) = import_component(&mut cursor, &mut session, &mut mesh).expect("component");
        assert_eq!(kind, ComponentKind::Element);
        assert_eq!(mesh.groups.get_elements("BRACKET"), Some(vec![0, 1]));
        assert_eq!(session.next_element_group, 2);
        assert_eq!(session.next_group, 1);
    }

    #[test]
    fn other_kinds_are_consumed_without_registering() {
        let src = "CMBLOCK,EDGES,LINE,       2\n(8i10)\n         1         2\n/GO\n";
        let mut cursor = LineCursor::new(Cursor::new(src));
        let mut session = session();
        let mut mesh = Mesh::new();

        let (kind, _) = import_component(&mut cursor, &mut session, &mut mesh).expect("component");
        assert_eq!(kind, ComponentKind::Other);
        assert!(mesh.groups.is_empty());
        assert_eq!(cursor.peek().expect("peek"), Some("/GO"));
    }

    #[test]
    fn duplicates_are_dropped_and_count_mismatch_tolerated() {
        let src = "CMBLOCK,TOP,NODE,       9\n(8i10)\n         3         1        -3         2\n";
        let mut cursor = LineCursor::new(Cursor::new(src));
        let mut session = session();
        let mut mesh = Mesh::new();

        let (_, count) = import_component(&mut cursor, &mut session, &mut mesh).expect("component");
        assert_eq!(count, 3);
        assert_eq!(mesh.groups.get_nodes("TOP"), Some(vec![101, 102, 103]));
    }

    #[test]
    fn unresolved_members_fail() {
        let src = "CMBLOCK,FAR,NODE,       1\n(8i10)\n         5\n        99\n";
        let mut cursor = LineCursor::new(Cursor::new(src));
        let mut session = session();
        let mut mesh = Mesh::new();
        let err = import_component(&mut cursor, &mut session, &mut mesh).expect_err("node 99");
        assert!(matches!(err, ImportError::UnresolvedNodeReference { line: 4, node: 99 }));

        let src = "CMBLOCK,GONE,ELEM,       1\n(8i10)\n        77\n";
        let mut cursor = LineCursor::new(Cursor::new(src));
        let err = import_component(&mut cursor, &mut session, &mut mesh).expect_err("element 77");
        assert!(matches!(
            err,
            ImportError::UnresolvedElementReference { line: 3, element: 77 }
        ));
    }

    #[test]
    fn header_without_name_is_rejected() {
        let mut cursor = LineCursor::new(Cursor::new("CMBLOCK,   ,NODE,  1\n(8i10)\n"));
        let mut session = session();
        let mut mesh = Mesh::new();
        let err = import_component(&mut cursor, &mut session, &mut mesh).expect_err("no name");
        assert!(matches!(err, ImportError::MalformedDeclaration { line: 1, .. }));
    }
}
