//! `ET` declarations and `EBLOCK` connectivity blocks.
//!
//! ```text
//! ET,       1,186
//! TYPE,       1
//! EBLOCK,19,SOLID,         2,         2
//! (19i9)
//!         1        1        1        1        0        0        0        0       20        0        1        1        2        3        4        5        6        7        8
//!         9       10       11       12       13       14       15       16       17       18       19       20
//!        -1
//! CMBLOCK,BRACKET,ELEM,       1
//! ```
//!
//! A record is eight attribute fields, the declared node count, one more
//! attribute, the element id and up to eight node ids. Records with more than
//! eight nodes continue on the next line. The name line after the `-1`
//! terminator names every partition opened by the block; a block that changes
//! topology and later changes back numbers the repeat (`WING_QUAD4_2`).

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use cdb_inp::{BlockKind, LineCursor, classify, parse_signed_ints, tokenize};
use cdb_model::{MeshSink, NodeId, PartitionId};
use log::{debug, warn};

use crate::error::{ImportError, Result};
use crate::session::ImportSession;

const ATTRIBUTE_FIELDS: usize = 8;
const COUNT_FIELD: usize = ATTRIBUTE_FIELDS;
const ID_FIELD: usize = 10;
const FIRST_NODE_FIELD: usize = 11;
const NODES_PER_LINE: usize = 8;

/// Lines between `TYPE` and the first record: the `EBLOCK` keyword line and
/// its format line.
const BLOCK_PREAMBLE: usize = 2;

/// Consume an `ET,<itype>,<code>` line and make `code` the active element
/// type. Returns the code.
pub(crate) fn declare_element_type<R: BufRead>(
    cursor: &mut LineCursor<R>,
    session: &mut ImportSession<'_>,
) -> Result<u32> {
    let Some(line) = cursor.next_line()? else {
        return Err(ImportError::UnexpectedEndOfStream {
            line: cursor.line_number(),
            context: "element type declaration",
        });
    };
    let line_no = cursor.line_number();

    let tokens = tokenize(&line, ',');
    let field = tokens
        .get(2)
        .map(|t| t.trim())
        .ok_or_else(|| ImportError::MalformedDeclaration {
            line: line_no,
            message: format!("{line:?} has no element type field"),
        })?;
    let code = field
        .parse::<u32>()
        .map_err(|_| ImportError::MalformedDeclaration {
            line: line_no,
            message: format!("element type {field:?} is not a number"),
        })?;

    if session.table.family(code).is_none() {
        debug!("line {line_no}: element type {code} is not in the table");
    }
    session.element_type = Some(code);
    Ok(code)
}

/// One connectivity record after duplicate removal.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ElementRecord {
    id: i64,
    nodes: Vec<i64>,
}

fn is_terminator(line: &str) -> bool {
    line.split_whitespace().any(|token| token == "-1")
}

/// Drop repeated node ids, keeping the first occurrence of each.
fn dedup_in_order(nodes: &mut Vec<i64>) {
    let mut seen = HashSet::with_capacity(nodes.len());
    nodes.retain(|node| seen.insert(*node));
}

fn malformed(line: usize, message: String) -> ImportError {
    ImportError::MalformedNumericLine { line, message }
}

/// Parse the record starting on `line`, pulling the continuation line from
/// `cursor` when the declared count exceeds one line's worth of nodes.
fn read_record<R: BufRead>(
    cursor: &mut LineCursor<R>,
    line: &str,
    line_no: usize,
) -> Result<ElementRecord> {
    let fields = parse_signed_ints(line, line_no)?;
    if fields.len() < FIRST_NODE_FIELD {
        return Err(malformed(
            line_no,
            format!(
                "element record has {} fields, expected at least {FIRST_NODE_FIELD}",
                fields.len()
            ),
        ));
    }

    let declared = usize::try_from(fields[COUNT_FIELD])
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| malformed(line_no, format!("bad node count {}", fields[COUNT_FIELD])))?;
    let id = fields[ID_FIELD];

    let on_first = declared.min(NODES_PER_LINE);
    let mut nodes: Vec<i64> = fields[FIRST_NODE_FIELD..].iter().take(on_first).copied().collect();
    if nodes.len() < on_first {
        return Err(malformed(
            line_no,
            format!("element {id} declares {declared} nodes but lists {}", nodes.len()),
        ));
    }

    if declared > NODES_PER_LINE {
        let Some(rest) = cursor.next_line()? else {
            return Err(ImportError::UnexpectedEndOfStream {
                line: line_no,
                context: "element record",
            });
        };
        let rest_no = cursor.line_number();
        let remaining = declared - NODES_PER_LINE;
        let more = parse_signed_ints(&rest, rest_no)?;
        if more.len() < remaining {
            return Err(malformed(
                rest_no,
                format!(
                    "element {id} continuation lists {} of {remaining} nodes",
                    more.len()
                ),
            ));
        }
        nodes.extend(more.into_iter().take(remaining));
    }

    debug_assert_eq!(nodes.len(), declared);
    dedup_in_order(&mut nodes);
    Ok(ElementRecord { id, nodes })
}

/// Consume a `TYPE` line, its `EBLOCK` preamble, every record up to the `-1`
/// terminator and the block name line. Returns the number of elements
/// created.
pub(crate) fn import_elements<R: BufRead, S: MeshSink + ?Sized>(
    cursor: &mut LineCursor<R>,
    session: &mut ImportSession<'_>,
    sink: &mut S,
) -> Result<usize> {
    let table = session.table;
    cursor.next_line()?;
    let type_line = cursor.line_number();
    let code = session
        .element_type
        .ok_or(ImportError::MissingElementType { line: type_line })?;

    if cursor.skip(BLOCK_PREAMBLE)? < BLOCK_PREAMBLE {
        return Err(ImportError::UnexpectedEndOfStream {
            line: cursor.line_number(),
            context: "element block header",
        });
    }

    // Partitions opened by this block with their topology names.
    let mut opened: Vec<(PartitionId, &'static str)> = Vec::new();
    let mut prev_nodes: Option<usize> = None;
    let mut created = 0usize;

    loop {
        let Some(line) = cursor.next_line()? else {
            return Err(ImportError::UnexpectedEndOfStream {
                line: cursor.line_number(),
                context: "element block",
            });
        };
        let line_no = cursor.line_number();
        if is_terminator(&line) {
            break;
        }

        let record = read_record(cursor, &line, line_no)?;
        let effective = record.nodes.len();
        let def = table
            .lookup(code, effective)
            .map_err(|err| ImportError::from_table(err, line_no))?;

        match prev_nodes {
            None => opened.push((session.next_partition, def.name())),
            Some(prev) if prev != effective => {
                session.next_partition += 1;
                warn!(
                    "line {line_no}: element {} has {effective} nodes after {prev}; opening partition {} ({})",
                    record.id, session.next_partition, def.name()
                );
                opened.push((session.next_partition, def.name()));
            }
            Some(_) => {}
        }
        prev_nodes = Some(effective);

        let local: Vec<NodeId> = record
            .nodes
            .iter()
            .map(|&node| session.resolve_node(node, line_no))
            .collect::<Result<_>>()?;
        let ordered = def.apply(&local);

        let id = session.next_element;
        let element = sink.add_element(def.elem_type(), id);
        for (slot, node) in ordered.into_iter().enumerate() {
            element.set_node(slot, node)?;
        }
        element.set_partition(session.next_partition);

        session.element_map.insert(record.id, id);
        session.next_element += 1;
        created += 1;
    }

    let block_name = read_block_name(cursor)?;
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for &(partition, topology) in &opened {
        let seen = occurrences.entry(topology).or_insert(0);
        *seen += 1;
        let mut name = session.options.partition_name(&block_name, topology);
        // A topology the block returns to gets an ordinal so names stay unique.
        if *seen > 1 {
            name = format!("{name}{}{seen}", session.options.partition_name_separator);
        }
        debug!("partition {partition}: {name}");
        sink.set_partition_name(partition, &name);
    }
    session.next_partition += 1;

    debug!(
        "element block at line {type_line}: type {code}, {created} elements, {} partitions",
        opened.len()
    );
    Ok(created)
}

/// Name from the line after the terminator. A `CMBLOCK` name line is left in
/// the stream so the driver also reads it as a component.
fn read_block_name<R: BufRead>(cursor: &mut LineCursor<R>) -> Result<String> {
    let terminator = cursor.line_number();
    let missing = ImportError::MissingBlockName { line: terminator };

    let name = match cursor.peek()? {
        None => return Err(missing),
        Some(line) => tokenize(line, ',')
            .get(1)
            .map(|t| t.trim().to_string())
            .filter(|name| !name.is_empty()),
    };
    let keep = cursor
        .peek()?
        .is_some_and(|line| classify(line) == BlockKind::NodeGroupBlockStart);
    if !keep {
        cursor.next_line()?;
    }
    name.ok_or(missing)
}
