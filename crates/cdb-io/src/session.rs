//! Per-import state shared by the block importers.

use std::collections::HashMap;

use cdb_model::{ElementId, GroupId, NodeId, PartitionId};

use crate::element_table::ElementTypeTable;
use crate::error::{ImportError, Result};
use crate::options::ImportOptions;

#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeEntry {
    pub local: NodeId,
    pub coords: [f64; 3],
}

/// Counters and id maps for one import; dropped when the import returns.
#[derive(Debug)]
pub(crate) struct ImportSession<'t> {
    pub(crate) table: &'t ElementTypeTable,
    pub(crate) options: ImportOptions,
    pub(crate) next_node: NodeId,
    pub(crate) next_element: ElementId,
    pub(crate) next_partition: PartitionId,
    pub(crate) next_group: GroupId,
    pub(crate) next_element_group: GroupId,
    /// Most recent `ET` declaration.
    pub(crate) element_type: Option<u32>,
    pub(crate) node_map: HashMap<i64, NodeEntry>,
    pub(crate) element_map: HashMap<i64, ElementId>,
    pub(crate) skipped_lines: usize,
}

impl<'t> ImportSession<'t> {
    pub(crate) fn new(table: &'t ElementTypeTable, options: ImportOptions) -> Self {
        Self {
            table,
            options,
            next_node: 0,
            next_element: 0,
            next_partition: 1,
            next_group: 1,
            next_element_group: 1,
            element_type: None,
            node_map: HashMap::new(),
            element_map: HashMap::new(),
            skipped_lines: 0,
        }
    }

    pub(crate) fn resolve_node(&self, foreign: i64, line: usize) -> Result<NodeId> {
        self.node_map
            .get(&foreign)
            .map(|entry| entry.local)
            .ok_or(ImportError::UnresolvedNodeReference {
                line,
                node: foreign,
            })
    }

    pub(crate) fn resolve_element(&self, foreign: i64, line: usize) -> Result<ElementId> {
        self.element_map
            .get(&foreign)
            .copied()
            .ok_or(ImportError::UnresolvedElementReference {
                line,
                element: foreign,
            })
    }

    /// Counts so far; partition and group counters start at 1.
    pub(crate) fn report(&self) -> ImportReport {
        ImportReport {
            points: self.next_node,
            elements: self.next_element,
            partitions: (self.next_partition - 1) as usize,
            node_groups: (self.next_group - 1) as usize,
            element_groups: (self.next_element_group - 1) as usize,
            skipped_lines: self.skipped_lines,
        }
    }
}

/// Counts reported once an import succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub points: usize,
    pub elements: usize,
    /// Partition ids consumed, including those of element blocks that turned
    /// out to be empty.
    pub partitions: usize,
    pub node_groups: usize,
    pub element_groups: usize,
    /// Boilerplate lines skipped between blocks.
    pub skipped_lines: usize,
}
