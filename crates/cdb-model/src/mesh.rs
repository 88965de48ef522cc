//! Mesh container: points, elements, partitions and groups.
//!
//! Importers never touch [`Mesh`] fields directly; they write through the
//! [`MeshSink`] trait so any destination container can be populated.

use std::collections::{BTreeMap, HashMap};

use crate::elem_type::ElemType;
use crate::groups::GroupRegistry;
use crate::{ElementId, MeshError, NodeId, PartitionId, Result};

/// A point in the mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Dense local id (0-based)
    pub id: NodeId,
    pub coords: [f64; 3],
}

impl Point {
    pub fn new(id: NodeId, coords: [f64; 3]) -> Self {
        Self { id, coords }
    }
}

/// An element whose node slots are filled one at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub elem_type: ElemType,
    nodes: Vec<Option<NodeId>>,
    partition: PartitionId,
}

impl Element {
    /// Create an element with every node slot empty and partition 0.
    pub fn new(id: ElementId, elem_type: ElemType) -> Self {
        Self {
            id,
            elem_type,
            nodes: vec![None; elem_type.num_nodes()],
            partition: 0,
        }
    }

    pub fn set_node(&mut self, slot: usize, node: NodeId) -> Result<()> {
        let len = self.nodes.len();
        let entry = self.nodes.get_mut(slot).ok_or(MeshError::SlotOutOfRange {
            element: self.id,
            slot,
            len,
        })?;
        *entry = Some(node);
        Ok(())
    }

    /// Node ids in slot order; `None` marks an unfilled slot.
    pub fn nodes(&self) -> &[Option<NodeId>] {
        &self.nodes
    }

    /// Node ids in slot order, or `None` if any slot is still empty.
    pub fn connectivity(&self) -> Option<Vec<NodeId>> {
        self.nodes.iter().copied().collect()
    }

    pub fn set_partition(&mut self, partition: PartitionId) {
        self.partition = partition;
    }

    pub fn partition(&self) -> PartitionId {
        self.partition
    }
}

/// Destination of an import.
pub trait MeshSink {
    /// Drop every point, element, partition name and group.
    fn clear(&mut self);

    fn add_point(&mut self, coords: [f64; 3], id: NodeId);

    /// Create (or replace) element `id` and return it for slot filling.
    fn add_element(&mut self, elem_type: ElemType, id: ElementId) -> &mut Element;

    fn set_partition_name(&mut self, id: PartitionId, name: &str);

    fn groups_mut(&mut self) -> &mut GroupRegistry;

    /// Mark whether the content is a finished import. Importers set this to
    /// `false` when they start and to `true` only once the whole stream has
    /// been read.
    fn set_complete(&mut self, _complete: bool) {}

    /// Consistency check run after an import. Sinks that cannot check
    /// anything accept by default.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Complete in-memory mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub points: BTreeMap<NodeId, Point>,
    pub elements: BTreeMap<ElementId, Element>,
    pub partition_names: BTreeMap<PartitionId, String>,
    pub groups: GroupRegistry,
    complete: bool,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point(&self, id: NodeId) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn partition_name(&self, id: PartitionId) -> Option<&str> {
        self.partition_names.get(&id).map(String::as_str)
    }

    /// Elements assigned to `partition`, in element id order.
    pub fn partition_elements(&self, partition: PartitionId) -> impl Iterator<Item = &Element> {
        self.elements
            .values()
            .filter(move |e| e.partition() == partition)
    }

    /// Distinct partition ids carried by elements, ascending.
    pub fn partition_ids(&self) -> Vec<PartitionId> {
        let mut ids: Vec<PartitionId> = self.elements.values().map(Element::partition).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// True once an import has run to the end of its stream. A mesh left
    /// behind by a failed import is partial and reports `false`.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.elements.is_empty()
    }

    /// Check that every element slot is filled, every referenced node exists,
    /// and every group member points at an existing entity.
    pub fn validate(&self) -> Result<()> {
        for element in self.elements.values() {
            for (slot, node) in element.nodes().iter().copied().enumerate() {
                let node = node.ok_or(MeshError::UnfilledSlot {
                    element: element.id,
                    slot,
                })?;
                if !self.points.contains_key(&node) {
                    return Err(MeshError::DanglingNode {
                        element: element.id,
                        node,
                    });
                }
            }
        }

        for group in self.groups.node_groups() {
            if let Some(&node) = group.nodes.iter().find(|n| !self.points.contains_key(*n)) {
                return Err(MeshError::DanglingGroupMember {
                    group: group.name.clone(),
                    id: node,
                });
            }
        }
        for group in self.groups.element_groups() {
            if let Some(&element) = group.elements.iter().find(|e| !self.elements.contains_key(*e)) {
                return Err(MeshError::DanglingGroupMember {
                    group: group.name.clone(),
                    id: element,
                });
            }
        }
        Ok(())
    }

    /// Element counts keyed by topology.
    pub fn element_type_counts(&self) -> HashMap<ElemType, usize> {
        let mut counts = HashMap::new();
        for element in self.elements.values() {
            *counts.entry(element.elem_type).or_insert(0) += 1;
        }
        counts
    }
}

impl MeshSink for Mesh {
    fn clear(&mut self) {
        self.points.clear();
        self.elements.clear();
        self.partition_names.clear();
        self.groups.clear();
        self.complete = false;
    }

    fn add_point(&mut self, coords: [f64; 3], id: NodeId) {
        self.points.insert(id, Point::new(id, coords));
    }

    fn add_element(&mut self, elem_type: ElemType, id: ElementId) -> &mut Element {
        let element = self
            .elements
            .entry(id)
            .or_insert_with(|| Element::new(id, elem_type));
        *element = Element::new(id, elem_type);
        element
    }

    fn set_partition_name(&mut self, id: PartitionId, name: &str) {
        self.partition_names.insert(id, name.to_string());
    }

    fn groups_mut(&mut self) -> &mut GroupRegistry {
        &mut self.groups
    }

    fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    fn validate(&self) -> Result<()> {
        Mesh::validate(self)
    }
}
