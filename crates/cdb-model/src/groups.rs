//! Named node groups and element groups.

use std::collections::{BTreeMap, BTreeSet};

use crate::{ElementId, GroupId, NodeId};

/// A named set of nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeGroup {
    pub id: GroupId,
    /// Group name (empty until named)
    pub name: String,
    pub nodes: BTreeSet<NodeId>,
}

/// A named set of elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementGroup {
    pub id: GroupId,
    pub name: String,
    pub elements: BTreeSet<ElementId>,
}

/// Registry of every group in a mesh, keyed by group id.
///
/// Node groups and element groups are numbered independently.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    node_groups: BTreeMap<GroupId, NodeGroup>,
    element_groups: BTreeMap<GroupId, ElementGroup>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn node_group_entry(&mut self, group: GroupId) -> &mut NodeGroup {
        self.node_groups.entry(group).or_insert_with(|| NodeGroup {
            id: group,
            ..Default::default()
        })
    }

    fn element_group_entry(&mut self, group: GroupId) -> &mut ElementGroup {
        self.element_groups
            .entry(group)
            .or_insert_with(|| ElementGroup {
                id: group,
                ..Default::default()
            })
    }

    /// Add `node` to node group `group`, creating the group if needed.
    pub fn add_node(&mut self, node: NodeId, group: GroupId) {
        self.node_group_entry(group).nodes.insert(node);
    }

    pub fn set_group_name(&mut self, group: GroupId, name: &str) {
        self.node_group_entry(group).name = name.to_string();
    }

    /// Add `element` to element group `group`, creating the group if needed.
    pub fn add_element(&mut self, element: ElementId, group: GroupId) {
        self.element_group_entry(group).elements.insert(element);
    }

    pub fn set_element_group_name(&mut self, group: GroupId, name: &str) {
        self.element_group_entry(group).name = name.to_string();
    }

    pub fn node_group(&self, group: GroupId) -> Option<&NodeGroup> {
        self.node_groups.get(&group)
    }

    pub fn element_group(&self, group: GroupId) -> Option<&ElementGroup> {
        self.element_groups.get(&group)
    }

    pub fn node_group_by_name(&self, name: &str) -> Option<&NodeGroup> {
        self.node_groups.values().find(|g| g.name == name)
    }

    pub fn element_group_by_name(&self, name: &str) -> Option<&ElementGroup> {
        self.element_groups.values().find(|g| g.name == name)
    }

    /// Node ids of the node group called `name`, ascending.
    pub fn get_nodes(&self, name: &str) -> Option<Vec<NodeId>> {
        self.node_group_by_name(name)
            .map(|g| g.nodes.iter().copied().collect())
    }

    /// Element ids of the element group called `name`, ascending.
    pub fn get_elements(&self, name: &str) -> Option<Vec<ElementId>> {
        self.element_group_by_name(name)
            .map(|g| g.elements.iter().copied().collect())
    }

    pub fn node_groups(&self) -> impl Iterator<Item = &NodeGroup> {
        self.node_groups.values()
    }

    pub fn element_groups(&self) -> impl Iterator<Item = &ElementGroup> {
        self.element_groups.values()
    }

    pub fn is_empty(&self) -> bool {
        self.node_groups.is_empty() && self.element_groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.node_groups.clear();
        self.element_groups.clear();
    }
}
