//! Mesh summary for reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Mesh, PartitionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub id: PartitionId,
    pub name: Option<String>,
    pub elements: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    pub members: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshSummary {
    pub points: usize,
    pub elements: usize,
    /// Element counts keyed by topology name
    pub element_types: BTreeMap<String, usize>,
    pub partitions: Vec<PartitionSummary>,
    pub node_groups: Vec<GroupSummary>,
    pub element_groups: Vec<GroupSummary>,
}

impl MeshSummary {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let element_types = mesh
            .element_type_counts()
            .into_iter()
            .map(|(t, n)| (t.name().to_string(), n))
            .collect();

        let partitions = mesh
            .partition_ids()
            .into_iter()
            .map(|id| PartitionSummary {
                id,
                name: mesh.partition_name(id).map(str::to_string),
                elements: mesh.partition_elements(id).count(),
            })
            .collect();

        let node_groups = mesh
            .groups
            .node_groups()
            .map(|g| GroupSummary {
                name: g.name.clone(),
                members: g.nodes.len(),
            })
            .collect();
        let element_groups = mesh
            .groups
            .element_groups()
            .map(|g| GroupSummary {
                name: g.name.clone(),
                members: g.elements.len(),
            })
            .collect();

        Self {
            points: mesh.points.len(),
            elements: mesh.elements.len(),
            element_types,
            partitions,
            node_groups,
            element_groups,
        }
    }

    /// Format as a human-readable string
    pub fn format(&self) -> String {
        let mut lines = vec![
            format!("Points: {}", self.points),
            format!("Elements: {}", self.elements),
        ];

        if !self.element_types.is_empty() {
            lines.push("Element types:".to_string());
            for (name, count) in &self.element_types {
                lines.push(format!("  {name}: {count}"));
            }
        }
        if !self.partitions.is_empty() {
            lines.push("Partitions:".to_string());
            for p in &self.partitions {
                let name = p.name.as_deref().unwrap_or("<unnamed>");
                lines.push(format!("  {} {}: {} elements", p.id, name, p.elements));
            }
        }
        if !self.node_groups.is_empty() {
            lines.push("Node groups:".to_string());
            for g in &self.node_groups {
                lines.push(format!("  {}: {} nodes", g.name, g.members));
            }
        }
        if !self.element_groups.is_empty() {
            lines.push("Element groups:".to_string());
            for g in &self.element_groups {
                lines.push(format!("  {}: {} elements", g.name, g.members));
            }
        }

        lines.join("\n")
    }
}
