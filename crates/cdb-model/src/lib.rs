//! Destination mesh for CDB imports.
//!
//! Provides the point/element container ([`Mesh`]), the target topology
//! registry ([`ElemType`]), named groups ([`GroupRegistry`]) and the
//! [`MeshSink`] trait importers write through.

mod elem_type;
mod groups;
mod mesh;
mod summary;

pub use elem_type::ElemType;
pub use groups::{ElementGroup, GroupRegistry, NodeGroup};
pub use mesh::{Element, Mesh, MeshSink, Point};
pub use summary::{GroupSummary, MeshSummary, PartitionSummary};

use thiserror::Error;

/// Dense 0-based point id
pub type NodeId = usize;
/// Dense 0-based element id
pub type ElementId = usize;
/// Subdomain id; importers number partitions from 1
pub type PartitionId = u32;
pub type GroupId = u32;

pub type Result<T> = std::result::Result<T, MeshError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("element {element} has no slot {slot} (it has {len})")]
    SlotOutOfRange {
        element: ElementId,
        slot: usize,
        len: usize,
    },

    #[error("element {element} slot {slot} was never assigned a node")]
    UnfilledSlot { element: ElementId, slot: usize },

    #[error("element {element} references non-existent node {node}")]
    DanglingNode { element: ElementId, node: NodeId },

    #[error("group {group} references non-existent entity {id}")]
    DanglingGroupMember { group: String, id: usize },
}
