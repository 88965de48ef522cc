//! Target element topologies and their canonical node ordering.
//!
//! Node ordering follows the Exodus II convention: corners first (bottom face
//! counter-clockwise, then top face), then mid-edge nodes. For the quadratic
//! solids the mid-edge block is bottom-face edges, then the edges joining the
//! two faces, then top-face edges.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElemType {
    /// 2-node line
    Edge2,
    /// 3-node line, mid node last
    Edge3,
    /// 3-node triangle
    Tri3,
    /// 6-node triangle
    Tri6,
    /// 4-node quadrilateral
    Quad4,
    /// 8-node quadrilateral
    Quad8,
    /// 4-node tetrahedron
    Tet4,
    /// 10-node tetrahedron
    Tet10,
    /// 8-node hexahedron
    Hex8,
    /// 20-node hexahedron
    Hex20,
    /// 6-node wedge
    Prism6,
    /// 15-node wedge
    Prism15,
    /// 5-node pyramid, apex last
    Pyramid5,
    /// 13-node pyramid
    Pyramid13,
}

impl ElemType {
    pub const ALL: [ElemType; 14] = [
        ElemType::Edge2,
        ElemType::Edge3,
        ElemType::Tri3,
        ElemType::Tri6,
        ElemType::Quad4,
        ElemType::Quad8,
        ElemType::Tet4,
        ElemType::Tet10,
        ElemType::Hex8,
        ElemType::Hex20,
        ElemType::Prism6,
        ElemType::Prism15,
        ElemType::Pyramid5,
        ElemType::Pyramid13,
    ];

    /// Number of nodes an element of this type carries.
    pub fn num_nodes(&self) -> usize {
        match self {
            ElemType::Edge2 => 2,
            ElemType::Edge3 => 3,
            ElemType::Tri3 => 3,
            ElemType::Tri6 => 6,
            ElemType::Quad4 => 4,
            ElemType::Quad8 => 8,
            ElemType::Tet4 => 4,
            ElemType::Tet10 => 10,
            ElemType::Hex8 => 8,
            ElemType::Hex20 => 20,
            ElemType::Prism6 => 6,
            ElemType::Prism15 => 15,
            ElemType::Pyramid5 => 5,
            ElemType::Pyramid13 => 13,
        }
    }

    /// Number of vertex nodes; they occupy slots `0..num_corners()`.
    pub fn num_corners(&self) -> usize {
        match self {
            ElemType::Edge2 | ElemType::Edge3 => 2,
            ElemType::Tri3 | ElemType::Tri6 => 3,
            ElemType::Quad4 | ElemType::Quad8 => 4,
            ElemType::Tet4 | ElemType::Tet10 => 4,
            ElemType::Hex8 | ElemType::Hex20 => 8,
            ElemType::Prism6 | ElemType::Prism15 => 6,
            ElemType::Pyramid5 | ElemType::Pyramid13 => 5,
        }
    }

    /// Canonical upper-case name used in partition names.
    pub fn name(&self) -> &'static str {
        match self {
            ElemType::Edge2 => "EDGE2",
            ElemType::Edge3 => "EDGE3",
            ElemType::Tri3 => "TRI3",
            ElemType::Tri6 => "TRI6",
            ElemType::Quad4 => "QUAD4",
            ElemType::Quad8 => "QUAD8",
            ElemType::Tet4 => "TET4",
            ElemType::Tet10 => "TET10",
            ElemType::Hex8 => "HEX8",
            ElemType::Hex20 => "HEX20",
            ElemType::Prism6 => "PRISM6",
            ElemType::Prism15 => "PRISM15",
            ElemType::Pyramid5 => "PYRAMID5",
            ElemType::Pyramid13 => "PYRAMID13",
        }
    }
}

impl std::fmt::Display for ElemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_counts() {
        assert_eq!(ElemType::Hex20.num_nodes(), 20);
        assert_eq!(ElemType::Tet10.num_nodes(), 10);
        assert_eq!(ElemType::Prism15.num_nodes(), 15);
        assert_eq!(ElemType::Pyramid13.num_nodes(), 13);
        assert_eq!(ElemType::Quad4.num_nodes(), 4);
    }

    #[test]
    fn corners_never_exceed_nodes() {
        for t in ElemType::ALL {
            assert!(t.num_corners() <= t.num_nodes(), "{t}");
        }
    }

    #[test]
    fn names_are_distinct() {
        let mut names: Vec<&str> = ElemType::ALL.iter().map(ElemType::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ElemType::ALL.len());
        assert_eq!(ElemType::Hex20.to_string(), "HEX20");
    }
}
