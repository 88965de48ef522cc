//! ANSYS element type codes and their target topologies.
//!
//! One ANSYS code covers a whole family: a 20-node brick record with repeated
//! node numbers is really a tetrahedron, wedge or pyramid. Each family is
//! therefore keyed by the *effective* node count (distinct nodes in the
//! record) and maps to a target topology plus a node permutation.
//!
//! Permutations are gathers: target slot `i` takes vendor slot
//! `permutation[i]` of the de-duplicated record. ANSYS quadratic solids list
//! the top-face mid-edge nodes before the vertical mid-edge nodes, the
//! Exodus ordering used by [`ElemType`] does the opposite, hence the swapped
//! tail on the HEX20 and PRISM15 entries.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use cdb_model::ElemType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown element type code {code}")]
    UnknownTopology { code: u32 },

    #[error("element type {code} has no topology with {nodes} distinct nodes")]
    AmbiguousOrUnsupportedNodeCount { code: u32, nodes: usize },

    #[error("{elem_type} permutation {permutation:?} is not an ordering of its {} slots", .elem_type.num_nodes())]
    InvalidPermutation {
        elem_type: ElemType,
        permutation: Vec<usize>,
    },
}

/// One node-count-specific entry of a family.
///
/// The permutation is always an ordering of `0..elem_type.num_nodes()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTypeDefinition {
    elem_type: ElemType,
    permutation: &'static [usize],
}

impl SubTypeDefinition {
    pub fn new(elem_type: ElemType, permutation: &'static [usize]) -> Result<Self, TableError> {
        if permutation.len() != elem_type.num_nodes() || !is_bijection(permutation) {
            return Err(TableError::InvalidPermutation {
                elem_type,
                permutation: permutation.to_vec(),
            });
        }
        Ok(Self {
            elem_type,
            permutation,
        })
    }

    pub fn elem_type(&self) -> ElemType {
        self.elem_type
    }

    /// Topology name used when naming partitions
    pub fn name(&self) -> &'static str {
        self.elem_type.name()
    }

    pub fn permutation(&self) -> &'static [usize] {
        self.permutation
    }

    pub fn num_nodes(&self) -> usize {
        self.permutation.len()
    }

    /// Reorder a de-duplicated vendor record into target slot order.
    ///
    /// `vendor` must hold exactly [`Self::num_nodes`] entries.
    pub fn apply<T: Copy>(&self, vendor: &[T]) -> Vec<T> {
        self.permutation.iter().map(|&src| vendor[src]).collect()
    }
}

/// All sub-types registered under one ANSYS code.
#[derive(Debug, Clone)]
pub struct ElementFamily {
    pub code: u32,
    pub name: &'static str,
    sub_types: BTreeMap<usize, SubTypeDefinition>,
}

impl ElementFamily {
    pub fn new(code: u32, name: &'static str) -> Self {
        Self {
            code,
            name,
            sub_types: BTreeMap::new(),
        }
    }

    /// Register `elem_type` for records with `permutation.len()` distinct nodes.
    pub fn with_sub_type(
        mut self,
        elem_type: ElemType,
        permutation: &'static [usize],
    ) -> Result<Self, TableError> {
        let def = SubTypeDefinition::new(elem_type, permutation)?;
        self.sub_types.insert(def.num_nodes(), def);
        Ok(self)
    }

    /// Built-in entries; their permutations are checked by the table tests.
    fn with_builtin(mut self, elem_type: ElemType, permutation: &'static [usize]) -> Self {
        self.sub_types.insert(
            permutation.len(),
            SubTypeDefinition {
                elem_type,
                permutation,
            },
        );
        self
    }

    pub fn sub_type(&self, nodes: usize) -> Option<&SubTypeDefinition> {
        self.sub_types.get(&nodes)
    }

    pub fn sub_types(&self) -> impl Iterator<Item = &SubTypeDefinition> {
        self.sub_types.values()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ElementTypeTable {
    families: HashMap<u32, ElementFamily>,
}

impl ElementTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in ANSYS table, built on first use.
    pub fn ansys() -> &'static ElementTypeTable {
        static TABLE: LazyLock<ElementTypeTable> = LazyLock::new(build_ansys_table);
        &TABLE
    }

    pub fn register(&mut self, family: ElementFamily) {
        self.families.insert(family.code, family);
    }

    pub fn family(&self, code: u32) -> Option<&ElementFamily> {
        self.families.get(&code)
    }

    /// Registered codes, ascending.
    pub fn codes(&self) -> Vec<u32> {
        let mut codes: Vec<u32> = self.families.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    pub fn lookup(&self, code: u32, nodes: usize) -> Result<&SubTypeDefinition, TableError> {
        let family = self
            .families
            .get(&code)
            .ok_or(TableError::UnknownTopology { code })?;
        family
            .sub_type(nodes)
            .ok_or(TableError::AmbiguousOrUnsupportedNodeCount { code, nodes })
    }
}

fn is_bijection(permutation: &[usize]) -> bool {
    let mut seen = vec![false; permutation.len()];
    for &p in permutation {
        match seen.get_mut(p) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

static IDENTITY: [usize; 20] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
];

fn identity(n: usize) -> &'static [usize] {
    &IDENTITY[..n]
}

// SOLID186: corners, bottom mid-edges, top mid-edges (12..16), vertical
// mid-edges (16..20).
static SOLID186_HEX20: [usize; 20] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 16, 17, 18, 19, 12, 13, 14, 15,
];
static SOLID186_PRISM15: [usize; 15] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 12, 13, 14, 9, 10, 11];

// SOLID226 exports start each face one corner later than SOLID186.
static SOLID226_HEX20: [usize; 20] = [
    3, 0, 1, 2, 7, 4, 5, 6, 11, 8, 9, 10, 19, 16, 17, 18, 15, 12, 13, 14,
];
static SOLID226_TET10: [usize; 10] = [2, 0, 1, 3, 6, 4, 5, 9, 7, 8];
static SOLID226_PRISM15: [usize; 15] = [2, 0, 1, 5, 3, 4, 8, 6, 7, 14, 12, 13, 11, 9, 10];
static SOLID226_PYRAMID13: [usize; 13] = [3, 0, 1, 2, 4, 8, 5, 6, 7, 12, 9, 10, 11];

fn build_ansys_table() -> ElementTypeTable {
    let mut table = ElementTypeTable::new();

    table.register(ElementFamily::new(180, "LINK180").with_builtin(ElemType::Edge2, identity(2)));

    table.register(
        ElementFamily::new(181, "SHELL181")
            .with_builtin(ElemType::Quad4, identity(4))
            .with_builtin(ElemType::Tri3, identity(3)),
    );

    table.register(
        ElementFamily::new(281, "SHELL281")
            .with_builtin(ElemType::Quad8, identity(8))
            .with_builtin(ElemType::Tri6, identity(6)),
    );

    table.register(
        ElementFamily::new(185, "SOLID185")
            .with_builtin(ElemType::Hex8, identity(8))
            .with_builtin(ElemType::Prism6, identity(6))
            .with_builtin(ElemType::Pyramid5, identity(5))
            .with_builtin(ElemType::Tet4, identity(4)),
    );

    table.register(
        ElementFamily::new(186, "SOLID186")
            .with_builtin(ElemType::Hex20, &SOLID186_HEX20)
            .with_builtin(ElemType::Prism15, &SOLID186_PRISM15)
            .with_builtin(ElemType::Pyramid13, identity(13))
            .with_builtin(ElemType::Tet10, identity(10)),
    );

    table.register(ElementFamily::new(187, "SOLID187").with_builtin(ElemType::Tet10, identity(10)));

    table.register(ElementFamily::new(285, "SOLID285").with_builtin(ElemType::Tet4, identity(4)));

    table.register(
        ElementFamily::new(226, "SOLID226")
            .with_builtin(ElemType::Hex20, &SOLID226_HEX20)
            .with_builtin(ElemType::Tet10, &SOLID226_TET10)
            .with_builtin(ElemType::Prism15, &SOLID226_PRISM15)
            .with_builtin(ElemType::Pyramid13, &SOLID226_PYRAMID13),
    );

    table
}
