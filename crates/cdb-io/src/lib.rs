//! ANSYS CDB mesh import.
//!
//! This crate provides:
//! - the **element type table** mapping ANSYS element codes and effective node
//!   counts to target topologies and node permutations ([`ElementTypeTable`])
//! - the block importers for `NBLOCK` coordinates, `ET`/`EBLOCK` connectivity
//!   and `CMBLOCK` components
//! - the **driver** ([`CdbReader`], [`import`]) that runs them over a file or
//!   any buffered stream and writes into a [`cdb_model::MeshSink`]
//!
//! ```no_run
//! use cdb_model::Mesh;
//!
//! let mut mesh = Mesh::new();
//! cdb_io::import("bracket.cdb", &mut mesh)?;
//! # Ok::<(), cdb_io::ImportError>(())
//! ```

pub mod element_table;
mod elements;
pub mod error;
mod groups;
mod nodes;
pub mod options;
mod reader;
mod session;

pub use element_table::{ElementFamily, ElementTypeTable, SubTypeDefinition, TableError};
pub use error::{ImportError, Result};
pub use options::{DuplicateNodePolicy, ImportOptions};
pub use reader::{CdbReader, import};
pub use session::ImportReport;
