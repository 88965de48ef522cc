//! Error types for cdb-io

use cdb_inp::ScanError;
use cdb_model::MeshError;
use thiserror::Error;

use crate::element_table::TableError;

pub type Result<T> = std::result::Result<T, ImportError>;

/// Every variant except `Mesh` and `InvalidOptions` aborts the import at the
/// reported line; the destination mesh is left partially populated.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("cannot read {path}: {source}")]
    StreamUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: malformed numeric record: {message}")]
    MalformedNumericLine { line: usize, message: String },

    #[error("line {line}: malformed declaration: {message}")]
    MalformedDeclaration { line: usize, message: String },

    #[error("line {line}: element block without a preceding ET declaration")]
    MissingElementType { line: usize },

    #[error("line {line}: unknown element type code {code}")]
    UnknownTopology { line: usize, code: u32 },

    #[error("line {line}: element type {code} has no topology with {nodes} distinct nodes")]
    AmbiguousOrUnsupportedNodeCount { line: usize, code: u32, nodes: usize },

    #[error("line {line}: node {node} is not defined in any coordinate block")]
    UnresolvedNodeReference { line: usize, node: i64 },

    #[error("line {line}: element {element} is not defined in any element block")]
    UnresolvedElementReference { line: usize, element: i64 },

    #[error("line {line}: node {node} is defined twice")]
    DuplicateForeignNodeId { line: usize, node: i64 },

    #[error("line {line}: element block is not followed by a name line")]
    MissingBlockName { line: usize },

    #[error("line {line}: stream ended inside {context}")]
    UnexpectedEndOfStream { line: usize, context: &'static str },

    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("invalid import options: {0}")]
    InvalidOptions(String),
}

impl ImportError {
    pub(crate) fn from_table(err: TableError, line: usize) -> Self {
        match err {
            TableError::UnknownTopology { code } => ImportError::UnknownTopology { line, code },
            TableError::AmbiguousOrUnsupportedNodeCount { code, nodes } => {
                ImportError::AmbiguousOrUnsupportedNodeCount { line, code, nodes }
            }
            err @ TableError::InvalidPermutation { .. } => ImportError::MalformedDeclaration {
                line,
                message: err.to_string(),
            },
        }
    }

    /// Source line the error was raised on, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ImportError::MalformedNumericLine { line, .. }
            | ImportError::MalformedDeclaration { line, .. }
            | ImportError::MissingElementType { line }
            | ImportError::UnknownTopology { line, .. }
            | ImportError::AmbiguousOrUnsupportedNodeCount { line, .. }
            | ImportError::UnresolvedNodeReference { line, .. }
            | ImportError::UnresolvedElementReference { line, .. }
            | ImportError::DuplicateForeignNodeId { line, .. }
            | ImportError::MissingBlockName { line }
            | ImportError::UnexpectedEndOfStream { line, .. } => Some(*line),
            ImportError::StreamUnreadable { .. }
            | ImportError::Mesh(_)
            | ImportError::InvalidOptions(_) => None,
        }
    }
}

impl From<ScanError> for ImportError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Io(source) => ImportError::StreamUnreadable {
                path: "<stream>".to_string(),
                source,
            },
            ScanError::MalformedNumericLine { line, token } => ImportError::MalformedNumericLine {
                line,
                message: format!("{token:?} is not an integer"),
            },
        }
    }
}
