//! Lexical layer for ANSYS `.cdb` mesh exports.
//!
//! This crate knows nothing about meshes. It provides:
//! - a delimiter **scanner** for keyword lines and a signed-integer scanner
//!   for numeric records ([`tokenize`], [`parse_signed_ints`])
//! - a buffered [`LineCursor`] with peek/consume and mark/rewind, used by
//!   readers that only learn a block has ended after reading past it
//! - the [`BlockKind`] classifier that tags the line starting each block

mod classify;
mod cursor;
mod scanner;

pub use classify::{BlockKind, classify, classify_next};
pub use cursor::LineCursor;
pub use scanner::{is_integer_token, parse_signed_ints, tokenize};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: token {token:?} is not an integer")]
    MalformedNumericLine { line: usize, token: String },
}
