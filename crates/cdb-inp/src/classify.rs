//! Block classification by keyword.
//!
//! Keywords are matched exactly as ANSYS writes them (upper case). The first
//! matching rule wins; everything else is boilerplate the reader skips.

use std::io::BufRead;

use crate::{LineCursor, Result};

const NBLOCK: &str = "NBLOCK,6,SOLID";
const ET: &str = "ET,";
const TYPE: &str = "TYPE,";
const CMBLOCK: &str = "CMBLOCK,";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `NBLOCK,6,SOLID...` at the start of the line.
    CoordinateBlockStart,
    /// `ET,<itype>,<code>` at the start of the line.
    ElementTypeDecl,
    /// `TYPE,<itype>` at the start of the line, followed by an `EBLOCK`.
    ElementBlockStart,
    /// `CMBLOCK,` anywhere in the line.
    NodeGroupBlockStart,
    Unrecognized,
    EndOfStream,
}

/// Classify a single line. Never returns [`BlockKind::EndOfStream`].
pub fn classify(line: &str) -> BlockKind {
    if line.starts_with(NBLOCK) {
        BlockKind::CoordinateBlockStart
    } else if line.starts_with(ET) {
        BlockKind::ElementTypeDecl
    } else if line.starts_with(TYPE) {
        BlockKind::ElementBlockStart
    } else if line.contains(CMBLOCK) {
        BlockKind::NodeGroupBlockStart
    } else {
        BlockKind::Unrecognized
    }
}

/// Classify the next unconsumed line of `cursor` without consuming it.
pub fn classify_next<R: BufRead>(cursor: &mut LineCursor<R>) -> Result<BlockKind> {
    Ok(match cursor.peek()? {
        Some(line) => classify(line),
        None => BlockKind::EndOfStream,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn recognises_block_keywords() {
        assert_eq!(
            classify("NBLOCK,6,SOLID,     12345,     12345"),
            BlockKind::CoordinateBlockStart
        );
        assert_eq!(classify("ET,       1,226"), BlockKind::ElementTypeDecl);
        assert_eq!(classify("TYPE,       1"), BlockKind::ElementBlockStart);
        assert_eq!(
            classify("CMBLOCK,BOTTOM  ,NODE,       4"),
            BlockKind::NodeGroupBlockStart
        );
    }

    #[test]
    fn matching_is_position_and_case_sensitive() {
        assert_eq!(classify(" ET,1,226"), BlockKind::Unrecognized);
        assert_eq!(classify("et,1,226"), BlockKind::Unrecognized);
        assert_eq!(classify("NBLOCK,6,SOLI"), BlockKind::Unrecognized);
        assert_eq!(classify("KEYOPT,1,1,0"), BlockKind::Unrecognized);
        // ETCON shares the prefix letters but not the comma.
        assert_eq!(classify("ETCON,SET"), BlockKind::Unrecognized);
    }

    #[test]
    fn component_keyword_may_be_indented() {
        assert_eq!(
            classify("  CMBLOCK,TOP,NODE,  2"),
            BlockKind::NodeGroupBlockStart
        );
    }

    #[test]
    fn classify_next_reports_end_of_stream() {
        let mut cursor = LineCursor::new(Cursor::new("TYPE, 1\n"));
        assert_eq!(
            classify_next(&mut cursor).expect("peek"),
            BlockKind::ElementBlockStart
        );
        cursor.next_line().expect("read");
        assert_eq!(
            classify_next(&mut cursor).expect("peek"),
            BlockKind::EndOfStream
        );
    }
}
