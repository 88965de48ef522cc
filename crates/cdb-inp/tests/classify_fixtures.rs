//! Block classification over complete CDB fixtures.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use cdb_inp::{BlockKind, LineCursor, classify, classify_next};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures/cdb");
    path.push(name);
    path
}

fn block_counts(name: &str) -> HashMap<BlockKind, usize> {
    let file = File::open(fixture_path(name)).expect("fixture should exist");
    let mut cursor = LineCursor::new(BufReader::new(file));
    let mut counts = HashMap::new();
    loop {
        let kind = classify_next(&mut cursor).expect("fixture is readable");
        if kind == BlockKind::EndOfStream {
            break;
        }
        *counts.entry(kind).or_insert(0) += 1;
        cursor.next_line().expect("fixture is readable");
    }
    counts
}

#[test]
fn test_mixed_shell_block_starts() {
    let counts = block_counts("mixed_shell.cdb");
    assert_eq!(counts.get(&BlockKind::CoordinateBlockStart), Some(&1));
    assert_eq!(counts.get(&BlockKind::ElementTypeDecl), Some(&1));
    assert_eq!(counts.get(&BlockKind::ElementBlockStart), Some(&1));
    assert_eq!(counts.get(&BlockKind::NodeGroupBlockStart), Some(&3));
}

#[test]
fn test_crlf_fixture_classifies_like_lf() {
    assert_eq!(block_counts("quad_strip.cdb"), block_counts("quad_strip_crlf.cdb"));
}

#[test]
fn test_record_lines_are_not_block_starts() {
    let text = std::fs::read_to_string(fixture_path("bracket_solid226.cdb"))
        .expect("fixture should exist");
    let starts = text
        .lines()
        .filter(|line| line.trim_start().starts_with(|c: char| c.is_ascii_digit() || c == '-'))
        .filter(|line| classify(line) != BlockKind::Unrecognized)
        .count();
    assert_eq!(starts, 0);
}
