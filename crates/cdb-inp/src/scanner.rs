//! Field splitting for keyword lines and numeric records.

use crate::{Result, ScanError};

/// Split `line` on every occurrence of `delimiter`.
///
/// Empty fields are kept, so `"ET,1,"` yields `["ET", "1", ""]`. Fields are
/// not trimmed; callers trim the ones they interpret.
pub fn tokenize(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).collect()
}

/// Parse every whitespace-separated token of `line` as a signed integer.
///
/// `line_no` is only used for error reporting.
pub fn parse_signed_ints(line: &str, line_no: usize) -> Result<Vec<i64>> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| ScanError::MalformedNumericLine {
                    line: line_no,
                    token: token.to_string(),
                })
        })
        .collect()
}

/// True when `token` is an optionally signed run of ASCII digits.
pub fn is_integer_token(token: &str) -> bool {
    let digits = token.strip_prefix(['-', '+']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
