//! Buffered line cursor with one-level mark/rewind.
//!
//! CDB component blocks have no terminator: a reader only knows the block is
//! over once it has read the first line of whatever follows. Instead of
//! saving and restoring raw stream offsets, readers `mark()` the cursor,
//! consume freely, and `rewind()` to hand the overshoot back.

use std::collections::VecDeque;
use std::io::BufRead;

use crate::Result;

pub struct LineCursor<R> {
    reader: R,
    /// Lines read from `reader` (or rewound) but not yet consumed.
    lookahead: VecDeque<(usize, String)>,
    /// Lines consumed since the last `mark()`.
    recording: Option<Vec<(usize, String)>>,
    lines_read: usize,
    current: usize,
    eof: bool,
}

impl<R: BufRead> LineCursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            lookahead: VecDeque::new(),
            recording: None,
            lines_read: 0,
            current: 0,
            eof: false,
        }
    }

    /// Ensure at least one line is buffered. Returns `false` at end of stream.
    fn fill(&mut self) -> Result<bool> {
        if !self.lookahead.is_empty() {
            return Ok(true);
        }
        if self.eof {
            return Ok(false);
        }

        let mut raw = String::new();
        if self.reader.read_line(&mut raw)? == 0 {
            self.eof = true;
            return Ok(false);
        }
        if raw.ends_with('\n') {
            raw.pop();
        }
        if raw.ends_with('\r') {
            raw.pop();
        }
        self.lines_read += 1;
        self.lookahead.push_back((self.lines_read, raw));
        Ok(true)
    }

    /// Look at the next line without consuming it.
    pub fn peek(&mut self) -> Result<Option<&str>> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(self.lookahead.front().map(|(_, line)| line.as_str()))
    }

    /// Consume and return the next line, or `None` at end of stream.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        if !self.fill()? {
            return Ok(None);
        }
        let Some((no, line)) = self.lookahead.pop_front() else {
            return Ok(None);
        };
        self.current = no;
        if let Some(recording) = self.recording.as_mut() {
            recording.push((no, line.clone()));
        }
        Ok(Some(line))
    }

    /// Consume up to `count` lines; returns how many were actually available.
    pub fn skip(&mut self, count: usize) -> Result<usize> {
        let mut skipped = 0;
        while skipped < count && self.next_line()?.is_some() {
            skipped += 1;
        }
        Ok(skipped)
    }

    /// 1-based number of the most recently consumed line (0 before any).
    pub fn line_number(&self) -> usize {
        self.current
    }

    /// Start recording consumed lines. A second `mark` discards the first.
    pub fn mark(&mut self) {
        self.recording = Some(Vec::new());
    }

    /// Push every line consumed since `mark()` back in front of the cursor.
    /// Without an active mark this is a no-op.
    pub fn rewind(&mut self) {
        let Some(recording) = self.recording.take() else {
            return;
        };
        if let Some((first, _)) = recording.first() {
            self.current = first - 1;
            log::trace!("rewinding {} line(s) to line {}", recording.len(), first);
        }
        for entry in recording.into_iter().rev() {
            self.lookahead.push_front(entry);
        }
    }

    /// Stop recording and keep everything consumed since `mark()`.
    pub fn release(&mut self) {
        self.recording = None;
    }
}
