// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental tailer over an append-only JSONL trace file.
//!
//! Holds a byte offset across calls so the monitor loop only re-reads what's
//! new. A trailing partial line (the writer mid-append) is left unconsumed
//! until the next poll completes it. Lines that fail to decode as the
//! expected type are skipped rather than treated as a fatal error — a
//! provider CLI occasionally emits a stray non-JSON line to its trace file.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::PathBuf;

pub struct Tail {
    path: PathBuf,
    offset: u64,
}

impl Tail {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), offset: 0 }
    }

    /// Resume tailing from a previously recorded offset (e.g. after a daemon
    /// restart reattaches a monitor to an already-partially-read trace).
    pub fn resume_at(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self { path: path.into(), offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read every complete line appended since the last call, advancing the
    /// held offset past them. Returns raw strings; callers decode.
    pub fn read_new_lines(&mut self) -> std::io::Result<Vec<String>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let len = file.metadata()?.len();
        if len < self.offset {
            // File was truncated/replaced (e.g. a resumed spawn starting a
            // fresh trace file); restart from the top.
            self.offset = 0;
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(self.offset))?;

        let mut lines = Vec::new();
        let mut consumed = self.offset;
        loop {
            let mut buf = String::new();
            match reader.read_line(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if !buf.ends_with('\n') {
                        // Partial line: writer hasn't flushed the newline
                        // yet. Leave it for the next poll.
                        break;
                    }
                    consumed += n as u64;
                    let trimmed = buf.trim_end();
                    if !trimmed.is_empty() {
                        lines.push(trimmed.to_string());
                    }
                }
                Err(e) => return Err(e),
            }
        }
        self.offset = consumed;
        Ok(lines)
    }
}

#[cfg(test)]
#[path = "tail_tests.rs"]
mod tests;
