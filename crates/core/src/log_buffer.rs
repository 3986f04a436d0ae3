// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded per-job log buffer.

use std::collections::VecDeque;

/// Default number of lines retained per job.
pub const DEFAULT_LOG_CAPACITY: usize = 500;

/// Append-only sequence of log lines with FIFO eviction.
///
/// The length never exceeds the capacity; appending beyond it evicts the
/// oldest lines first. A capacity of zero is treated as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRingBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for LogRingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl LogRingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { lines: VecDeque::with_capacity(capacity.min(64)), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append one or many lines as a single operation.
    ///
    /// Returns the number of lines evicted. When the batch alone exceeds the
    /// capacity, only its tail is kept and its head counts as evicted.
    pub fn extend<I, S>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut evicted = 0;
        for line in lines {
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
                evicted += 1;
            }
            self.lines.push_back(line.into());
        }
        evicted
    }

    /// Append a single line. Returns true if the oldest line was evicted.
    pub fn push(&mut self, line: impl Into<String>) -> bool {
        self.extend(std::iter::once(line)) > 0
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Copy of the retained lines, oldest first.
    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

#[cfg(test)]
#[path = "log_buffer_tests.rs"]
mod tests;
