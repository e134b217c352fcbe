/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Ready pool of the list scheduler.
//!
//! A fixed-capacity arena: capacity equals the task count, entries are
//! removed with `swap_remove`, and the minimum is found by a linear scan.
//! For the pool sizes seen in practice a scan beats keeping the pool sorted.
//!
//! # Tie-break policy
//! Entries are compared by `(priority, sequence)` where `sequence` counts
//! insertions.  Among tasks with equal priority the one inserted first wins,
//! independently of the positions `swap_remove` shuffles entries into.  Roots
//! are inserted in index order, children in the order they become ready.

#[derive(Debug, Clone, Copy)]
struct Entry {
    task: usize,
    priority: f64,
    sequence: usize,
}

#[derive(Debug)]
pub(crate) struct Pool {
    entries: Vec<Entry>,
    pushed: Vec<bool>,
    sequence: usize,
}

impl Pool {
    /// Create an empty pool for `capacity` tasks.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            pushed: vec![false; capacity],
            sequence: 0,
        }
    }

    /// Insert `task` unless it has been inserted before.
    ///
    /// Returns `false` when the task was already pushed once; a task enters
    /// the pool at most once over the pool's lifetime.
    pub(crate) fn push(&mut self, task: usize, priority: f64) -> bool {
        if self.pushed[task] {
            return false;
        }
        self.pushed[task] = true;
        self.entries.push(Entry {
            task,
            priority,
            sequence: self.sequence,
        });
        self.sequence += 1;
        true
    }

    /// Remove and return the task with the lowest priority value.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        let (mut best, mut first) = (0, self.entries.first()?);
        for (i, entry) in self.entries.iter().enumerate().skip(1) {
            if (entry.priority, entry.sequence) < (first.priority, first.sequence) {
                best = i;
                first = entry;
            }
        }
        Some(self.entries.swap_remove(best).task)
    }

    /// Number of tasks ever inserted.
    pub(crate) fn pushed(&self) -> usize {
        self.sequence
    }

    /// Tasks that were never inserted, in index order.
    pub(crate) fn never_pushed(&self) -> Vec<usize> {
        (0..self.pushed.len()).filter(|&t| !self.pushed[t]).collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
