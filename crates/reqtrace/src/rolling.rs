// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::iter::Chain;
use std::ops::Range;

/// Write-cursor state over a fixed-capacity ring of slots.
///
/// A plain value: every transition consumes the old state and returns the new
/// one, so the arithmetic can be exercised without any storage attached. The
/// owning store keeps one of these behind its lock and swaps it on each write.
///
/// The cursor is the slot most recently written. It is `None` until the first
/// call to [`next`](Self::next).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingIndex {
    capacity: usize,
    curr: Option<usize>,
    wrapped: bool,
}

impl RollingIndex {
    /// Create an empty index. Returns `None` for a zero capacity.
    pub fn new(capacity: usize) -> Option<Self> {
        if capacity == 0 {
            return None;
        }
        Some(Self { capacity, curr: None, wrapped: false })
    }

    /// Advance the cursor by one slot, wrapping to 0 after `capacity - 1`.
    #[must_use]
    pub fn next(self) -> Self {
        match self.curr {
            Some(c) if c + 1 >= self.capacity => Self { curr: Some(0), wrapped: true, ..self },
            Some(c) => Self { curr: Some(c + 1), ..self },
            None => Self { curr: Some(0), ..self },
        }
    }

    /// Back to the empty state. A zero `capacity` keeps the current one.
    #[must_use]
    pub fn reset(self, capacity: usize) -> Self {
        let capacity = if capacity > 0 { capacity } else { self.capacity };
        Self { capacity, curr: None, wrapped: false }
    }

    pub fn curr(&self) -> Option<usize> {
        self.curr
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the cursor has completed a full lap and come back to slot 0,
    /// which first happens on write `capacity + 1`. Use
    /// `populated_count() == capacity()` to test for a full buffer.
    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn is_empty(&self) -> bool {
        self.curr.is_none()
    }

    /// Number of slots holding data.
    pub fn populated_count(&self) -> usize {
        if self.wrapped {
            self.capacity
        } else {
            self.curr.map_or(0, |c| c + 1)
        }
    }

    /// Populated slots, oldest first.
    ///
    /// After wrapping, the oldest slot is the one right after the cursor, so
    /// the sequence is `curr+1..capacity` followed by `0..=curr`.
    pub fn ordered_slots(&self) -> Chain<Range<usize>, Range<usize>> {
        let head = self.curr.map_or(0, |c| c + 1);
        let tail = if self.wrapped { head..self.capacity } else { 0..0 };
        tail.chain(0..head)
    }

    /// Slot holding the entry written `n` captures ago (0 = newest).
    ///
    /// Pure arithmetic: the result is always in `0..capacity` but may point at
    /// a slot that was never written. Callers check
    /// [`populated_count`](Self::populated_count) first.
    pub fn slot_back(&self, n: usize) -> Option<usize> {
        let curr = self.curr?;
        let n = n % self.capacity;
        Some(if n <= curr { curr - n } else { self.capacity - (n - curr) })
    }
}

#[cfg(test)]
#[path = "rolling_tests.rs"]
mod tests;
