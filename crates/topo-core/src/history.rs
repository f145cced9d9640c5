//! Bounded buffer of historical points kept by a consumer.
//!
//! Series are generated on demand and either appended to or replace the
//! buffer's contents. Only the most recent `capacity` points are retained.

use std::collections::VecDeque;

use crate::types::HistoryPoint;

/// Default number of points retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// FIFO buffer holding the most recent history points.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    capacity: usize,
    points: VecDeque<HistoryPoint>,
}

impl HistoryBuffer {
    /// Create a buffer; a zero capacity is bumped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, points: VecDeque::with_capacity(capacity) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: HistoryPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Append points, evicting the oldest beyond capacity.
    pub fn extend(&mut self, points: impl IntoIterator<Item = HistoryPoint>) {
        for p in points {
            self.push(p);
        }
    }

    /// Discard current contents and load `points` (tail-truncated to capacity).
    pub fn replace(&mut self, points: impl IntoIterator<Item = HistoryPoint>) {
        self.points.clear();
        self.extend(points);
    }

    /// The newest `n` points, oldest first.
    pub fn latest(&self, n: usize) -> Vec<HistoryPoint> {
        let skip = self.points.len().saturating_sub(n);
        self.points.iter().skip(skip).copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
