use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Number of ranges kept for zoom-out.
pub const ZOOM_STACK_CAPACITY: usize = 20;

/// X range remembered before a zoom-in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Bounded LIFO of previous X ranges.
#[derive(Debug, Clone, Default)]
pub struct ZoomStack {
    ranges: SmallVec<[ZoomRange; ZOOM_STACK_CAPACITY]>,
}

impl ZoomStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `range`; returns `false` and drops it when the stack is full.
    pub fn push(&mut self, range: ZoomRange) -> bool {
        if self.ranges.len() >= ZOOM_STACK_CAPACITY {
            return false;
        }
        self.ranges.push(range);
        true
    }

    pub fn pop(&mut self) -> Option<ZoomRange> {
        self.ranges.pop()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
