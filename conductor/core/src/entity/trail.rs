//! Fixed-length position history for fading trails

use std::collections::VecDeque;

use glam::Vec3;

/// Most-recent-first ring of past positions
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trail {
    samples: VecDeque<Vec3>,
    capacity: usize,
}

impl Trail {
    /// Create an empty trail holding at most `capacity` samples
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a new head position, evicting the oldest past capacity
    pub fn push(&mut self, position: Vec3) {
        if self.capacity == 0 {
            return;
        }
        self.samples.push_front(position);
        self.samples.truncate(self.capacity);
    }

    /// Forget all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Samples, newest first
    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.samples.iter()
    }

    /// Number of stored samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Linear fade for the sample at `index` (1.0 at the head)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fade(&self, index: usize) -> f32 {
        if self.capacity == 0 {
            return 0.0;
        }
        (1.0 - index as f32 / self.capacity as f32).max(0.0)
    }
}
