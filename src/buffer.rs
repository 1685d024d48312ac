//! Fixed-capacity sample ring buffers with windowed averaging

use crate::error::FusionError;
use nalgebra::Vector3;

/// Fixed-capacity ring buffer of vectors for one sensor channel
///
/// Insertion is append-with-eviction-of-oldest. The buffer never grows past
/// `N` and never blocks; averaging is over the most recent window only.
#[derive(Debug, Clone, Copy)]
pub struct VectorBuffer<const N: usize> {
    data: [Vector3<f32>; N],
    /// Next insertion slot
    head: usize,
    /// Number of valid entries, saturates at N
    len: usize,
}

impl<const N: usize> VectorBuffer<N> {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            data: [Vector3::zeros(); N],
            head: 0,
            len: 0,
        }
    }

    /// Append a vector, evicting the oldest entry once at capacity
    pub fn push(&mut self, vector: Vector3<f32>) {
        self.data[self.head] = vector;
        self.head = (self.head + 1) % N;
        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of valid entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no samples have been pushed yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Buffer capacity
    pub fn capacity(&self) -> usize {
        N
    }

    /// Discard all entries
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// The most recent entry, newest first at index 0
    pub fn recent(&self, age: usize) -> Option<Vector3<f32>> {
        if age >= self.len {
            return None;
        }
        let idx = (self.head + N - 1 - age) % N;
        Some(self.data[idx])
    }

    /// Iterate over all valid entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = Vector3<f32>> + '_ {
        let start = (self.head + N - self.len) % N;
        (0..self.len).map(move |i| self.data[(start + i) % N])
    }

    /// Arithmetic mean of the most recent `window` entries
    ///
    /// Returns [`FusionError::InsufficientData`] until `window` samples have
    /// been pushed; callers treat that as "not yet calibrated", not a fault.
    pub fn average(&self, window: usize) -> Result<Vector3<f32>, FusionError> {
        if window == 0 || window > N {
            return Err(FusionError::InvalidArgument);
        }
        if self.len < window {
            return Err(FusionError::InsufficientData);
        }

        let mut sum = Vector3::zeros();
        for age in 0..window {
            let idx = (self.head + N - 1 - age) % N;
            sum += self.data[idx];
        }

        Ok(sum / window as f32)
    }

    /// Per-axis minima and maxima over all valid entries
    pub fn extents(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        if self.len == 0 {
            return None;
        }

        let mut min = Vector3::repeat(f32::INFINITY);
        let mut max = Vector3::repeat(f32::NEG_INFINITY);
        for v in self.iter() {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }

        Some((min, max))
    }
}

impl<const N: usize> Default for VectorBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
