// Rolling vibration history for sustained-condition detection
use serde::Serialize;
use std::collections::VecDeque;

/// The most recent sample plus the twenty before it.
pub const DEFAULT_VIBRATION_CAPACITY: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VibrationSample {
    pub magnitude: f64,
    pub observed_at_ms: i64,
}

impl VibrationSample {
    pub fn new(magnitude: f64, observed_at_ms: i64) -> Self {
        Self {
            magnitude,
            observed_at_ms,
        }
    }
}

/// Fixed-capacity FIFO of vibration magnitudes. Oldest samples are evicted
/// once the buffer is full.
#[derive(Debug, Clone)]
pub struct VibrationHistory {
    capacity: usize,
    samples: VecDeque<VibrationSample>,
}

impl VibrationHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: VibrationSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Number of retained samples whose magnitude is strictly above `threshold`.
    pub fn count_above(&self, threshold: f64) -> usize {
        self.samples.iter().filter(|s| s.magnitude > threshold).count()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &VibrationSample> {
        self.samples.iter()
    }
}

impl Default for VibrationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_VIBRATION_CAPACITY)
    }
}

impl FromIterator<VibrationSample> for VibrationHistory {
    /// Collects into a default-capacity buffer, keeping only the newest samples.
    fn from_iter<I: IntoIterator<Item = VibrationSample>>(iter: I) -> Self {
        let mut history = Self::default();
        for sample in iter {
            history.push(sample);
        }
        history
    }
}
