//! Rolling statistics over a fixed sample window.
//!
//! The cache keeps two of these: one fed 1/0 per lookup (hit rate) and one
//! fed the returned value size per lookup (byte hit rate). Only the most
//! recent `window` samples contribute, so both rates track current behaviour
//! instead of lifetime averages.

use std::collections::VecDeque;

/// Mean over the most recent `window` recorded samples.
#[derive(Debug, Clone)]
pub struct RollingMean {
    samples: VecDeque<u64>,
    sum: u64,
    window: u32,
}

impl RollingMean {
    /// Creates an accumulator keeping the latest `window` samples.
    pub fn new(window: u32) -> Self {
        debug_assert!(window > 0);
        Self {
            samples: VecDeque::with_capacity(window as usize),
            sum: 0,
            window: window.max(1),
        }
    }

    /// Records one sample, discarding the oldest if the window is full.
    pub fn record(&mut self, sample: u64) {
        if self.samples.len() == self.window as usize {
            if let Some(oldest) = self.samples.pop_front() {
                self.sum -= oldest;
            }
        }
        self.samples.push_back(sample);
        self.sum += sample;
    }

    /// Mean of the recorded samples; 0.0 while no samples exist.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum as f64 / self.samples.len() as f64
        }
    }

    /// The configured window size.
    pub fn window(&self) -> u32 {
        self.window
    }

    /// Number of samples currently contributing to the mean.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples have been recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drops all samples, keeping the window size.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.sum = 0;
    }
}
