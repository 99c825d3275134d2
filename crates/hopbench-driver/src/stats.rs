// SPDX-License-Identifier: MIT OR Apache-2.0
//! Latency sample reduction: mean, min, max.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mean/min/max over a batch of latency samples, in milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct LatencyStats {
    /// Number of samples reduced.
    pub count: usize,
    /// Arithmetic mean latency.
    pub mean_ms: f64,
    /// Fastest sample.
    pub min_ms: f64,
    /// Slowest sample.
    pub max_ms: f64,
}

impl LatencyStats {
    /// Reduce a batch of samples. An empty batch yields all-zero stats.
    pub fn from_samples(samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let ms: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1_000.0).collect();
        let total: f64 = ms.iter().sum();
        let min = ms.iter().copied().fold(f64::INFINITY, f64::min);
        let max = ms.iter().copied().fold(0.0_f64, f64::max);
        Self {
            count: ms.len(),
            mean_ms: total / ms.len() as f64,
            min_ms: min,
            max_ms: max,
        }
    }
}
