//! Heart-rate history and SDNN-based HRV estimation
//! Location: src/hal/simulation/hrv_tracker.rs

use crate::config::constants::{hrv, physiology::RESTING_HRV_MS};
use crate::utils::conversion::bpm_to_rr_interval_ms;
use std::collections::VecDeque;

/// Bounded window of the most recent HR values, oldest evicted first
#[derive(Debug, Clone)]
pub struct HrHistory {
    values: VecDeque<f64>,
    capacity: usize,
}

impl HrHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(hrv::MIN_HISTORY_WINDOW);
        Self {
            values: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, hr_bpm: f64) {
        self.values.push_back(hr_bpm);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// HRV (SDNN) in milliseconds.
    ///
    /// Each HR becomes an RR interval (`60000 / HR`), consecutive absolute
    /// differences form the NN series, and the population standard deviation
    /// of that series is clamped to `[10, 200]` ms. With fewer than two HR
    /// values the resting default of 50 ms is returned.
    pub fn sdnn(&self) -> f64 {
        if self.values.len() < 2 {
            return RESTING_HRV_MS;
        }

        let rr: Vec<f64> = self.values.iter().map(|&hr| bpm_to_rr_interval_ms(hr)).collect();
        let nn: Vec<f64> = rr.windows(2).map(|pair| (pair[1] - pair[0]).abs()).collect();

        let n = nn.len() as f64;
        let mean = nn.iter().sum::<f64>() / n;
        let variance = nn.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        variance.sqrt().clamp(hrv::SDNN_MIN_MS, hrv::SDNN_MAX_MS)
    }
}

impl Default for HrHistory {
    fn default() -> Self {
        Self::new(hrv::DEFAULT_HISTORY_WINDOW)
    }
}
