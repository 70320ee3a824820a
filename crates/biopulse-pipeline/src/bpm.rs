//! Heart rate estimation from the raw PPG channel.
//!
//! Peak detection uses adaptive thresholds derived from the min-max range
//! of a bounded sample buffer: a beat triggers when the raw value crosses
//! the upper threshold, and the detector re-arms only after the signal
//! falls below the lower one. The gap between the two thresholds keeps a
//! single peak's shoulder from triggering twice. A refractory floor on
//! the inter-beat sample count rejects double-triggers and burst noise
//! regardless of amplitude.

use std::collections::VecDeque;

use biopulse_core::{
    BEAT_REFRACTORY_SAMPLES, DIP_THRESHOLD_RATIO, PEAK_THRESHOLD_RATIO, PPG_BUFFER_CAP,
    PPG_MIN_SAMPLES,
};

/// Stateful PPG peak detector producing a beats-per-minute estimate.
pub struct BpmEstimator {
    /// Rolling window of raw PPG samples (oldest first).
    buffer: VecDeque<i32>,
    /// Samples seen since the last detected beat.
    samples_since_beat: u64,
    /// Latched after a beat until the signal dips below the low threshold.
    waiting_for_dip: bool,
    /// Latest BPM estimate; 0 until the first beat pair.
    bpm: u32,
    sample_rate_hz: f64,
    buffer_cap: usize,
    min_samples: usize,
    refractory: u64,
}

impl BpmEstimator {
    /// Create an estimator for a source running at `sample_rate_hz`.
    #[must_use]
    pub fn new(sample_rate_hz: f64) -> Self {
        Self::with_capacity(sample_rate_hz, PPG_BUFFER_CAP, PPG_MIN_SAMPLES, BEAT_REFRACTORY_SAMPLES)
    }

    /// Create an estimator with explicit buffer tuning.
    #[must_use]
    pub fn with_capacity(
        sample_rate_hz: f64,
        buffer_cap: usize,
        min_samples: usize,
        refractory: u64,
    ) -> Self {
        Self {
            buffer: VecDeque::with_capacity(buffer_cap),
            samples_since_beat: 0,
            waiting_for_dip: false,
            bpm: 0,
            sample_rate_hz,
            buffer_cap,
            min_samples,
            refractory,
        }
    }

    /// Feed one raw PPG sample and return the current BPM estimate.
    ///
    /// The estimate only changes on a detected beat; between beats (and
    /// while the buffer is still warming up) the prior value is retained.
    pub fn process(&mut self, ppg_raw: i32) -> u32 {
        if self.buffer.len() >= self.buffer_cap {
            self.buffer.pop_front();
        }
        self.buffer.push_back(ppg_raw);
        self.samples_since_beat += 1;

        if self.buffer.len() <= self.min_samples {
            return self.bpm;
        }

        let mut min_v = i32::MAX;
        let mut max_v = i32::MIN;
        for &v in &self.buffer {
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let range = f64::from(max_v - min_v);
        let high = f64::from(min_v) + range * PEAK_THRESHOLD_RATIO;
        let low = f64::from(min_v) + range * DIP_THRESHOLD_RATIO;

        if f64::from(ppg_raw) > high
            && !self.waiting_for_dip
            && self.samples_since_beat > self.refractory
        {
            // Truncating division matches the reference estimator exactly.
            self.bpm = (self.sample_rate_hz / self.samples_since_beat as f64 * 60.0) as u32;
            self.samples_since_beat = 0;
            self.waiting_for_dip = true;
        }

        if f64::from(ppg_raw) < low {
            self.waiting_for_dip = false;
        }

        self.bpm
    }

    /// Latest BPM estimate without feeding a sample.
    #[must_use]
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Number of PPG samples currently buffered.
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Reset all detector state.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.samples_since_beat = 0;
        self.waiting_for_dip = false;
        self.bpm = 0;
    }
}
