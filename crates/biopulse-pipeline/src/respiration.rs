//! Respiration phase classification and rate estimation.
//!
//! The raw effort signal is smoothed with a bounded moving average, and
//! the smoothed value is classified against two fixed thresholds into
//! apnea, inspiration, or expiration. Classification is recomputed from
//! scratch every tick; the only transition that carries state is
//! apnea-to-inspiration, which marks the onset of a new breath and
//! drives the rate estimate.

use std::collections::VecDeque;

use biopulse_core::{RespPhase, RESP_THRESHOLD_HIGH, RESP_THRESHOLD_LOW, SMOOTHING_WINDOW};

/// Output of one classifier tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespReading {
    /// Moving-average of the effort signal over the smoothing window.
    pub smoothed: f64,
    /// Phase classified from the smoothed value.
    pub phase: RespPhase,
    /// Breaths per minute; updated only on an apnea-to-inspire edge.
    pub rate: f64,
}

/// Stateful respiration classifier over a bounded smoothing window.
pub struct RespirationClassifier {
    buffer: VecDeque<i32>,
    window: usize,
    phase: RespPhase,
    rate: f64,
    /// Clock reading at the last breath onset (seconds).
    last_transition: f64,
}

impl RespirationClassifier {
    /// Create a classifier; `now_secs` seeds the breath-onset clock so
    /// the first detected breath yields a finite rate.
    #[must_use]
    pub fn new(now_secs: f64) -> Self {
        Self::with_window(SMOOTHING_WINDOW, now_secs)
    }

    /// Create a classifier with an explicit smoothing window length.
    #[must_use]
    pub fn with_window(window: usize, now_secs: f64) -> Self {
        Self {
            buffer: VecDeque::with_capacity(window),
            window: window.max(1),
            phase: RespPhase::Apnea,
            rate: 0.0,
            last_transition: now_secs,
        }
    }

    /// Feed one raw respiration sample at clock time `now_secs`.
    pub fn process(&mut self, respiration_raw: i32, now_secs: f64) -> RespReading {
        if self.buffer.len() >= self.window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(respiration_raw);

        let smoothed =
            self.buffer.iter().map(|&v| f64::from(v)).sum::<f64>() / self.buffer.len() as f64;

        let prev = self.phase;
        self.phase = classify(smoothed);

        if prev == RespPhase::Apnea && self.phase == RespPhase::Inspire {
            let dt = now_secs - self.last_transition;
            if dt > 0.0 {
                self.rate = round1(60.0 / dt);
            }
            self.last_transition = now_secs;
        }

        RespReading {
            smoothed,
            phase: self.phase,
            rate: self.rate,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> RespPhase {
        self.phase
    }

    /// Current rate estimate in breaths per minute.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Number of samples in the smoothing window.
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

/// Pure three-band classification of a smoothed effort value.
#[must_use]
pub fn classify(smoothed: f64) -> RespPhase {
    if smoothed > RESP_THRESHOLD_HIGH {
        RespPhase::Inspire
    } else if smoothed < RESP_THRESHOLD_LOW {
        RespPhase::Expire
    } else {
        RespPhase::Apnea
    }
}

/// Round to one decimal place, the precision of the rate estimate.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
