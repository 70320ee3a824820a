//! Rolling history of derived metrics over the 60 s retention window.
//!
//! Four parallel bounded sequences (bpm, respiration rate, phase,
//! smoothed respiration) that always hold the same number of entries.
//! Per-phase occurrence counts and the bpm/rate sums are maintained
//! incrementally on push and evict, so the once-per-second reduction
//! into a [`HistorySummary`] does not rescan the window for them; only
//! the amplitude min-max walks the smoothed sequence.

use std::collections::VecDeque;

use biopulse_core::{RespPhase, HISTORY_CAP};

/// Reduction of the current history window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySummary {
    /// Mean BPM, rounded to the nearest integer.
    pub bpm_avg: u32,
    /// Mean respiration rate, rounded to one decimal.
    pub resp_rate_avg: f64,
    /// Most frequent phase; ties go to the first encountered in window order.
    pub dominant_phase: RespPhase,
    /// Rounded peak-to-peak smoothed respiration.
    pub resp_amplitude: i64,
}

/// Four parallel FIFO sequences capped at the retention window.
pub struct MetricsHistory {
    bpm: VecDeque<u32>,
    resp_rate: VecDeque<f64>,
    phases: VecDeque<RespPhase>,
    smoothed: VecDeque<f64>,
    cap: usize,
    phase_counts: [usize; 3],
    bpm_sum: u64,
    rate_sum: f64,
}

const fn phase_index(phase: RespPhase) -> usize {
    match phase {
        RespPhase::Apnea => 0,
        RespPhase::Inspire => 1,
        RespPhase::Expire => 2,
    }
}

const PHASES: [RespPhase; 3] = [RespPhase::Apnea, RespPhase::Inspire, RespPhase::Expire];

impl MetricsHistory {
    /// Create a history with the default 60 s retention cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAP)
    }

    /// Create a history with an explicit entry cap.
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            bpm: VecDeque::new(),
            resp_rate: VecDeque::new(),
            phases: VecDeque::new(),
            smoothed: VecDeque::new(),
            cap: cap.max(1),
            phase_counts: [0; 3],
            bpm_sum: 0,
            rate_sum: 0.0,
        }
    }

    /// Append one derived tuple, evicting the oldest entry at capacity.
    pub fn push(&mut self, bpm: u32, resp_rate: f64, phase: RespPhase, smoothed: f64) {
        if self.bpm.len() >= self.cap {
            if let Some(old) = self.bpm.pop_front() {
                self.bpm_sum -= u64::from(old);
            }
            if let Some(old) = self.resp_rate.pop_front() {
                self.rate_sum -= old;
            }
            if let Some(old) = self.phases.pop_front() {
                self.phase_counts[phase_index(old)] -= 1;
            }
            self.smoothed.pop_front();
        }

        self.bpm.push_back(bpm);
        self.resp_rate.push_back(resp_rate);
        self.phases.push_back(phase);
        self.smoothed.push_back(smoothed);

        self.bpm_sum += u64::from(bpm);
        self.rate_sum += resp_rate;
        self.phase_counts[phase_index(phase)] += 1;

        debug_assert!(
            self.bpm.len() == self.resp_rate.len()
                && self.bpm.len() == self.phases.len()
                && self.bpm.len() == self.smoothed.len(),
            "history sequences diverged in length"
        );
    }

    /// Number of entries in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bpm.len()
    }

    /// Whether the window holds no entries yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bpm.is_empty()
    }

    /// Entry cap of each sequence.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Reduce the current window; `None` while empty.
    #[must_use]
    pub fn summarize(&self) -> Option<HistorySummary> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;

        let bpm_avg = (self.bpm_sum as f64 / n).round() as u32;
        let resp_rate_avg = ((self.rate_sum / n) * 10.0).round() / 10.0;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.smoothed {
            min = min.min(v);
            max = max.max(v);
        }
        let resp_amplitude = (max - min).round() as i64;

        Some(HistorySummary {
            bpm_avg,
            resp_rate_avg,
            dominant_phase: self.dominant_phase(),
            resp_amplitude,
        })
    }

    /// Most frequent phase in the window.
    ///
    /// Counts come from the incrementally maintained tallies; only a tie
    /// falls back to walking the window from its oldest entry, where the
    /// first phase holding the maximum count wins.
    fn dominant_phase(&self) -> RespPhase {
        let max_count = self.phase_counts.iter().copied().fold(0, usize::max);

        let mut winner = RespPhase::Apnea;
        let mut found = false;
        let mut tie = false;
        for p in PHASES {
            if self.phase_counts[phase_index(p)] == max_count {
                if found {
                    tie = true;
                } else {
                    winner = p;
                    found = true;
                }
            }
        }
        if !tie {
            return winner;
        }
        // Tie: the first phase in window order holding the maximum wins.
        for &p in &self.phases {
            if self.phase_counts[phase_index(p)] == max_count {
                return p;
            }
        }
        winner
    }
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::new()
    }
}
