//! Session recording: the shared start/stop surface and the 1 Hz reducer.
//!
//! [`SessionLog`] is the one structure shared between the per-sample loop
//! and the control plane. Start/stop flip an atomic flag and mutate the
//! row list under a mutex, so a control request racing the recorder's
//! append can never corrupt the list or lose a completed session.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use parking_lot::Mutex;

use biopulse_core::{RecordRow, RECORD_INTERVAL_SECS};

use crate::history::MetricsHistory;

/// Shared recording state, safe to drive from any execution context.
#[derive(Default)]
pub struct SessionLog {
    recording: AtomicBool,
    rows: Mutex<Vec<RecordRow>>,
}

impl SessionLog {
    /// Create an idle log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new session: clears any previous rows and raises the flag.
    pub fn start(&self) {
        self.rows.lock().clear();
        self.recording.store(true, Ordering::SeqCst);
        tracing::info!("recording started");
    }

    /// End the session and take its rows.
    pub fn stop(&self) -> Vec<RecordRow> {
        self.recording.store(false, Ordering::SeqCst);
        let rows = std::mem::take(&mut *self.rows.lock());
        tracing::info!(rows = rows.len(), "recording stopped");
        rows
    }

    /// Whether a session is currently live.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Number of rows recorded so far in the live session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    /// Whether the live session has recorded nothing yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append(&self, row: RecordRow) {
        self.rows.lock().push(row);
    }
}

/// Time-gated reducer producing one [`RecordRow`] per interval elapsed.
pub struct SessionRecorder {
    interval_secs: f64,
    last_record: f64,
}

impl SessionRecorder {
    /// Create a recorder with the default 1 s interval.
    #[must_use]
    pub fn new() -> Self {
        Self::with_interval(RECORD_INTERVAL_SECS)
    }

    /// Create a recorder with an explicit interval in seconds.
    #[must_use]
    pub fn with_interval(interval_secs: f64) -> Self {
        Self {
            interval_secs,
            last_record: 0.0,
        }
    }

    /// Materialize a row if the session is live, the interval has
    /// elapsed, and the window holds data. Returns the appended row.
    pub fn maybe_record(
        &mut self,
        log: &SessionLog,
        history: &MetricsHistory,
        now_secs: f64,
    ) -> Option<RecordRow> {
        if !log.is_recording() {
            return None;
        }
        if now_secs - self.last_record < self.interval_secs {
            return None;
        }
        // Empty window: skip the tick rather than divide by zero.
        let summary = history.summarize()?;

        let row = RecordRow {
            timestamp: Utc::now(),
            bpm_avg: summary.bpm_avg,
            resp_rate_avg: summary.resp_rate_avg,
            dominant_phase: summary.dominant_phase,
            resp_amplitude: summary.resp_amplitude,
        };
        log.append(row.clone());
        self.last_record = now_secs;
        tracing::trace!(bpm = row.bpm_avg, phase = %row.dominant_phase, "session row recorded");
        Some(row)
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biopulse_core::RespPhase;

    fn filled_history() -> MetricsHistory {
        let mut history = MetricsHistory::with_capacity(100);
        history.push(72, 15.0, RespPhase::Apnea, 500.0);
        history.push(74, 15.0, RespPhase::Inspire, 560.0);
        history
    }

    #[test]
    fn no_rows_while_idle() {
        let log = SessionLog::new();
        let history = filled_history();
        let mut recorder = SessionRecorder::new();
        for i in 0..100 {
            assert!(recorder
                .maybe_record(&log, &history, i as f64 * 0.5)
                .is_none());
        }
        assert!(log.is_empty());
    }

    #[test]
    fn one_row_per_interval() {
        let log = SessionLog::new();
        log.start();
        let history = filled_history();
        let mut recorder = SessionRecorder::new();

        // Simulated clock stepping 0.25 s per sample for 10 s.
        let mut rows = 0;
        for i in 1..=40 {
            if recorder
                .maybe_record(&log, &history, i as f64 * 0.25)
                .is_some()
            {
                rows += 1;
            }
        }
        assert_eq!(rows, 10);
        assert_eq!(log.len(), 10);
    }

    #[test]
    fn empty_window_skips_recording() {
        let log = SessionLog::new();
        log.start();
        let history = MetricsHistory::new();
        let mut recorder = SessionRecorder::new();
        assert!(recorder.maybe_record(&log, &history, 100.0).is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn start_clears_previous_session() {
        let log = SessionLog::new();
        log.start();
        let history = filled_history();
        let mut recorder = SessionRecorder::new();
        recorder.maybe_record(&log, &history, 10.0);
        assert_eq!(log.len(), 1);

        log.start();
        assert!(log.is_empty());
        assert!(log.is_recording());
    }

    #[test]
    fn stop_takes_rows_and_lowers_flag() {
        let log = SessionLog::new();
        log.start();
        let history = filled_history();
        let mut recorder = SessionRecorder::new();
        recorder.maybe_record(&log, &history, 10.0);

        let rows = log.stop();
        assert_eq!(rows.len(), 1);
        assert!(!log.is_recording());
        assert!(log.is_empty());
        assert_eq!(rows[0].bpm_avg, 73);
    }

    #[test]
    fn row_reduction_matches_window() {
        let log = SessionLog::new();
        log.start();
        let history = filled_history();
        let mut recorder = SessionRecorder::new();
        let row = recorder.maybe_record(&log, &history, 5.0).unwrap();
        assert_eq!(row.bpm_avg, 73);
        assert!((row.resp_rate_avg - 15.0).abs() < f64::EPSILON);
        assert_eq!(row.dominant_phase, RespPhase::Apnea);
        assert_eq!(row.resp_amplitude, 60);
    }
}
