//! The per-sample driver wiring the pipeline stages together.

use std::sync::Arc;

use biopulse_core::{
    LiveFrame, RecordRow, Sample, BEAT_REFRACTORY_SAMPLES, DEFAULT_SAMPLE_RATE_HZ, HISTORY_CAP,
    LIVE_FRAME_DECIMATION, PPG_BUFFER_CAP, PPG_MIN_SAMPLES, RECORD_INTERVAL_SECS, SMOOTHING_WINDOW,
};

use crate::bpm::BpmEstimator;
use crate::emitter::LiveFrameEmitter;
use crate::history::MetricsHistory;
use crate::respiration::RespirationClassifier;
use crate::session::{SessionLog, SessionRecorder};

/// Tuning parameters for a pipeline instance.
///
/// `Default` reproduces the reference system: 1 kHz source, 150-sample
/// smoothing, 2000/500-sample PPG buffer, 400-sample refractory floor,
/// 60 s history, 1 s record interval, 1-in-10 live frames.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Nominal acquisition rate in Hz.
    pub sample_rate_hz: f64,
    /// Respiration smoothing window length.
    pub smoothing_window: usize,
    /// PPG buffer capacity.
    pub ppg_buffer_cap: usize,
    /// PPG samples required before beat detection arms.
    pub ppg_min_samples: usize,
    /// Minimum inter-beat sample count.
    pub refractory_samples: u64,
    /// History retention, in entries.
    pub history_cap: usize,
    /// Seconds between session rows.
    pub record_interval_secs: f64,
    /// Live frame decimation factor.
    pub frame_decimation: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            smoothing_window: SMOOTHING_WINDOW,
            ppg_buffer_cap: PPG_BUFFER_CAP,
            ppg_min_samples: PPG_MIN_SAMPLES,
            refractory_samples: BEAT_REFRACTORY_SAMPLES,
            history_cap: HISTORY_CAP,
            record_interval_secs: RECORD_INTERVAL_SECS,
            frame_decimation: LIVE_FRAME_DECIMATION,
        }
    }
}

/// What one processed sample produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Live frame, present on decimation-grid samples.
    pub frame: Option<LiveFrame>,
    /// Session row, present when the record interval elapsed while live.
    pub row: Option<RecordRow>,
}

/// Owns all pipeline stages; driven by a single execution context.
pub struct SignalPipeline {
    bpm: BpmEstimator,
    respiration: RespirationClassifier,
    history: MetricsHistory,
    recorder: SessionRecorder,
    emitter: LiveFrameEmitter,
    log: Arc<SessionLog>,
}

impl SignalPipeline {
    /// Build a pipeline around a shared session log.
    ///
    /// `now_secs` is the clock reading at construction; the same clock
    /// must be passed to every subsequent [`process`](Self::process).
    #[must_use]
    pub fn new(config: &PipelineConfig, log: Arc<SessionLog>, now_secs: f64) -> Self {
        Self {
            bpm: BpmEstimator::with_capacity(
                config.sample_rate_hz,
                config.ppg_buffer_cap,
                config.ppg_min_samples,
                config.refractory_samples,
            ),
            respiration: RespirationClassifier::with_window(config.smoothing_window, now_secs),
            history: MetricsHistory::with_capacity(config.history_cap),
            recorder: SessionRecorder::with_interval(config.record_interval_secs),
            emitter: LiveFrameEmitter::new(config.frame_decimation),
            log,
        }
    }

    /// Run one sample through every stage.
    pub fn process(&mut self, sample: Sample, now_secs: f64) -> PipelineOutput {
        let bpm = self.bpm.process(sample.ppg_raw);
        let reading = self.respiration.process(sample.respiration_raw, now_secs);

        self.history
            .push(bpm, reading.rate, reading.phase, reading.smoothed);

        let row = self
            .recorder
            .maybe_record(&self.log, &self.history, now_secs);
        let frame = self.emitter.maybe_emit(&sample, &reading, bpm);

        PipelineOutput { frame, row }
    }

    /// The shared session log this pipeline records into.
    #[must_use]
    pub fn session_log(&self) -> &Arc<SessionLog> {
        &self.log
    }

    /// Current history window length (test and status introspection).
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_follow_decimation_over_a_run() {
        let log = Arc::new(SessionLog::new());
        let mut pipeline = SignalPipeline::new(&PipelineConfig::default(), log, 0.0);

        let mut frames = 0;
        for seq in 0..1000u64 {
            let sample = Sample::new(seq, 500, 600);
            let out = pipeline.process(sample, seq as f64 / 1000.0);
            if out.frame.is_some() {
                frames += 1;
            }
        }
        assert_eq!(frames, 100);
        assert_eq!(pipeline.history_len(), 1000);
    }

    #[test]
    fn rows_only_while_recording() {
        let log = Arc::new(SessionLog::new());
        let mut pipeline = SignalPipeline::new(&PipelineConfig::default(), log.clone(), 0.0);

        for seq in 0..3000u64 {
            let out = pipeline.process(Sample::new(seq, 500, 600), seq as f64 / 1000.0);
            assert!(out.row.is_none());
        }

        log.start();
        let mut rows = 0;
        for seq in 3000..8000u64 {
            let out = pipeline.process(Sample::new(seq, 500, 600), seq as f64 / 1000.0);
            if out.row.is_some() {
                rows += 1;
            }
        }
        // Clock advanced 3.0 -> 8.0 s with last_record initially 0.0:
        // rows at 3.0 (immediately), 4.0, ..., 7.999 -> 5 rows.
        assert_eq!(rows, 5);
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn history_respects_cap() {
        let log = Arc::new(SessionLog::new());
        let config = PipelineConfig {
            history_cap: 500,
            ..Default::default()
        };
        let mut pipeline = SignalPipeline::new(&config, log, 0.0);
        for seq in 0..2000u64 {
            pipeline.process(Sample::new(seq, 500, 600), seq as f64 / 1000.0);
        }
        assert_eq!(pipeline.history_len(), 500);
    }
}
