//! # Biopulse Pipeline
//!
//! Real-time signal-to-metric pipeline for a dual-channel physiological
//! source (PPG + respiration effort).
//!
//! # Architecture
//!
//! Each incoming [`Sample`](biopulse_core::Sample) flows through two
//! independent estimators, whose outputs feed a rolling history that in
//! turn feeds the time-gated session recorder and the count-gated live
//! frame emitter:
//!
//! 1. **BPM estimation** ([`BpmEstimator`]): adaptive-threshold peak
//!    detection over a bounded PPG buffer with a hysteresis dip latch and
//!    a refractory floor.
//! 2. **Respiration classification** ([`RespirationClassifier`]):
//!    moving-average smoothing, three-band phase classification, and
//!    transition-gated respiration rate.
//! 3. **History aggregation** ([`MetricsHistory`]): four parallel bounded
//!    sequences capped at the 60 s retention window.
//! 4. **Session recording** ([`SessionRecorder`]): a 1 Hz reduction of the
//!    history window into [`RecordRow`](biopulse_core::RecordRow)s while a
//!    session is live.
//! 5. **Live frame emission** ([`emitter`]): a 1-in-10 decimated
//!    projection of instantaneous state for the streaming transport.
//!
//! [`SignalPipeline`] wires the stages together; all state is owned by a
//! single execution context and nothing in the per-sample path blocks.
//! The only cross-context surface is [`SessionLog`], which the serving
//! layer uses to start and stop recording.

pub mod bpm;
pub mod emitter;
pub mod history;
pub mod pipeline;
pub mod respiration;
pub mod session;
pub mod source;

pub use bpm::BpmEstimator;
pub use emitter::LiveFrameEmitter;
pub use history::{HistorySummary, MetricsHistory};
pub use pipeline::{PipelineConfig, PipelineOutput, SignalPipeline};
pub use respiration::{RespReading, RespirationClassifier};
pub use session::{SessionLog, SessionRecorder};
pub use source::{SampleSource, SyntheticSource};
