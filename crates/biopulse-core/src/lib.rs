//! # Biopulse Core
//!
//! Core types, constants, and errors for the biopulse physiological
//! monitoring system.
//!
//! This crate provides the foundational building blocks shared by the
//! signal pipeline and the serving layer:
//!
//! - **Domain Types**: [`Sample`], [`RespPhase`], [`LiveFrame`],
//!   [`RecordRow`], and [`SessionReport`] for representing raw acquisition
//!   ticks and the metrics derived from them.
//!
//! - **Error Types**: a unified [`BiopulseError`] taxonomy via the
//!   [`error`] module.
//!
//! - **Constants**: the tuning parameters of the reference pipeline
//!   (buffer capacities, thresholds, the refractory floor) so every crate
//!   agrees on them.

#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{BiopulseError, Result};
pub use types::{LiveFrame, RecordRow, RespPhase, Sample, SessionReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nominal acquisition rate of the dual-channel source, in Hz.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 1000.0;

/// Number of respiration samples in the moving-average smoothing window.
pub const SMOOTHING_WINDOW: usize = 150;

/// Smoothed respiration at or below this value classifies as Expire.
pub const RESP_THRESHOLD_LOW: f64 = 425.0;

/// Smoothed respiration above this value classifies as Inspire.
pub const RESP_THRESHOLD_HIGH: f64 = 550.0;

/// Maximum PPG samples retained for adaptive threshold computation.
pub const PPG_BUFFER_CAP: usize = 2000;

/// Minimum PPG samples buffered before beat detection arms.
pub const PPG_MIN_SAMPLES: usize = 500;

/// Minimum samples between beats; candidates inside this window are noise.
pub const BEAT_REFRACTORY_SAMPLES: u64 = 400;

/// Beat trigger level as a fraction of the buffer's min-max range.
pub const PEAK_THRESHOLD_RATIO: f64 = 0.75;

/// Re-arm level as a fraction of the buffer's min-max range.
pub const DIP_THRESHOLD_RATIO: f64 = 0.60;

/// Entries retained per history sequence (60 s at the nominal 1 kHz).
pub const HISTORY_CAP: usize = 60_000;

/// Wall-clock seconds between session record rows.
pub const RECORD_INTERVAL_SECS: f64 = 1.0;

/// Only every Nth sample is projected into a live frame.
pub const LIVE_FRAME_DECIMATION: u64 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn thresholds_are_ordered() {
        assert!(RESP_THRESHOLD_LOW < RESP_THRESHOLD_HIGH);
        assert!(DIP_THRESHOLD_RATIO < PEAK_THRESHOLD_RATIO);
    }
}
