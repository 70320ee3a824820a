//! Sample sources: the acquisition boundary of the pipeline.
//!
//! The physical device loop lives outside this system; whatever drives
//! it only has to implement [`SampleSource`]. A deterministic
//! [`SyntheticSource`] stands in for hardware during development and in
//! tests.

use std::time::{Duration, Instant};

use biopulse_core::{Result, Sample, DEFAULT_SAMPLE_RATE_HZ};

/// A blocking pull source of acquisition ticks.
///
/// `Ok(None)` signals a clean end of stream (device disconnected or
/// shut down); the owning loop should stop rather than process stale
/// data.
pub trait SampleSource: Send {
    /// Produce the next sample, blocking until one is due.
    fn next_sample(&mut self) -> Result<Option<Sample>>;
}

/// Deterministic waveform generator shaped like the real dual channel.
///
/// PPG is a 1.2 Hz sine (72 BPM); respiration is a 0.25 Hz sine
/// (15 breaths/min) spanning all three phase bands. When paced, sample
/// delivery tracks wall-clock time at the nominal rate; unpaced mode
/// free-runs for tests.
pub struct SyntheticSource {
    sequence: u64,
    sample_rate_hz: f64,
    started: Option<Instant>,
    paced: bool,
}

/// PPG waveform centre (16-bit scale midpoint, as the reference device).
const PPG_CENTER: f64 = 2048.0;
const PPG_AMPLITUDE: f64 = 600.0;
const HEART_RATE_HZ: f64 = 1.2;

/// Respiration centre sits in the apnea band; the swing reaches both
/// the inspire and expire bands each cycle.
const RESP_CENTER: f64 = 487.5;
const RESP_AMPLITUDE: f64 = 150.0;
const BREATH_RATE_HZ: f64 = 0.25;

impl SyntheticSource {
    /// Real-time paced source at the given rate.
    #[must_use]
    pub fn new(sample_rate_hz: f64) -> Self {
        Self {
            sequence: 0,
            sample_rate_hz,
            started: None,
            paced: true,
        }
    }

    /// Free-running source for tests; never sleeps.
    #[must_use]
    pub fn unpaced(sample_rate_hz: f64) -> Self {
        Self {
            sequence: 0,
            sample_rate_hz,
            started: None,
            paced: false,
        }
    }

    fn waveforms(&self, t: f64) -> (i32, i32) {
        let ppg = PPG_CENTER + PPG_AMPLITUDE * (std::f64::consts::TAU * HEART_RATE_HZ * t).sin();
        let resp = RESP_CENTER + RESP_AMPLITUDE * (std::f64::consts::TAU * BREATH_RATE_HZ * t).sin();
        (resp as i32, ppg as i32)
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE_HZ)
    }
}

impl SampleSource for SyntheticSource {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        let started = *self.started.get_or_insert_with(Instant::now);

        if self.paced {
            let due = Duration::from_secs_f64(self.sequence as f64 / self.sample_rate_hz);
            let elapsed = started.elapsed();
            if due > elapsed {
                std::thread::sleep(due - elapsed);
            }
        }

        let t = self.sequence as f64 / self.sample_rate_hz;
        let (respiration_raw, ppg_raw) = self.waveforms(t);
        let sample = Sample::new(self.sequence, respiration_raw, ppg_raw);
        self.sequence += 1;
        Ok(Some(sample))
    }
}
