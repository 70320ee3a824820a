//! Live frame emission: a decimated projection of instantaneous state.
//!
//! Every Nth processed sample is projected into a [`LiveFrame`] for the
//! streaming transport. The projection is pure and unbuffered; if a
//! consumer cannot keep up, dropping frames is the consumer's problem.

use biopulse_core::{LiveFrame, Sample, LIVE_FRAME_DECIMATION};

use crate::respiration::RespReading;

/// Count-gated live frame projector.
#[derive(Debug, Clone, Copy)]
pub struct LiveFrameEmitter {
    decimation: u64,
}

impl LiveFrameEmitter {
    /// Emit one frame per `decimation` samples.
    #[must_use]
    pub fn new(decimation: u64) -> Self {
        Self {
            decimation: decimation.max(1),
        }
    }

    /// Project the current instantaneous state when the sample's
    /// sequence number lands on the decimation grid.
    #[must_use]
    pub fn maybe_emit(&self, sample: &Sample, reading: &RespReading, bpm: u32) -> Option<LiveFrame> {
        if sample.sequence % self.decimation != 0 {
            return None;
        }
        Some(LiveFrame {
            seq: sample.sequence,
            respiration: reading.smoothed as i64,
            ppg: sample.ppg_raw,
            bpm,
            resp_rate: reading.rate,
            phase: reading.phase,
        })
    }
}

impl Default for LiveFrameEmitter {
    fn default() -> Self {
        Self::new(LIVE_FRAME_DECIMATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biopulse_core::RespPhase;

    fn reading() -> RespReading {
        RespReading {
            smoothed: 512.7,
            phase: RespPhase::Apnea,
            rate: 14.5,
        }
    }

    #[test]
    fn emits_exactly_on_decimation_grid() {
        let emitter = LiveFrameEmitter::default();
        let mut frames = 0;
        for seq in 0..1000u64 {
            let sample = Sample::new(seq, 500, 700);
            if emitter.maybe_emit(&sample, &reading(), 72).is_some() {
                frames += 1;
                assert_eq!(seq % 10, 0);
            }
        }
        assert_eq!(frames, 100);
    }

    #[test]
    fn frame_carries_truncated_smoothed_value() {
        let emitter = LiveFrameEmitter::default();
        let sample = Sample::new(20, 500, 701);
        let frame = emitter.maybe_emit(&sample, &reading(), 72).unwrap();
        assert_eq!(frame.respiration, 512);
        assert_eq!(frame.ppg, 701);
        assert_eq!(frame.bpm, 72);
        assert!((frame.resp_rate - 14.5).abs() < f64::EPSILON);
        assert_eq!(frame.phase, RespPhase::Apnea);
    }
}
