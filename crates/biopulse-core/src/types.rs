//! Domain types for the biopulse pipeline and its collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One acquisition tick from the dual-channel source.
///
/// Produced once per tick at the nominal rate; immutable; not retained
/// beyond the pipeline's internal buffer windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Monotonically increasing sequence number (increments by 1 per tick).
    pub sequence: u64,
    /// Raw respiration-effort channel value.
    pub respiration_raw: i32,
    /// Raw photoplethysmography channel value.
    pub ppg_raw: i32,
}

impl Sample {
    /// Create a sample from a `(sequence, respiration, ppg)` triple.
    #[must_use]
    pub fn new(sequence: u64, respiration_raw: i32, ppg_raw: i32) -> Self {
        Self {
            sequence,
            respiration_raw,
            ppg_raw,
        }
    }
}

/// Respiration phase derived from the smoothed effort signal.
///
/// Serialized with the historical wire spellings (`"apnee"`, `"inspire"`,
/// `"expire"`) so live frames and exported records stay byte-compatible
/// with files produced by the reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RespPhase {
    /// Breath-holding / plateau between breaths.
    #[serde(rename = "apnee")]
    Apnea,
    /// Inhalation.
    #[serde(rename = "inspire")]
    Inspire,
    /// Exhalation.
    #[serde(rename = "expire")]
    Expire,
}

impl RespPhase {
    /// The wire spelling used in streams and exports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apnea => "apnee",
            Self::Inspire => "inspire",
            Self::Expire => "expire",
        }
    }
}

impl std::fmt::Display for RespPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instantaneous state projected to the streaming transport.
///
/// Ephemeral: handed to the emitter's consumer and never retained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveFrame {
    /// Sequence number of the sample this frame was projected from.
    pub seq: u64,
    /// Smoothed respiration value, truncated to integer.
    pub respiration: i64,
    /// Raw PPG value at this tick.
    pub ppg: i32,
    /// Current heart rate estimate in beats per minute.
    pub bpm: u32,
    /// Current respiration rate estimate in breaths per minute.
    pub resp_rate: f64,
    /// Current respiration phase.
    pub phase: RespPhase,
}

/// One summarized session row, reduced from the rolling history window.
///
/// Immutable once created; appended to the session log while recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    /// Moment the row was materialized.
    pub timestamp: DateTime<Utc>,
    /// Mean BPM over the window, rounded to the nearest integer.
    pub bpm_avg: u32,
    /// Mean respiration rate over the window, rounded to one decimal.
    pub resp_rate_avg: f64,
    /// Most frequent phase in the window (first-encountered wins ties).
    pub dominant_phase: RespPhase,
    /// Peak-to-peak smoothed respiration over the window, rounded.
    pub resp_amplitude: i64,
}

impl RecordRow {
    /// Timestamp rendered in the export format (`%Y-%m-%d %H:%M:%S`).
    #[must_use]
    pub fn timestamp_str(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// A finished recording session, handed to the persistence collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Participant name (doubles as the export file stem).
    pub participant: String,
    /// Session identifier, `SESS_<unix seconds>`.
    pub session_id: String,
    /// Timestamp of the first recorded row, if any.
    pub started: Option<DateTime<Utc>>,
    /// Timestamp of the last recorded row, if any.
    pub ended: Option<DateTime<Utc>>,
    /// All rows recorded during the session, in order.
    pub rows: Vec<RecordRow>,
}

impl SessionReport {
    /// Assemble a report from the rows taken at session stop.
    #[must_use]
    pub fn new(participant: impl Into<String>, rows: Vec<RecordRow>, now_unix: i64) -> Self {
        Self {
            participant: participant.into(),
            session_id: format!("SESS_{now_unix}"),
            started: rows.first().map(|r| r.timestamp),
            ended: rows.last().map(|r| r.timestamp),
            rows,
        }
    }

    /// Whether the session captured any rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn phase_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&RespPhase::Apnea).unwrap(),
            "\"apnee\""
        );
        assert_eq!(
            serde_json::to_string(&RespPhase::Inspire).unwrap(),
            "\"inspire\""
        );
        assert_eq!(
            serde_json::to_string(&RespPhase::Expire).unwrap(),
            "\"expire\""
        );
    }

    #[test]
    fn phase_roundtrip() {
        let parsed: RespPhase = serde_json::from_str("\"apnee\"").unwrap();
        assert_eq!(parsed, RespPhase::Apnea);
    }

    #[test]
    fn live_frame_json_keys() {
        let frame = LiveFrame {
            seq: 40,
            respiration: 512,
            ppg: 700,
            bpm: 72,
            resp_rate: 14.5,
            phase: RespPhase::Apnea,
        };
        let json = serde_json::to_value(&frame).unwrap();
        for key in ["seq", "respiration", "ppg", "bpm", "resp_rate", "phase"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["phase"], "apnee");
    }

    #[test]
    fn record_row_timestamp_format() {
        let row = RecordRow {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 59).unwrap(),
            bpm_avg: 70,
            resp_rate_avg: 12.3,
            dominant_phase: RespPhase::Expire,
            resp_amplitude: 85,
        };
        assert_eq!(row.timestamp_str(), "2024-03-05 14:30:59");
    }

    #[test]
    fn session_report_bounds() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 3, 5, 14, 31, 0).unwrap();
        let row = |ts| RecordRow {
            timestamp: ts,
            bpm_avg: 60,
            resp_rate_avg: 10.0,
            dominant_phase: RespPhase::Apnea,
            resp_amplitude: 10,
        };
        let report = SessionReport::new("alice", vec![row(t0), row(t1)], 1_700_000_000);
        assert_eq!(report.session_id, "SESS_1700000000");
        assert_eq!(report.started, Some(t0));
        assert_eq!(report.ended, Some(t1));

        let empty = SessionReport::new("bob", vec![], 0);
        assert!(empty.is_empty());
        assert!(empty.started.is_none());
    }
}
