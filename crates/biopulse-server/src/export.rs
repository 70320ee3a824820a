//! CSV export of finished recording sessions.
//!
//! Column names and value formats match the historical export files, so
//! downstream tooling keeps working against records from either system.

use std::path::Path;

use biopulse_core::{RecordRow, Result};

/// Header row of the session CSV.
pub const CSV_COLUMNS: [&str; 5] = [
    "Horodatage",
    "BPM_Moyen",
    "RR_Moyen",
    "Phase_Dominante",
    "Amplitude_Resp",
];

/// Write the session rows to `path` as CSV.
pub fn write_csv(path: &Path, rows: &[RecordRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.timestamp_str(),
            row.bpm_avg.to_string(),
            format!("{:.1}", row.resp_rate_avg),
            row.dominant_phase.to_string(),
            row.resp_amplitude.to_string(),
        ])?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = rows.len(), "session CSV written");
    Ok(())
}

/// Reduce a participant name to a safe file stem.
///
/// Keeps alphanumerics, `-` and `_`; everything else becomes `_`. An
/// empty result falls back to `session`.
#[must_use]
pub fn safe_file_stem(participant: &str) -> String {
    let stem: String = participant
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "session".to_string()
    } else {
        stem
    }
}
