//! Webhook forwarding of finished sessions.
//!
//! Fire-and-forget: the upload runs on its own task, and any failure is
//! logged and swallowed at this boundary. Nothing here can reach back
//! into the recording state or the live stream.

use serde_json::json;

use biopulse_core::{BiopulseError, Result, SessionReport};

/// Posts finished session reports to a remote webhook.
pub struct WebhookUploader {
    url: String,
    client: reqwest::Client,
}

impl WebhookUploader {
    /// Create an uploader for the given endpoint.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Serialize `report` into the webhook payload shape.
    #[must_use]
    pub fn payload(report: &SessionReport) -> serde_json::Value {
        json!({
            "participantName": report.participant,
            "sessionId": report.session_id,
            "sessionStart": report
                .started
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            "sessionEnd": report
                .ended
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            "physiologicalData": report
                .rows
                .iter()
                .map(|row| {
                    json!({
                        "timestamp": row.timestamp_str(),
                        "bpm": row.bpm_avg,
                        "rr": row.resp_rate_avg,
                        "phase": row.dominant_phase,
                        "amplitude": row.resp_amplitude,
                    })
                })
                .collect::<Vec<_>>(),
        })
    }

    /// POST the report to the webhook.
    pub async fn upload(&self, report: &SessionReport) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&Self::payload(report))
            .send()
            .await
            .map_err(|e| BiopulseError::upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BiopulseError::upload(format!(
                "webhook returned {status}"
            )));
        }

        tracing::info!(
            session_id = %report.session_id,
            rows = report.rows.len(),
            "session uploaded"
        );
        Ok(())
    }

    /// Spawn the upload on its own task, logging any failure.
    pub fn upload_detached(self, report: SessionReport) {
        tokio::spawn(async move {
            if let Err(e) = self.upload(&report).await {
                tracing::warn!(
                    session_id = %report.session_id,
                    error = %e,
                    "session upload failed"
                );
            }
        });
    }
}
