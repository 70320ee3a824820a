//! HTTP handlers: the live stream, recording controls, and status.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{self, Stream};
use tokio::sync::broadcast;

use biopulse_core::SessionReport;

use crate::export;
use crate::state::AppState;
use crate::upload::WebhookUploader;

/// `GET /stream` — the live frame feed as server-sent events.
///
/// One `data:` event per frame; when no frame arrives within the
/// keep-alive interval, a comment line goes out instead so the
/// connection never looks stalled to the client.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(frame) => {
                    let Ok(event) = Event::default().json_data(&frame) else {
                        continue;
                    };
                    return Some((Ok(event), rx));
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Slow client: frames are dropped on its receiver.
                    tracing::debug!(lagged = n, "SSE client lagged, frames dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_millis(500))
            .text("keep-alive"),
    )
}

/// `GET /start_record` — begin a new recording session.
pub async fn start_record(State(state): State<AppState>) -> &'static str {
    state.session().start();
    "OK"
}

/// `GET /stop_record/:participant` — end the session, export its rows
/// as CSV, and forward them to the webhook when one is configured.
///
/// Persistence failures are logged and never surfaced to the recording
/// state; the acquisition loop keeps running regardless.
pub async fn stop_record(
    State(state): State<AppState>,
    Path(participant): Path<String>,
) -> &'static str {
    let rows = state.session().stop();
    let report = SessionReport::new(
        participant,
        rows,
        chrono::Utc::now().timestamp(),
    );

    let stem = export::safe_file_stem(&report.participant);
    let path = state.config().output_dir.join(format!("{stem}.csv"));
    let csv_rows = report.rows.clone();
    let write = tokio::task::spawn_blocking(move || export::write_csv(&path, &csv_rows)).await;
    match write {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "session CSV export failed"),
        Err(e) => tracing::error!(error = %e, "session CSV export task panicked"),
    }

    if let Some(url) = state.config().webhook_url.clone() {
        WebhookUploader::new(url).upload_detached(report);
    }

    "OK"
}

/// `GET /api/status` — JSON snapshot of the running server.
pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let latest = state.latest();
    Json(serde_json::json!({
        "uptime_secs": state.uptime_secs(),
        "samples_processed": state.samples_processed(),
        "sample_rate_hz": state.config().sample_rate_hz,
        "subscribers": state.subscriber_count(),
        "recording": state.session().is_recording(),
        "session_rows": state.session().len(),
        "latest": latest,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ServerConfig;

    #[tokio::test]
    async fn start_and_status_reflect_recording_state() {
        let state = AppState::new(ServerConfig::default());
        assert!(!state.session().is_recording());

        let body = start_record(State(state.clone())).await;
        assert_eq!(body, "OK");
        assert!(state.session().is_recording());

        let Json(status) = status(State(state.clone())).await;
        assert_eq!(status["recording"], true);
        assert_eq!(status["session_rows"], 0);
    }

    #[tokio::test]
    async fn stop_record_writes_csv_and_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        state.session().start();

        let body = stop_record(State(state.clone()), Path("alice".to_string())).await;
        assert_eq!(body, "OK");
        assert!(!state.session().is_recording());
        assert!(dir.path().join("alice.csv").exists());
    }

    #[tokio::test]
    async fn stop_record_sanitizes_participant_path() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ServerConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        state.session().start();

        stop_record(State(state.clone()), Path("a/b".to_string())).await;
        assert!(dir.path().join("a_b.csv").exists());
    }
}
