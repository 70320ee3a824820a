//! Shared application state for the server.
//!
//! Cloned into every handler; the inner state is shared via `Arc`. The
//! acquisition thread publishes frames here, SSE clients subscribe, and
//! the REST surface reads the latest snapshot.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;

use biopulse_core::{LiveFrame, RespPhase, DEFAULT_SAMPLE_RATE_HZ};
use biopulse_pipeline::SessionLog;

/// Server configuration, assembled from the CLI.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Capacity of the live frame broadcast channel.
    pub broadcast_capacity: usize,
    /// Directory session CSV files are written into.
    pub output_dir: PathBuf,
    /// Webhook endpoint for finished sessions; `None` disables upload.
    pub webhook_url: Option<String>,
    /// Nominal acquisition rate in Hz.
    pub sample_rate_hz: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 1024,
            output_dir: PathBuf::from("."),
            webhook_url: None,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
        }
    }
}

/// Most recent instantaneous metrics, for the status endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LiveSnapshot {
    /// Sequence number of the latest published frame.
    pub seq: u64,
    /// Latest smoothed respiration value.
    pub respiration: i64,
    /// Latest BPM estimate.
    pub bpm: u32,
    /// Latest respiration rate estimate.
    pub resp_rate: f64,
    /// Latest respiration phase.
    pub phase: RespPhase,
}

impl Default for LiveSnapshot {
    fn default() -> Self {
        Self {
            seq: 0,
            respiration: 0,
            bpm: 0,
            resp_rate: 0.0,
            phase: RespPhase::Apnea,
        }
    }
}

struct AppStateInner {
    frames: broadcast::Sender<LiveFrame>,
    session: Arc<SessionLog>,
    latest: RwLock<LiveSnapshot>,
    samples_processed: AtomicU64,
    started: Instant,
    config: ServerConfig,
}

/// Cloneable handle to the shared server state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    /// Create state from a configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let (frames, _) = broadcast::channel(config.broadcast_capacity);
        Self {
            inner: Arc::new(AppStateInner {
                frames,
                session: Arc::new(SessionLog::new()),
                latest: RwLock::new(LiveSnapshot::default()),
                samples_processed: AtomicU64::new(0),
                started: Instant::now(),
                config,
            }),
        }
    }

    /// Subscribe to the live frame feed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LiveFrame> {
        self.inner.frames.subscribe()
    }

    /// Publish a frame to all subscribers and refresh the snapshot.
    ///
    /// Send errors (no subscribers) are ignored; a lagging subscriber
    /// drops frames on its own receiver.
    pub fn publish(&self, frame: LiveFrame) {
        *self.inner.latest.write() = LiveSnapshot {
            seq: frame.seq,
            respiration: frame.respiration,
            bpm: frame.bpm,
            resp_rate: frame.resp_rate,
            phase: frame.phase,
        };
        let _ = self.inner.frames.send(frame);
    }

    /// Count processed samples (called by the acquisition loop).
    pub fn add_samples(&self, n: u64) {
        self.inner.samples_processed.fetch_add(n, Ordering::Relaxed);
    }

    /// Total samples processed since startup.
    #[must_use]
    pub fn samples_processed(&self) -> u64 {
        self.inner.samples_processed.load(Ordering::Relaxed)
    }

    /// The shared session log.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionLog> {
        &self.inner.session
    }

    /// Latest snapshot of instantaneous metrics.
    #[must_use]
    pub fn latest(&self) -> LiveSnapshot {
        *self.inner.latest.read()
    }

    /// Seconds since the state was created.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.inner.started.elapsed().as_secs()
    }

    /// Number of live SSE subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.frames.receiver_count()
    }

    /// Server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }
}
