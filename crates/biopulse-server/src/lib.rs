//! # Biopulse Server
//!
//! Serving layer for the biopulse monitor:
//!
//! - Runs the acquisition loop on a dedicated thread, feeding every
//!   sample through the [`biopulse_pipeline`] stages.
//! - Streams live frames to clients over SSE (`GET /stream`), with
//!   keep-alive comments when no frame is available.
//! - Exposes the recording controls (`/start_record`,
//!   `/stop_record/:participant`) and a JSON status endpoint.
//! - Persists finished sessions as CSV and forwards them to an optional
//!   webhook, both off the per-sample hot path.

pub mod acquisition;
pub mod export;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod upload;

pub use acquisition::AcquisitionHandle;
pub use routes::create_router;
pub use state::{AppState, LiveSnapshot, ServerConfig};
pub use upload::WebhookUploader;
