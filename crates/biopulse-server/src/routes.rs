//! Router assembly for the biopulse HTTP surface.
//!
//! ## Endpoints
//!
//! - `GET /stream` — live frame feed (SSE, keep-alive on idle)
//! - `GET /start_record` — begin a recording session
//! - `GET /stop_record/:participant` — end the session and persist it
//! - `GET /api/status` — JSON server status

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the router with all endpoints bound to `state`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/stream", get(handlers::stream))
        .route("/start_record", get(handlers::start_record))
        .route("/stop_record/:participant", get(handlers::stop_record))
        .route("/api/status", get(handlers::status))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ServerConfig;

    #[test]
    fn router_builds() {
        let state = AppState::new(ServerConfig::default());
        let _router = create_router(state);
    }
}
