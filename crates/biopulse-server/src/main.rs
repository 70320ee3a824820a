//! Biopulse monitoring server.
//!
//! Runs the acquisition loop on a dedicated thread, streams live frames
//! over SSE, and persists recording sessions on request.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;

use biopulse_pipeline::{PipelineConfig, SampleSource, SyntheticSource};
use biopulse_server::{create_router, AcquisitionHandle, AppState, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "biopulse-server", about = "Dual-channel physiological monitoring server")]
struct Args {
    /// HTTP port for the stream and REST API
    #[arg(long, default_value = "8080")]
    http_port: u16,

    /// Nominal acquisition rate in Hz
    #[arg(long, default_value = "1000.0")]
    sample_rate: f64,

    /// Data source: synthetic (hardware sources attach externally)
    #[arg(long, default_value = "synthetic")]
    source: String,

    /// Directory for session CSV exports
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Webhook URL for finished sessions (upload disabled if unset)
    #[arg(long)]
    webhook_url: Option<String>,

    /// Live frame broadcast channel capacity
    #[arg(long, default_value = "1024")]
    broadcast_capacity: usize,
}

fn build_source(name: &str, sample_rate: f64) -> Box<dyn SampleSource> {
    match name {
        "synthetic" => Box::new(SyntheticSource::new(sample_rate)),
        other => {
            tracing::warn!(source = other, "unknown source, falling back to synthetic");
            Box::new(SyntheticSource::new(sample_rate))
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let args = Args::parse();

    let state = AppState::new(ServerConfig {
        broadcast_capacity: args.broadcast_capacity,
        output_dir: args.output_dir.clone(),
        webhook_url: args.webhook_url.clone(),
        sample_rate_hz: args.sample_rate,
    });

    let pipeline_config = PipelineConfig {
        sample_rate_hz: args.sample_rate,
        ..Default::default()
    };
    let source = build_source(&args.source, args.sample_rate);
    let acquisition = AcquisitionHandle::spawn(source, state.clone(), pipeline_config);

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.http_port));
    info!(%addr, "biopulse server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind HTTP port");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .expect("server error");

    acquisition.shutdown();
    info!("biopulse server stopped");
}
