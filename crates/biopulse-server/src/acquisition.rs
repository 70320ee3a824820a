//! The acquisition loop: a dedicated thread owning the pipeline.
//!
//! One OS thread pulls samples from the source and drives the pipeline;
//! it is the single writer for every pipeline buffer. Emitted frames go
//! out through the state's broadcast channel, which never blocks the
//! loop. Session rows land in the shared [`SessionLog`] inside the
//! pipeline's recorder.
//!
//! [`SessionLog`]: biopulse_pipeline::SessionLog

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use biopulse_pipeline::{PipelineConfig, SampleSource, SignalPipeline};

use crate::state::AppState;

/// Handle to a running acquisition thread.
pub struct AcquisitionHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl AcquisitionHandle {
    /// Spawn the acquisition loop over `source`.
    #[must_use]
    pub fn spawn(
        mut source: Box<dyn SampleSource>,
        state: AppState,
        config: PipelineConfig,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let thread = std::thread::Builder::new()
            .name("biopulse-acquisition".into())
            .spawn(move || {
                let started = Instant::now();
                let mut pipeline =
                    SignalPipeline::new(&config, state.session().clone(), 0.0);

                tracing::info!(
                    sample_rate_hz = config.sample_rate_hz,
                    "acquisition loop started"
                );

                while !stop_flag.load(Ordering::Relaxed) {
                    match source.next_sample() {
                        Ok(Some(sample)) => {
                            let now = started.elapsed().as_secs_f64();
                            let out = pipeline.process(sample, now);
                            state.add_samples(1);
                            if let Some(frame) = out.frame {
                                state.publish(frame);
                            }
                        }
                        Ok(None) => {
                            tracing::info!("sample source ended, stopping acquisition");
                            break;
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "sample source failed, stopping acquisition");
                            break;
                        }
                    }
                }

                tracing::info!(
                    samples = state.samples_processed(),
                    "acquisition loop exited"
                );
            })
            .expect("failed to spawn acquisition thread");

        Self {
            stop,
            thread: Some(thread),
        }
    }

    /// Signal the loop to stop and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for AcquisitionHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
