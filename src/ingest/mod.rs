use crate::error::AppError;
use crate::reading::Reading;
use crate::state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod file;
pub mod mock;

/// Producer of reading batches, polled by the ingest loop.
pub trait ReadingSource {
    /// `Ok(None)` means nothing new arrived since the last poll.
    fn fetch_batch(&mut self) -> Result<Option<Vec<Reading>>, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Applied { readings: usize },
    NoNewBatch,
}

/// Polls the source once and applies any batch to shared state.
///
/// Source failures are logged and treated as "no new batch", so the last
/// derived view stays in place.
pub fn run_ingest_cycle<S>(
    source: &mut S,
    state: &Arc<RwLock<AppState>>,
) -> Result<IngestOutcome, AppError>
where
    S: ReadingSource + ?Sized,
{
    let batch = match source.fetch_batch() {
        Ok(Some(batch)) => batch,
        Ok(None) => {
            debug!("No new reading batch this cycle");
            return Ok(IngestOutcome::NoNewBatch);
        }
        Err(err) => {
            warn!(error = %err, "Reading source failed, keeping last view");
            return Ok(IngestOutcome::NoNewBatch);
        }
    };

    let readings = batch.len();
    let mut guard = state.write().map_err(|_| AppError::StateLock)?;
    guard.apply_batch(batch);
    Ok(IngestOutcome::Applied { readings })
}

pub fn spawn_ingest_thread<S>(
    mut source: S,
    state: Arc<RwLock<AppState>>,
    interval: Duration,
    stop: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()>
where
    S: ReadingSource + Send + 'static,
{
    std::thread::spawn(move || {
        info!(interval_ms = interval.as_millis(), "Ingest thread started");
        while !stop.load(Ordering::Relaxed) {
            let cycle_start = Instant::now();

            if let Err(err) = run_ingest_cycle(&mut source, &state) {
                warn!(error = %err, "Ingest cycle failed");
            }

            sleep_with_stop(interval, &stop, cycle_start);
        }
        info!("Ingest thread stopped");
    })
}

fn sleep_with_stop(duration: Duration, stop: &AtomicBool, start: Instant) {
    let elapsed = start.elapsed();
    if elapsed >= duration {
        return;
    }
    let remaining = duration - elapsed;
    let step = Duration::from_millis(100).min(remaining);
    let mut slept = Duration::ZERO;

    while slept < remaining {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        std::thread::sleep(step);
        slept += step;
    }
}
