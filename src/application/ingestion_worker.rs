//! Background ingestion loop.
//!
//! Wakes on a fixed interval and runs one [`IngestionService::run_cycle`] per
//! tick. Cycles run inline in the loop, so a new fetch never starts while the
//! previous cycle is still persisting or invalidating; ticks missed during a
//! slow cycle are skipped rather than replayed.
//!
//! Failures are logged and never end the loop. The next tick is the only
//! retry. The loop exits when its [`CancellationToken`] is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::application::services::IngestionService;
use crate::domain::provider::RatesProvider;
use crate::domain::repositories::RateRepository;

/// Spawns [`run_ingestion_worker`] on the current runtime.
pub fn spawn_ingestion_worker<R, P>(
    service: Arc<IngestionService<R, P>>,
    wake_interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    R: RateRepository + 'static,
    P: RatesProvider + 'static,
{
    tokio::spawn(run_ingestion_worker(service, wake_interval, cancel))
}

/// Runs ingestion cycles every `wake_interval` until `cancel` fires.
///
/// The first cycle runs one full interval after start. Cancellation is
/// observed between cycles; an in-flight cycle completes first.
pub async fn run_ingestion_worker<R, P>(
    service: Arc<IngestionService<R, P>>,
    wake_interval: Duration,
    cancel: CancellationToken,
) where
    R: RateRepository,
    P: RatesProvider,
{
    let mut ticker = interval(wake_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;

    info!(
        "Ingestion worker started (wake interval: {}s)",
        wake_interval.as_secs()
    );

    loop {
        // Cancellation wins over a tick that came due during the last cycle.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match service.run_cycle().await {
            Ok(report) => info!(
                inserted = report.inserted,
                invalidated = report.invalidated,
                provider_updated_at = %report.provider_updated_at,
                "Ingestion cycle completed"
            ),
            Err(e) => error!(stage = %e.stage(), "Ingestion cycle failed: {}", e),
        }
    }

    info!("Ingestion worker stopped");
}
