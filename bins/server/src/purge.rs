//! Recurring sweep of expired exports.

use std::sync::Arc;
use std::time::Duration;

use till_api::state::Exports;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs `PurgeExpired` every `every` until `shutdown` fires.
///
/// The first sweep runs immediately. A failed sweep is retried on the next tick.
pub async fn run(exports: Arc<Exports>, every: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                match exports.purge_expired().await {
                    Ok(0) => tracing::debug!("no expired exports"),
                    Ok(purged) => info!(purged, "expired exports purged"),
                    Err(e) => warn!(error = %e, "export purge failed"),
                }
            }
        }
    }

    info!("Export sweep stopped");
}
