use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::aggregate::Refresher;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Runs a fetch cycle immediately and then every `interval`. A failed cycle
/// is logged and the schedule carries on.
pub fn spawn(refresher: Arc<Refresher>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = refresher.refresh().await {
                tracing::error!(error = %format!("{err:#}"), "scheduled refresh failed");
            }
        }
    })
}
