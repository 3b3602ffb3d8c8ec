//! Background job: poll the notification feed.
//!
//! Ticks every `every` (20 s by default). The first tick fires immediately and
//! performs the initial load. Ticks that land while a refresh is still in
//! flight are skipped by the synchronizer. The job ends once the view is
//! unmounted or a transport failure has redirected the user away.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::api::FeedApi;
use crate::errors::Recovery;
use crate::feed::{FeedSynchronizer, RefreshOutcome};
use crate::notification::RenderTarget;

/// Spawn the polling task. Call this once per mounted view.
pub fn spawn<A, R>(sync: Arc<FeedSynchronizer<A, R>>, every: Duration) -> JoinHandle<()>
where
    A: FeedApi + 'static,
    R: RenderTarget + 'static,
{
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if !sync.is_mounted() {
                tracing::debug!("feed unmounted, stopping poller");
                break;
            }
            match sync.refresh().await {
                Ok(RefreshOutcome::Discarded) => break,
                Ok(outcome) => tracing::trace!(?outcome, "poll tick"),
                Err(e) => {
                    tracing::error!("notification poll failed: {}", e);
                    if matches!(e.recovery(), Recovery::Redirect(_)) {
                        break;
                    }
                }
            }
        }
    })
}
