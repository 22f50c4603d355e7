//! DedupSweeper - 期限切れ DeliveredItem の掃除
//!
//! 参照側は期限切れを「無いもの」として扱うので、ここは容量の回収だけを担う。
//! `shutdown_tx` に true を送るとループを抜ける。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ports::{Clock, DedupStore};

pub struct DedupSweeper {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl DedupSweeper {
    /// Spawn the sweep loop. The first sweep runs after one `interval`.
    pub fn spawn(dedup: Arc<dyn DedupStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "dedup sweeper started");
            sweep_loop(dedup.as_ref(), clock.as_ref(), interval, &mut shutdown_rx).await;
            info!("dedup sweeper stopped");
        });

        Self { shutdown_tx, join }
    }

    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

/// Remove expired records once. Returns how many were purged.
pub async fn sweep_once(dedup: &dyn DedupStore, clock: &dyn Clock) -> usize {
    match dedup.purge_expired(clock.now()).await {
        Ok(0) => {
            debug!("no expired delivered items");
            0
        }
        Ok(purged) => {
            info!(purged, "purged expired delivered items");
            purged
        }
        Err(e) => {
            warn!(error = %e, "dedup sweep failed");
            0
        }
    }
}

async fn sweep_loop(
    dedup: &dyn DedupStore,
    clock: &dyn Clock,
    interval: Duration,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                // sender が消えたら止める
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        sweep_once(dedup, clock).await;
    }
}
