//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! The sweep bounds worst-case staleness for keys that are never read
//! again; the lazy expiry check inside `get`/`has` keeps hot paths correct
//! between sweeps. Both paths are intentional.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task loops forever, sleeping for `interval` between runs and taking
/// the write lock only for the duration of each sweep. The returned handle
/// is owned by the engine, which aborts it on `stop()` — one timer per
/// engine instance, never a process-wide singleton.
pub fn spawn_sweep_task<V>(
    store: Arc<RwLock<CacheStore<V>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {:?}",
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut store_guard = store.write().await;
                store_guard.cleanup_expired()
            };

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
