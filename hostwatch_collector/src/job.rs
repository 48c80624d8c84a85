//! One collection cycle: fetch over the remote session, stamp, insert.
//!
//! Exactly one row on full success, zero rows on any failure. No retry or
//! backoff here; the scheduler's next interval is the retry.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::error::CollectError;
use crate::remote::MetricsSource;
use crate::store::UsageStore;

pub struct CollectorJob<S, T> {
    source: Arc<S>,
    store: T,
}

impl<S, T> CollectorJob<S, T>
where
    S: MetricsSource + Send + Sync + 'static,
    T: UsageStore,
{
    pub fn new(source: S, store: T) -> Self {
        Self {
            source: Arc::new(source),
            store,
        }
    }

    /// Run one fetch -> stamp -> insert cycle. The blocking fetch runs on
    /// the runtime's blocking pool; the timestamp is taken after a
    /// successful fetch and before the store write.
    pub async fn run_once(&self) -> Result<(), CollectError> {
        info!("collector cycle starting");

        let source = Arc::clone(&self.source);
        let usage = tokio::task::spawn_blocking(move || source.fetch())
            .await
            .map_err(CollectError::FetchTask)?
            .map_err(|e| {
                error!("remote fetch failed: {e}");
                CollectError::Fetch(e)
            })?;

        info!(
            cpu = usage.cpu,
            mem = usage.mem,
            disk = usage.disk,
            "remote usage fetched"
        );

        let ts = Utc::now();
        match self.store.insert(usage.cpu, usage.mem, usage.disk, ts).await {
            Ok(()) => {
                info!("inserted usage row at {}", ts.to_rfc3339());
                Ok(())
            }
            Err(e) => {
                error!("error inserting usage row: {e}");
                Err(CollectError::Store(e))
            }
        }
    }
}
