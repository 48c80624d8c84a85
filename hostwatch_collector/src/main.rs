//! One-shot collector entry point: fetch usage over SSH, insert one row into
//! MariaDB. Meant to be invoked by cron (or any periodic trigger) once per
//! interval; exits 0 only on a fully successful cycle.

use anyhow::Context;

use hostwatch_collector::config::{DbConfig, LogConfig, RemoteConfig};
use hostwatch_collector::job::CollectorJob;
use hostwatch_collector::logging;
use hostwatch_collector::remote::SshMetricsClient;
use hostwatch_collector::store::MySqlStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(&LogConfig::from_env())?;

    let remote = RemoteConfig::from_env();
    let db = DbConfig::from_env();

    let store = MySqlStore::from_config(&db);
    store
        .ensure_schema()
        .await
        .context("create usage_stats table")?;

    let job = CollectorJob::new(SshMetricsClient::new(remote), store);
    job.run_once().await?;
    Ok(())
}
