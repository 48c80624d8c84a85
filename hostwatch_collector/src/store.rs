//! Append-only usage store: MariaDB/MySQL implementation plus an in-memory
//! variant for tests and demos.
//!
//! Each MySQL operation opens a fresh connection, does its work, and
//! releases the connection on every exit path. No pooling at this layer;
//! fine at low polling frequency.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, Row};
use std::sync::Mutex;
use tracing::debug;

use crate::config::DbConfig;
use crate::error::StoreError;
use crate::types::UsageSample;

/// Storage contract the collector writes through and the read API queries
/// through. Reads are pure; `insert` appends exactly one row or fails with
/// no row visible.
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn insert(
        &self,
        cpu: f64,
        mem: f64,
        disk: f64,
        ts: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Row with the maximum `ts` (tie-break: maximum `id`), or `None` when
    /// the table is empty.
    async fn latest(&self) -> Result<Option<UsageSample>, StoreError>;

    /// All rows with `ts >= since`, ascending by `ts`.
    async fn range_since(&self, since: DateTime<Utc>) -> Result<Vec<UsageSample>, StoreError>;
}

const CREATE_TABLE_SQL: &str = "\
CREATE TABLE IF NOT EXISTS usage_stats (
    id   BIGINT UNSIGNED NOT NULL AUTO_INCREMENT,
    cpu  DOUBLE NOT NULL,
    mem  DOUBLE NOT NULL,
    disk DOUBLE NOT NULL,
    ts   DATETIME(6) NOT NULL,
    PRIMARY KEY (id),
    KEY idx_usage_stats_ts (ts)
)";

/// MariaDB/MySQL-backed store over the `usage_stats` table.
pub struct MySqlStore {
    options: MySqlConnectOptions,
    host: String,
}

impl MySqlStore {
    pub fn from_config(cfg: &DbConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .database(&cfg.name)
            .username(&cfg.user)
            .password(&cfg.password);
        Self {
            options,
            host: format!("{}:{}", cfg.host, cfg.port),
        }
    }

    /// Bootstrap the table; safe to call on every collector start.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(CREATE_TABLE_SQL).execute(&mut conn).await;
        let _ = conn.close().await;
        result?;
        Ok(())
    }

    async fn connect(&self) -> Result<MySqlConnection, StoreError> {
        debug!("opening database connection to {}", self.host);
        Ok(MySqlConnection::connect_with(&self.options).await?)
    }
}

fn row_to_sample(row: &MySqlRow) -> Result<UsageSample, StoreError> {
    let ts: chrono::NaiveDateTime = row.try_get("ts")?;
    Ok(UsageSample {
        id: row.try_get::<u64, _>("id")?,
        cpu: row.try_get("cpu")?,
        mem: row.try_get("mem")?,
        disk: row.try_get("disk")?,
        // stored as naive UTC, surfaced as UTC
        ts: Utc.from_utc_datetime(&ts),
    })
}

#[async_trait]
impl UsageStore for MySqlStore {
    async fn insert(
        &self,
        cpu: f64,
        mem: f64,
        disk: f64,
        ts: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query("INSERT INTO usage_stats (cpu, mem, disk, ts) VALUES (?, ?, ?, ?)")
            .bind(cpu)
            .bind(mem)
            .bind(disk)
            .bind(ts.naive_utc())
            .execute(&mut conn)
            .await;
        let _ = conn.close().await;
        result?;
        Ok(())
    }

    async fn latest(&self) -> Result<Option<UsageSample>, StoreError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(
            "SELECT id, cpu, mem, disk, ts FROM usage_stats ORDER BY ts DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&mut conn)
        .await;
        let _ = conn.close().await;
        result?.map(|row| row_to_sample(&row)).transpose()
    }

    async fn range_since(&self, since: DateTime<Utc>) -> Result<Vec<UsageSample>, StoreError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(
            "SELECT id, cpu, mem, disk, ts FROM usage_stats WHERE ts >= ? ORDER BY ts ASC, id ASC",
        )
        .bind(since.naive_utc())
        .fetch_all(&mut conn)
        .await;
        let _ = conn.close().await;
        result?.iter().map(row_to_sample).collect()
    }
}

/// In-memory store with the same contract. Used by unit tests across the
/// workspace; also handy for demoing the read API without a database.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<UsageSample>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageStore for MemoryStore {
    async fn insert(
        &self,
        cpu: f64,
        mem: f64,
        disk: f64,
        ts: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        rows.push(UsageSample {
            id,
            cpu,
            mem,
            disk,
            ts,
        });
        Ok(())
    }

    async fn latest(&self) -> Result<Option<UsageSample>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().max_by_key(|r| (r.ts, r.id)).cloned())
    }

    async fn range_since(&self, since: DateTime<Utc>) -> Result<Vec<UsageSample>, StoreError> {
        let rows = self.rows.lock().unwrap();
        let mut out: Vec<UsageSample> = rows.iter().filter(|r| r.ts >= since).cloned().collect();
        out.sort_by_key(|r| (r.ts, r.id));
        Ok(out)
    }
}
