//! Sample types shared by the collector and the read API.
//! Keep this module minimal and stable; it defines the stored shape.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One parsed remote snapshot, before it is stamped and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteUsage {
    pub cpu: f64,
    pub mem: f64,
    pub disk: f64,
}

/// One persisted observation row. Immutable once stored; `id` is assigned by
/// the database and agrees with `ts` ordering because the collector runs
/// serially.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSample {
    pub id: u64,
    pub cpu: f64,
    pub mem: f64,
    pub disk: f64,
    // DB column is `ts`; JSON key stays `timestamp`
    #[serde(rename = "timestamp")]
    pub ts: DateTime<Utc>,
}
