//! JSON endpoints over the usage store. Read-only; on an empty store the
//! current-value endpoints answer 404 "no data yet" and the range endpoints
//! answer an empty array.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tracing::error;

use hostwatch_collector::error::StoreError;
use hostwatch_collector::store::UsageStore;
use hostwatch_collector::types::UsageSample;

use crate::dashboard;

pub fn router<S: UsageStore + 'static>(store: Arc<S>) -> Router {
    Router::new()
        .route("/", get(dashboard::page::<S>))
        .route("/health", get(health))
        .route("/latest", get(latest::<S>))
        .route("/last24hours", get(last_24_hours::<S>))
        .route("/cpu/current", get(cpu_current::<S>))
        .route("/cpu/last24hours", get(cpu_last_24_hours::<S>))
        .route("/mem/current", get(mem_current::<S>))
        .route("/mem/last24hours", get(mem_last_24_hours::<S>))
        .route("/disk/current", get(disk_current::<S>))
        .route("/disk/last24hours", get(disk_last_24_hours::<S>))
        .with_state(store)
}

#[derive(Debug)]
pub enum ApiError {
    NoData,
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NoData => (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "no data yet"})),
            )
                .into_response(),
            ApiError::Store(e) => {
                error!("store query failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"message": "store unavailable"})),
                )
                    .into_response()
            }
        }
    }
}

pub fn last_24h_window() -> DateTime<Utc> {
    Utc::now() - Duration::hours(24)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn latest<S: UsageStore + 'static>(
    State(store): State<Arc<S>>,
) -> Result<Json<UsageSample>, ApiError> {
    let row = store.latest().await?.ok_or(ApiError::NoData)?;
    Ok(Json(row))
}

async fn last_24_hours<S: UsageStore + 'static>(
    State(store): State<Arc<S>>,
) -> Result<Json<Vec<UsageSample>>, ApiError> {
    Ok(Json(store.range_since(last_24h_window()).await?))
}

async fn cpu_current<S: UsageStore + 'static>(
    State(store): State<Arc<S>>,
) -> Result<Json<Value>, ApiError> {
    let row = store.latest().await?.ok_or(ApiError::NoData)?;
    Ok(Json(json!({"cpu": row.cpu, "timestamp": row.ts})))
}

async fn cpu_last_24_hours<S: UsageStore + 'static>(
    State(store): State<Arc<S>>,
) -> Result<Json<Value>, ApiError> {
    let rows = store.range_since(last_24h_window()).await?;
    Ok(Json(Value::Array(
        rows.iter()
            .map(|r| json!({"cpu": r.cpu, "timestamp": r.ts}))
            .collect(),
    )))
}

async fn mem_current<S: UsageStore + 'static>(
    State(store): State<Arc<S>>,
) -> Result<Json<Value>, ApiError> {
    let row = store.latest().await?.ok_or(ApiError::NoData)?;
    Ok(Json(json!({"mem": row.mem, "timestamp": row.ts})))
}

async fn mem_last_24_hours<S: UsageStore + 'static>(
    State(store): State<Arc<S>>,
) -> Result<Json<Value>, ApiError> {
    let rows = store.range_since(last_24h_window()).await?;
    Ok(Json(Value::Array(
        rows.iter()
            .map(|r| json!({"mem": r.mem, "timestamp": r.ts}))
            .collect(),
    )))
}

async fn disk_current<S: UsageStore + 'static>(
    State(store): State<Arc<S>>,
) -> Result<Json<Value>, ApiError> {
    let row = store.latest().await?.ok_or(ApiError::NoData)?;
    Ok(Json(json!({"disk": row.disk, "timestamp": row.ts})))
}

async fn disk_last_24_hours<S: UsageStore + 'static>(
    State(store): State<Arc<S>>,
) -> Result<Json<Value>, ApiError> {
    let rows = store.range_since(last_24h_window()).await?;
    Ok(Json(Value::Array(
        rows.iter()
            .map(|r| json!({"disk": r.disk, "timestamp": r.ts}))
            .collect(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_collector::store::MemoryStore;

    fn empty_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        assert_eq!(health().await.0, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn latest_on_empty_store_is_404_not_an_error_row() {
        let err = latest(State(empty_store())).await.unwrap_err();
        assert!(matches!(err, ApiError::NoData));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn range_on_empty_store_is_an_empty_array() {
        let rows = last_24_hours(State(empty_store())).await.unwrap().0;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn latest_returns_the_inserted_row() {
        let store = empty_store();
        let t = Utc::now();
        store.insert(10.0, 20.0, 30.0, t).await.unwrap();

        let row = latest(State(store.clone())).await.unwrap().0;
        assert_eq!(row.cpu, 10.0);
        assert_eq!(row.mem, 20.0);
        assert_eq!(row.disk, 30.0);
        assert_eq!(row.ts, t);

        // reads are pure: asking again returns the same row
        let again = latest(State(store)).await.unwrap().0;
        assert_eq!(row, again);
    }

    #[tokio::test]
    async fn last_24_hours_excludes_old_rows_and_sorts_ascending() {
        let store = empty_store();
        let t = Utc::now();
        store.insert(2.0, 2.0, 2.0, t - Duration::hours(30)).await.unwrap();
        store.insert(1.0, 1.0, 1.0, t - Duration::hours(1)).await.unwrap();
        store.insert(3.0, 3.0, 3.0, t).await.unwrap();

        let rows = last_24_hours(State(store)).await.unwrap().0;
        let cpus: Vec<f64> = rows.iter().map(|r| r.cpu).collect();
        assert_eq!(cpus, vec![1.0, 3.0]);
    }

    #[tokio::test]
    async fn metric_endpoints_project_one_field() {
        let store = empty_store();
        let t = Utc::now();
        store.insert(12.5, 45.0, 30.0, t).await.unwrap();

        let cpu = cpu_current(State(store.clone())).await.unwrap().0;
        assert_eq!(cpu["cpu"], json!(12.5));
        assert!(cpu.get("mem").is_none());

        let mem = mem_current(State(store.clone())).await.unwrap().0;
        assert_eq!(mem["mem"], json!(45.0));

        let disk = disk_last_24_hours(State(store)).await.unwrap().0;
        assert_eq!(disk.as_array().unwrap().len(), 1);
        assert_eq!(disk[0]["disk"], json!(30.0));
    }

    #[tokio::test]
    async fn metric_current_on_empty_store_is_404() {
        for err in [
            cpu_current(State(empty_store())).await.unwrap_err(),
            mem_current(State(empty_store())).await.unwrap_err(),
            disk_current(State(empty_store())).await.unwrap_err(),
        ] {
            assert!(matches!(err, ApiError::NoData));
        }
    }
}
