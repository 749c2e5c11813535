use axum::{extract::State, Json};
use redb::ReadableTable;
use serde_json::{json, Value};

use crate::db::tables;
use crate::AppState;

/// Health check endpoint
///
/// Probes the store by opening the characters table and counting the roster,
/// so a missing or corrupted table surfaces here rather than on the first
/// real request. Used by load balancers and monitoring systems.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.clone();
    let probe = tokio::task::spawn_blocking(move || -> crate::error::Result<u64> {
        let read_txn = db.begin_read()?;
        let characters = read_txn.open_table(tables::CHARACTERS)?;
        Ok(characters.iter()?.count() as u64)
    })
    .await;

    match probe {
        Ok(Ok(roster_size)) => Json(json!({
            "status": "healthy",
            "database": "connected",
            "rosterSize": roster_size,
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Ok(Err(e)) => {
            tracing::error!("Database health check failed: {:?}", e);
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "version": env!("CARGO_PKG_VERSION"),
            }))
        }
        Err(e) => {
            tracing::error!("Health check task failed: {:?}", e);
            Json(json!({
                "status": "unhealthy",
                "database": "error",
                "version": env!("CARGO_PKG_VERSION"),
            }))
        }
    }
}
