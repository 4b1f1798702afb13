use api_types::health::Health;
use axum::{Json, extract::State, http::StatusCode};

use crate::server::ServerState;

/// Liveness plus a database round-trip. Answers 503 when the database is down.
pub async fn get(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    match state.engine.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Health {
                status: "ok".to_string(),
                database: true,
            }),
        ),
        Err(err) => {
            tracing::warn!("health check failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "degraded".to_string(),
                    database: false,
                }),
            )
        }
    }
}
