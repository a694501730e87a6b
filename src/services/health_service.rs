use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness, degrading when the game store does not answer.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.game_store().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "game store health check failed");
            HealthResponse::degraded()
        }
    }
}
