use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use std::sync::Arc;
use std::time::Instant;

use super::body;
use crate::error::{Error, Result};
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::Attempt;
use crate::state::AppState;

// 200 with no body when admitted, 429 when refused
pub async fn try_auth_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Attempt>, JsonRejection>,
) -> Result<StatusCode> {
    REQUEST_TOTAL.inc();
    let attempt = body(payload)?;

    if attempt.login.is_empty() || attempt.ip.is_empty() {
        return Err(Error::BadRequest("login and ip are required".to_string()));
    }

    // observed on failures too
    let start_time = Instant::now();
    let outcome = state.engine.try_auth(&attempt).await;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    let decision = outcome?;

    if decision.is_allowed() {
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::TOO_MANY_REQUESTS)
    }
}
