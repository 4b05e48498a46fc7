use axum::{Json, extract::State, extract::rejection::JsonRejection};
use std::sync::Arc;

use super::body;
use crate::error::Result;
use crate::models::ResetRequest;
use crate::state::AppState;

pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ResetRequest>, JsonRejection>,
) -> Result<()> {
    let req = body(payload)?;
    state.engine.reset_buckets(&req.login, &req.ip).await
}
