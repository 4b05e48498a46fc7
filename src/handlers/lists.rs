use axum::{Json, extract::State, extract::rejection::JsonRejection};
use std::sync::Arc;

use super::body;
use crate::error::Result;
use crate::models::NetworkRequest;
use crate::state::AppState;

type Payload = std::result::Result<Json<NetworkRequest>, JsonRejection>;

pub async fn add_to_blacklist_handler(State(state): State<Arc<AppState>>, payload: Payload) -> Result<()> {
    let req = body(payload)?;
    state.engine.add_to_blacklist(&req.network).await
}

pub async fn remove_from_blacklist_handler(
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> Result<()> {
    let req = body(payload)?;
    state.engine.remove_from_blacklist(&req.network).await
}

pub async fn add_to_whitelist_handler(State(state): State<Arc<AppState>>, payload: Payload) -> Result<()> {
    let req = body(payload)?;
    state.engine.add_to_whitelist(&req.network).await
}

pub async fn remove_from_whitelist_handler(
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> Result<()> {
    let req = body(payload)?;
    state.engine.remove_from_whitelist(&req.network).await
}
