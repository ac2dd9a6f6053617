use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{error::AppResult, routes::AppState};

pub async fn get_request_count(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let requests = state.request_counter.current().await?;
    Ok(Json(json!({ "requests": requests })))
}

pub async fn reset_request_count(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.request_counter.reset().await?;
    tracing::info!("Request count reset");
    Ok(Json(json!({ "message": "request count reset successfully" })))
}
