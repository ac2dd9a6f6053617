use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::{RequestId, RequestNumber},
    models::FetchResult,
    routes::AppState,
};

/// Handler for the movie catalog proxy.
///
/// Upstream failures are still a 200 carrying
/// `{"message": ..., "status_code": ...}`; only misconfiguration is an error.
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    request_number: Option<Extension<RequestNumber>>,
) -> AppResult<Json<FetchResult>> {
    tracing::info!(
        request_id = %request_id,
        request_number = request_number.map(|Extension(n)| n.0),
        "Fetching movie catalog"
    );

    let result = state.fetcher.fetch(&state.movie_catalog).await?;

    tracing::info!(
        request_id = %request_id,
        success = result.is_success(),
        status_code = result.status_code(),
        "Movie catalog request completed"
    );

    Ok(Json(result))
}
