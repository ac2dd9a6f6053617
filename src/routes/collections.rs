use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::{CurrentUser, RequestId, RequestNumber},
    models::{CollectionSummary, CollectionUpdate, Movie, NewCollection},
    routes::AppState,
    services::collections,
};

#[derive(Debug, Serialize)]
pub struct CollectionListResponse {
    pub is_success: bool,
    pub data: CollectionListData,
    pub favourite_genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CollectionListData {
    pub collection: Vec<CollectionSummary>,
}

#[derive(Debug, Serialize)]
pub struct CollectionDetailResponse {
    pub title: String,
    pub description: String,
    pub movies: Vec<Movie>,
}

/// Lists the caller's collections with their favourite genres
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    request_number: Option<Extension<RequestNumber>>,
    user: CurrentUser,
) -> AppResult<Json<CollectionListResponse>> {
    let overview = collections::collection_overview(
        state.store.clone(),
        user.as_str(),
        state.favourite_genre_count,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        request_number = request_number.map(|Extension(n)| n.0),
        user = %user.as_str(),
        collections = overview.collections.len(),
        favourite_genres = ?overview.favourite_genres,
        "Listed collections"
    );

    Ok(Json(CollectionListResponse {
        is_success: true,
        data: CollectionListData {
            collection: overview.collections,
        },
        favourite_genres: overview.favourite_genres,
    }))
}

pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<NewCollection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let collection =
        collections::create_collection(state.store.clone(), user.as_str(), request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "collection_uuid": collection.uuid })),
    ))
}

pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CollectionDetailResponse>> {
    let collection = collections::get_collection(state.store.clone(), user.as_str(), id).await?;

    Ok(Json(CollectionDetailResponse {
        title: collection.title,
        description: collection.description,
        movies: collection.movies,
    }))
}

/// Serves both PUT and PATCH; every field is optional
pub async fn update_collection(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CollectionUpdate>,
) -> AppResult<Json<Value>> {
    collections::update_collection(state.store.clone(), user.as_str(), id, request).await?;
    Ok(Json(json!({ "details": "updated" })))
}

pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    collections::delete_collection(state.store.clone(), user.as_str(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
