use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::CollectionStore,
    error::{AppError, AppResult},
    models::{
        Collection, CollectionSummary, CollectionUpdate, Movie, MovieUpdate, NewCollection,
        MAX_TEXT_LENGTH,
    },
    services::genres::top_genres,
};

/// A user's collections together with their favourite genres
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionOverview {
    pub collections: Vec<CollectionSummary>,
    pub favourite_genres: Vec<String>,
}

/// Lists the owner's collections and ranks the genres across all of them
pub async fn collection_overview(
    store: Arc<dyn CollectionStore>,
    owner: &str,
    favourite_genre_count: usize,
) -> AppResult<CollectionOverview> {
    let collections = store.list_collections(owner).await?;
    let favourite_genres = top_genres(&collections, favourite_genre_count)
        .into_iter()
        .map(|genre| genre.name)
        .collect();

    Ok(CollectionOverview {
        collections: collections.iter().map(CollectionSummary::from).collect(),
        favourite_genres,
    })
}

pub async fn create_collection(
    store: Arc<dyn CollectionStore>,
    owner: &str,
    new: NewCollection,
) -> AppResult<Collection> {
    validate_title("title", &new.title)?;
    validate_length("description", &new.description)?;
    for movie in &new.movies {
        validate_movie(movie)?;
    }

    let collection = store.create_collection(owner, new).await?;

    tracing::info!(
        owner = %owner,
        collection_id = %collection.uuid,
        movies = collection.movies.len(),
        "Collection created"
    );

    Ok(collection)
}

pub async fn get_collection(
    store: Arc<dyn CollectionStore>,
    owner: &str,
    id: Uuid,
) -> AppResult<Collection> {
    store
        .get_collection(owner, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", id)))
}

pub async fn update_collection(
    store: Arc<dyn CollectionStore>,
    owner: &str,
    id: Uuid,
    update: CollectionUpdate,
) -> AppResult<()> {
    if let Some(title) = &update.title {
        validate_title("title", title)?;
    }
    if let Some(description) = &update.description {
        validate_length("description", description)?;
    }
    for movie in update.movies.iter().flatten() {
        validate_movie_update(movie)?;
    }

    store.update_collection(owner, id, update).await?;
    tracing::info!(owner = %owner, collection_id = %id, "Collection updated");
    Ok(())
}

pub async fn delete_collection(
    store: Arc<dyn CollectionStore>,
    owner: &str,
    id: Uuid,
) -> AppResult<()> {
    store.delete_collection(owner, id).await?;
    tracing::info!(owner = %owner, collection_id = %id, "Collection deleted");
    Ok(())
}

fn validate_movie(movie: &Movie) -> AppResult<()> {
    validate_title("movie title", &movie.title)?;
    validate_length("movie description", &movie.description)?;
    validate_length("movie genres", &movie.genres)
}

fn validate_movie_update(movie: &MovieUpdate) -> AppResult<()> {
    if let Some(title) = &movie.title {
        validate_title("movie title", title)?;
    }
    if let Some(description) = &movie.description {
        validate_length("movie description", description)?;
    }
    if let Some(genres) = &movie.genres {
        validate_length("movie genres", genres)?;
    }
    Ok(())
}

fn validate_title(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} cannot be empty", field)));
    }
    validate_length(field, value)
}

fn validate_length(field: &str, value: &str) -> AppResult<()> {
    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_LENGTH
        )));
    }
    Ok(())
}
