use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::CollectionStore,
    error::{AppError, AppResult},
    models::{Collection, CollectionUpdate, Movie, NewCollection},
};

/// Process-local [`CollectionStore`], used when no database is configured
#[derive(Default)]
pub struct InMemoryCollectionStore {
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    collections: HashMap<Uuid, StoredCollection>,
    movies: HashMap<Uuid, Movie>,
    next_sequence: u64,
}

struct StoredCollection {
    sequence: u64,
    owner: String,
    title: String,
    description: String,
    movie_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl StoreInner {
    fn owned(&self, owner: &str, id: Uuid) -> Option<&StoredCollection> {
        self.collections.get(&id).filter(|c| c.owner == owner)
    }

    fn materialize(&self, id: Uuid, stored: &StoredCollection) -> Collection {
        Collection {
            uuid: id,
            owner: stored.owner.clone(),
            title: stored.title.clone(),
            description: stored.description.clone(),
            movies: stored
                .movie_ids
                .iter()
                .filter_map(|movie_id| self.movies.get(movie_id).cloned())
                .collect(),
            created_at: stored.created_at,
        }
    }
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Collection {} not found", id))
}

#[async_trait::async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn list_collections(&self, owner: &str) -> AppResult<Vec<Collection>> {
        let inner = self.inner.read().await;

        let mut owned: Vec<(&Uuid, &StoredCollection)> = inner
            .collections
            .iter()
            .filter(|(_, stored)| stored.owner == owner)
            .collect();
        owned.sort_by_key(|(_, stored)| stored.sequence);

        Ok(owned
            .into_iter()
            .map(|(id, stored)| inner.materialize(*id, stored))
            .collect())
    }

    async fn create_collection(&self, owner: &str, new: NewCollection) -> AppResult<Collection> {
        let mut inner = self.inner.write().await;

        let mut movie_ids = Vec::with_capacity(new.movies.len());
        for movie in new.movies {
            let movie_id = movie.uuid;
            inner.movies.entry(movie_id).or_insert(movie);
            if !movie_ids.contains(&movie_id) {
                movie_ids.push(movie_id);
            }
        }

        let id = Uuid::new_v4();
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;

        let stored = StoredCollection {
            sequence,
            owner: owner.to_string(),
            title: new.title,
            description: new.description,
            movie_ids,
            created_at: Utc::now(),
        };
        let collection = inner.materialize(id, &stored);
        inner.collections.insert(id, stored);

        Ok(collection)
    }

    async fn get_collection(&self, owner: &str, id: Uuid) -> AppResult<Option<Collection>> {
        let inner = self.inner.read().await;
        Ok(inner
            .owned(owner, id)
            .map(|stored| inner.materialize(id, stored)))
    }

    async fn update_collection(
        &self,
        owner: &str,
        id: Uuid,
        update: CollectionUpdate,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        if inner.owned(owner, id).is_none() {
            return Err(not_found(id));
        }

        let movie_updates = update.movies.unwrap_or_default();
        if let Some(missing) = movie_updates
            .iter()
            .find(|m| !inner.movies.contains_key(&m.uuid))
        {
            return Err(AppError::NotFound(format!("Movie {} not found", missing.uuid)));
        }

        for movie_update in &movie_updates {
            if let Some(movie) = inner.movies.get_mut(&movie_update.uuid) {
                movie.apply(movie_update);
            }
        }

        let stored = inner.collections.get_mut(&id).ok_or_else(|| not_found(id))?;
        if let Some(title) = update.title {
            stored.title = title;
        }
        if let Some(description) = update.description {
            stored.description = description;
        }

        Ok(())
    }

    async fn delete_collection(&self, owner: &str, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        if inner.owned(owner, id).is_none() {
            return Err(not_found(id));
        }
        inner.collections.remove(&id);
        Ok(())
    }
}
