use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Collection, CollectionUpdate, NewCollection},
};

/// Persistence for user collections and the movies they reference.
///
/// Every operation is scoped to an owner: another user's collection behaves
/// exactly like a missing one.
#[async_trait::async_trait]
pub trait CollectionStore: Send + Sync {
    /// All of the owner's collections, oldest first, movies included
    async fn list_collections(&self, owner: &str) -> AppResult<Vec<Collection>>;

    /// Stores a collection. A movie whose uuid is already stored is reused
    /// as-is rather than overwritten.
    async fn create_collection(&self, owner: &str, new: NewCollection) -> AppResult<Collection>;

    async fn get_collection(&self, owner: &str, id: Uuid) -> AppResult<Option<Collection>>;

    /// Applies a partial update. Fails with `NotFound` without changing
    /// anything if the collection or any referenced movie does not exist.
    /// Collection membership is left untouched.
    async fn update_collection(
        &self,
        owner: &str,
        id: Uuid,
        update: CollectionUpdate,
    ) -> AppResult<()>;

    async fn delete_collection(&self, owner: &str, id: Uuid) -> AppResult<()>;
}
