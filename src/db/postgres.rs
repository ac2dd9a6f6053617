use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    db::CollectionStore,
    error::{AppError, AppResult},
    models::{Collection, CollectionUpdate, Movie, NewCollection},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// [`CollectionStore`] backed by the tables in `migrations/`
#[derive(Clone)]
pub struct PgCollectionStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct CollectionRow {
    uuid: Uuid,
    owner: String,
    title: String,
    description: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    collection_uuid: Uuid,
    uuid: Uuid,
    title: String,
    description: String,
    genres: String,
}

const MEMBERS_QUERY: &str = r#"
    SELECT cm.collection_uuid, m.uuid, m.title, m.description, m.genres
    FROM collection_movies cm
    JOIN movies m ON m.uuid = cm.movie_uuid
    WHERE cm.collection_uuid = ANY($1)
    ORDER BY cm.position
"#;

impl PgCollectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn with_movies(&self, rows: Vec<CollectionRow>) -> AppResult<Vec<Collection>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.uuid).collect();
        let members: Vec<MemberRow> = sqlx::query_as(MEMBERS_QUERY)
            .bind(&ids[..])
            .fetch_all(&self.pool)
            .await?;

        let mut movies_by_collection: HashMap<Uuid, Vec<Movie>> = HashMap::new();
        for member in members {
            movies_by_collection
                .entry(member.collection_uuid)
                .or_default()
                .push(Movie {
                    uuid: member.uuid,
                    title: member.title,
                    description: member.description,
                    genres: member.genres,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| Collection {
                movies: movies_by_collection.remove(&row.uuid).unwrap_or_default(),
                uuid: row.uuid,
                owner: row.owner,
                title: row.title,
                description: row.description,
                created_at: row.created_at,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl CollectionStore for PgCollectionStore {
    async fn list_collections(&self, owner: &str) -> AppResult<Vec<Collection>> {
        let rows: Vec<CollectionRow> = sqlx::query_as(
            r#"
            SELECT uuid, owner, title, description, created_at
            FROM collections
            WHERE owner = $1
            ORDER BY created_at, uuid
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        self.with_movies(rows).await
    }

    async fn create_collection(&self, owner: &str, new: NewCollection) -> AppResult<Collection> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO collections (uuid, owner, title, description)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&new.title)
        .bind(&new.description)
        .execute(&mut *tx)
        .await?;

        for (position, movie) in new.movies.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO movies (uuid, title, description, genres)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (uuid) DO NOTHING
                "#,
            )
            .bind(movie.uuid)
            .bind(&movie.title)
            .bind(&movie.description)
            .bind(&movie.genres)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO collection_movies (collection_uuid, movie_uuid, position)
                VALUES ($1, $2, $3)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(movie.uuid)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_collection(owner, id).await?.ok_or_else(|| {
            AppError::Internal(format!("Collection {} vanished after creation", id))
        })
    }

    async fn get_collection(&self, owner: &str, id: Uuid) -> AppResult<Option<Collection>> {
        let row: Option<CollectionRow> = sqlx::query_as(
            r#"
            SELECT uuid, owner, title, description, created_at
            FROM collections
            WHERE uuid = $1 AND owner = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_movies(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn update_collection(
        &self,
        owner: &str,
        id: Uuid,
        update: CollectionUpdate,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE collections
            SET title = COALESCE($3, title),
                description = COALESCE($4, description)
            WHERE uuid = $1 AND owner = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(update.title)
        .bind(update.description)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Collection {} not found", id)));
        }

        for movie in update.movies.unwrap_or_default() {
            let updated = sqlx::query(
                r#"
                UPDATE movies
                SET title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    genres = COALESCE($4, genres)
                WHERE uuid = $1
                "#,
            )
            .bind(movie.uuid)
            .bind(movie.title)
            .bind(movie.description)
            .bind(movie.genres)
            .execute(&mut *tx)
            .await?;

            // Dropping the transaction rolls back the earlier statements
            if updated.rows_affected() == 0 {
                return Err(AppError::NotFound(format!("Movie {} not found", movie.uuid)));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_collection(&self, owner: &str, id: Uuid) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM collections WHERE uuid = $1 AND owner = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Collection {} not found", id)));
        }
        Ok(())
    }
}

// Needs a running PostgreSQL; skipped unless DATABASE_URL is set.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieUpdate;

    async fn create_store() -> Option<PgCollectionStore> {
        let database_url = std::env::var("DATABASE_URL").ok()?;
        let store = PgCollectionStore::new(create_pool(&database_url).await.unwrap());
        store.migrate().await.unwrap();
        Some(store)
    }

    /// Each test writes under its own owner so runs never collide
    fn unique_owner() -> String {
        format!("owner-{}", Uuid::new_v4())
    }

    fn movie(title: &str, genres: &str) -> Movie {
        Movie {
            uuid: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            genres: genres.to_string(),
        }
    }

    fn new_collection(title: &str, movies: Vec<Movie>) -> NewCollection {
        NewCollection {
            title: title.to_string(),
            description: String::new(),
            movies,
        }
    }

    #[tokio::test]
    async fn test_existing_movie_is_reused_not_overwritten() {
        let Some(store) = create_store().await else {
            return;
        };
        let owner = unique_owner();
        let heat = movie("Heat", "Crime");

        store
            .create_collection(&owner, new_collection("First", vec![heat.clone()]))
            .await
            .unwrap();

        let mut renamed = heat.clone();
        renamed.title = "Heat (1995)".to_string();
        renamed.genres = "Drama".to_string();
        let second = store
            .create_collection(&owner, new_collection("Second", vec![renamed]))
            .await
            .unwrap();

        assert_eq!(second.movies, vec![heat]);
    }

    #[tokio::test]
    async fn test_movies_keep_insertion_order() {
        let Some(store) = create_store().await else {
            return;
        };
        let owner = unique_owner();
        let movies = vec![
            movie("Zodiac", "Crime"),
            movie("Alien", "Horror"),
            movie("Memento", "Mystery"),
        ];

        let created = store
            .create_collection(&owner, new_collection("Picks", movies.clone()))
            .await
            .unwrap();

        let fetched = store.get_collection(&owner, created.uuid).await.unwrap().unwrap();
        assert_eq!(fetched.movies, movies);
    }

    #[tokio::test]
    async fn test_update_with_unknown_movie_changes_nothing() {
        let Some(store) = create_store().await else {
            return;
        };
        let owner = unique_owner();
        let alien = movie("Alien", "Horror");
        let created = store
            .create_collection(&owner, new_collection("Horror", vec![alien.clone()]))
            .await
            .unwrap();

        let result = store
            .update_collection(
                &owner,
                created.uuid,
                CollectionUpdate {
                    title: Some("Renamed".to_string()),
                    movies: Some(vec![
                        MovieUpdate {
                            uuid: alien.uuid,
                            genres: Some("Horror,Sci-Fi".to_string()),
                            ..Default::default()
                        },
                        MovieUpdate {
                            uuid: Uuid::new_v4(),
                            title: Some("Ghost".to_string()),
                            ..Default::default()
                        },
                    ]),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let fetched = store.get_collection(&owner, created.uuid).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Horror");
        assert_eq!(fetched.movies, vec![alien]);
    }

    #[tokio::test]
    async fn test_collections_are_scoped_to_owner() {
        let Some(store) = create_store().await else {
            return;
        };
        let owner = unique_owner();
        let stranger = unique_owner();
        let created = store
            .create_collection(&owner, new_collection("Mine", Vec::new()))
            .await
            .unwrap();

        assert!(store.get_collection(&stranger, created.uuid).await.unwrap().is_none());
        assert!(store.list_collections(&stranger).await.unwrap().is_empty());

        let update = store
            .update_collection(
                &stranger,
                created.uuid,
                CollectionUpdate {
                    title: Some("Theirs".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(update, Err(AppError::NotFound(_))));

        let delete = store.delete_collection(&stranger, created.uuid).await;
        assert!(matches!(delete, Err(AppError::NotFound(_))));

        let listed = store.list_collections(&owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Mine");

        store.delete_collection(&owner, created.uuid).await.unwrap();
        assert!(store.list_collections(&owner).await.unwrap().is_empty());
    }
}
