use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on every stored text field (title, description, genres)
pub const MAX_TEXT_LENGTH: usize = 225;

/// A movie as stored alongside a user's collections.
///
/// Movies are shared: the same uuid can belong to several collections, and the
/// record is created the first time any collection references it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    pub uuid: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Comma-separated genre tags, e.g. `"Action,Drama"`
    #[serde(default)]
    pub genres: String,
}

impl Movie {
    /// Applies the fields present in `update`
    pub fn apply(&mut self, update: &MovieUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(genres) = &update.genres {
            self.genres = genres.clone();
        }
    }
}

/// A named, user-owned grouping of movies
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Collection {
    pub uuid: Uuid,
    pub owner: String,
    pub title: String,
    pub description: String,
    pub movies: Vec<Movie>,
    pub created_at: DateTime<Utc>,
}

/// List view of a collection, without its movies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionSummary {
    pub uuid: Uuid,
    pub title: String,
    pub description: String,
}

impl From<&Collection> for CollectionSummary {
    fn from(collection: &Collection) -> Self {
        Self {
            uuid: collection.uuid,
            title: collection.title.clone(),
            description: collection.description.clone(),
        }
    }
}

/// Request body for creating a collection
#[derive(Debug, Clone, Deserialize)]
pub struct NewCollection {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub movies: Vec<Movie>,
}

/// Partial update of a stored movie, addressed by uuid
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MovieUpdate {
    pub uuid: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub genres: Option<String>,
}

/// Partial update of a collection and of the movies it references
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CollectionUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub movies: Option<Vec<MovieUpdate>>,
}
