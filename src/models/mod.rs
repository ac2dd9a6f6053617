mod collection;
mod fetch_result;
mod genre;

pub use collection::{
    Collection, CollectionSummary, CollectionUpdate, Movie, MovieUpdate, NewCollection,
    MAX_TEXT_LENGTH,
};
pub use fetch_result::{FetchResult, FAILED_TO_LOAD_MOVIES, UNREADABLE_RESPONSE};
pub use genre::RankedGenre;
