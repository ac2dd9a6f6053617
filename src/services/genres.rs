use std::collections::HashMap;

use crate::models::{Collection, Movie, RankedGenre};

/// Separator between genre tags in a movie's genre string
pub const GENRE_DELIMITER: char = ',';

/// Something carrying a delimited genre tag string
pub trait GenreTagged {
    fn genre_tags(&self) -> &str;
}

/// Something grouping movies, such as a user's collection
pub trait MovieGrouping {
    type Movie: GenreTagged;

    fn movies(&self) -> &[Self::Movie];
}

impl GenreTagged for Movie {
    fn genre_tags(&self) -> &str {
        &self.genres
    }
}

impl MovieGrouping for Collection {
    type Movie = Movie;

    fn movies(&self) -> &[Movie] {
        &self.movies
    }
}

/// Splits a genre string into trimmed, non-empty tags
pub fn split_genres(tags: &str) -> impl Iterator<Item = &str> {
    tags.split(GENRE_DELIMITER)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
}

/// Returns the `n` most frequent genres across every movie of every grouping.
///
/// Genres are compared case-sensitively. Equal counts keep the order in which
/// the genre was first seen. A movie appearing in two groupings counts twice.
pub fn top_genres<'a, G>(groupings: impl IntoIterator<Item = &'a G>, n: usize) -> Vec<RankedGenre>
where
    G: MovieGrouping + 'a,
{
    let mut ranked: Vec<RankedGenre> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    let tags = groupings
        .into_iter()
        .flat_map(|grouping| grouping.movies())
        .flat_map(|movie| split_genres(movie.genre_tags()));

    for tag in tags {
        let position = *positions.entry(tag).or_insert_with(|| {
            ranked.push(RankedGenre::new(tag, 0));
            ranked.len() - 1
        });
        ranked[position].count += 1;
    }

    // Stable, so ties stay in first-seen order
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}
