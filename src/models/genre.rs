use serde::{Deserialize, Serialize};

/// A genre name and how many times it occurred across a user's collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedGenre {
    pub name: String,
    pub count: usize,
}

impl RankedGenre {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}
