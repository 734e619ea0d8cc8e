//! Shared domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base URL of the public IMDb site.
pub const IMDB_ROOT: &str = "https://www.imdb.com";

/// Internal identifier of a movie.
pub type MovieId = Uuid;
/// Internal identifier of a clue.
pub type ClueId = Uuid;
/// Identifier of a player.
pub type PlayerId = Uuid;
/// Identifier of a clue category.
pub type CategoryId = u32;

/// A movie that can be played in a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Internal identifier.
    pub movie_id: MovieId,
    /// IMDb title id (e.g. `tt0111161`).
    pub imdb_id: String,
    /// Display title.
    pub title: String,
    /// Title folded with [`crate::text::strip_text`], used to compare guesses.
    pub stripped_title: String,
    /// Year of release.
    pub release_year: i32,
}

impl Movie {
    /// Returns the imdb.com URL for the movie.
    pub fn imdb_link(&self) -> String {
        format!("{IMDB_ROOT}/title/{}", self.imdb_id)
    }
}

/// A user-submitted parental advisory used as a guessing hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    /// Identifier of the clue.
    pub clue_id: ClueId,
    /// Movie the clue describes.
    pub movie_id: MovieId,
    /// Category the clue belongs to.
    pub category_id: CategoryId,
    /// Advisory text shown to the player.
    pub clue_text: String,
    /// Whether the advisory was flagged as a spoiler on IMDb.
    #[serde(default)]
    pub spoiler: bool,
}

/// Classification of clue content (violence, profanity, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier of the category.
    pub category_id: CategoryId,
    /// Name announced to the player.
    pub display_name: String,
    /// Short key used in corpus files (`violence`, `profanity`, ...).
    pub short_name: String,
}

/// A year offered to the player at the start of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieChoice {
    /// Movie behind the year.
    pub movie_id: MovieId,
    /// Year shown to the player.
    pub release_year: i32,
}

/// A human player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Identifier of the player.
    pub player_id: PlayerId,
    /// Name the player goes by.
    pub username: String,
    /// When the player was created.
    #[serde(default = "Utc::now")]
    pub date_created: DateTime<Utc>,
}

impl Player {
    /// Create a player with a fresh identifier.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            player_id: Uuid::new_v4(),
            username: username.into(),
            date_created: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imdb_link_uses_title_path() {
        let movie = Movie {
            movie_id: Uuid::new_v4(),
            imdb_id: "tt0111161".to_string(),
            title: "The Shawshank Redemption".to_string(),
            stripped_title: "theshawshankredemption".to_string(),
            release_year: 1994,
        };
        assert_eq!(movie.imdb_link(), "https://www.imdb.com/title/tt0111161");
    }
}
