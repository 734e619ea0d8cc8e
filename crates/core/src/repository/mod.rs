//! Access to the movie and clue corpus.

/// JSON-file backed repository.
pub mod corpus;

use thiserror::Error;

use crate::models::{Category, Clue, Movie, MovieChoice, MovieId};

pub use corpus::{Corpus, CorpusRepository};

/// Number of years offered at the start of each round.
pub const CANDIDATE_COUNT: usize = 3;

/// Errors raised at the repository boundary.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No movie carries the requested identifier.
    #[error("movie {0} not found")]
    MovieNotFound(MovieId),
    /// The corpus cannot offer enough distinct release years.
    #[error("need three movies with distinct release years, only {available} available")]
    NotEnoughMovies {
        /// Distinct years that could be offered.
        available: usize,
    },
    /// A stored record failed validation.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Source of movies, clues and categories consumed by the game host.
pub trait ClueRepository {
    /// Three movies with distinct release years, avoiding `exclude` where possible.
    fn sample_three_movie_candidates(
        &self,
        exclude: &[MovieId],
    ) -> Result<Vec<MovieChoice>, RepositoryError>;

    /// Full record of a movie.
    fn get_movie(&self, movie_id: MovieId) -> Result<Movie, RepositoryError>;

    /// Every clue stored for a movie.
    fn get_clues(&self, movie_id: MovieId) -> Result<Vec<Clue>, RepositoryError>;

    /// All clue categories.
    fn get_categories(&self) -> Result<Vec<Category>, RepositoryError>;
}
