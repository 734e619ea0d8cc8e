#![allow(missing_docs)]

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
    sync::Arc,
};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ClueRepository, RepositoryError, CANDIDATE_COUNT};
use crate::{
    models::{Category, CategoryId, Clue, Movie, MovieChoice, MovieId},
    text::{clean_whitespace, strip_text},
};

/// On-disk layout of a corpus file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub movies: Vec<RawMovie>,
}

/// Movie entry as stored in the corpus, with its clues inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMovie {
    #[serde(default)]
    pub movie_id: Option<MovieId>,
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub stripped_title: Option<String>,
    pub release_year: i32,
    #[serde(default)]
    pub clues: Vec<RawClue>,
}

/// Clue entry as stored in the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawClue {
    #[serde(default)]
    pub clue_id: Option<Uuid>,
    pub category: CategoryRef,
    pub clue_text: String,
    #[serde(default)]
    pub spoiler: bool,
}

/// A clue's category, either by numeric id or by short name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(CategoryId),
    ShortName(String),
}

/// Thread-safe repository serving a validated in-memory corpus.
#[derive(Clone)]
pub struct CorpusRepository {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    movies: Vec<Movie>,
    clues: HashMap<MovieId, Vec<Clue>>,
    categories: Vec<Category>,
    rng: StdRng,
}

impl CorpusRepository {
    /// Read and validate a corpus file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read corpus {}", path.display()))?;
        let corpus: Corpus = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse corpus {}", path.display()))?;
        let repository = Self::from_corpus(corpus)
            .with_context(|| format!("invalid corpus {}", path.display()))?;
        info!(
            path = %path.display(),
            movies = repository.movie_count(),
            "Corpus loaded"
        );
        Ok(repository)
    }

    /// Validate raw records into typed movies and clues.
    pub fn from_corpus(corpus: Corpus) -> Result<Self, RepositoryError> {
        let mut category_ids = HashSet::new();
        let mut short_names = HashMap::new();
        for category in &corpus.categories {
            if !category_ids.insert(category.category_id) {
                return Err(RepositoryError::InvalidRecord(format!(
                    "duplicate category id {}",
                    category.category_id
                )));
            }
            if short_names
                .insert(category.short_name.clone(), category.category_id)
                .is_some()
            {
                return Err(RepositoryError::InvalidRecord(format!(
                    "duplicate category short name '{}'",
                    category.short_name
                )));
            }
        }

        let mut movies = Vec::with_capacity(corpus.movies.len());
        let mut clues = HashMap::with_capacity(corpus.movies.len());
        let mut imdb_ids = HashSet::new();
        let mut movie_ids = HashSet::new();

        for raw in corpus.movies {
            let title = clean_whitespace(&raw.title);
            if title.is_empty() {
                return Err(RepositoryError::InvalidRecord(format!(
                    "movie {} has an empty title",
                    raw.imdb_id
                )));
            }
            if raw.imdb_id.trim().is_empty() {
                return Err(RepositoryError::InvalidRecord(format!(
                    "movie '{title}' has no imdb id"
                )));
            }
            if !imdb_ids.insert(raw.imdb_id.clone()) {
                return Err(RepositoryError::InvalidRecord(format!(
                    "duplicate imdb id {}",
                    raw.imdb_id
                )));
            }

            let movie_id = raw.movie_id.unwrap_or_else(Uuid::new_v4);
            if !movie_ids.insert(movie_id) {
                return Err(RepositoryError::InvalidRecord(format!(
                    "duplicate movie id {movie_id}"
                )));
            }

            // stored keys are folded the same way guesses are
            let stripped_title = raw
                .stripped_title
                .map(|value| strip_text(&value))
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| strip_text(&title));

            let mut movie_clues = Vec::with_capacity(raw.clues.len());
            for raw_clue in raw.clues {
                let category_id = match &raw_clue.category {
                    CategoryRef::Id(id) if category_ids.contains(id) => *id,
                    CategoryRef::ShortName(name) if short_names.contains_key(name) => {
                        short_names[name]
                    }
                    other => {
                        return Err(RepositoryError::InvalidRecord(format!(
                            "clue for {} references unknown category {other:?}",
                            raw.imdb_id
                        )))
                    }
                };
                let clue_text = clean_whitespace(&raw_clue.clue_text);
                if clue_text.is_empty() {
                    warn!(imdb_id = %raw.imdb_id, "Skipping empty clue");
                    continue;
                }
                movie_clues.push(Clue {
                    clue_id: raw_clue.clue_id.unwrap_or_else(Uuid::new_v4),
                    movie_id,
                    category_id,
                    clue_text,
                    spoiler: raw_clue.spoiler,
                });
            }

            clues.insert(movie_id, movie_clues);
            movies.push(Movie {
                movie_id,
                imdb_id: raw.imdb_id,
                title,
                stripped_title,
                release_year: raw.release_year,
            });
        }

        Ok(Self {
            inner: Arc::new(RwLock::new(Inner {
                movies,
                clues,
                categories: corpus.categories,
                rng: StdRng::from_os_rng(),
            })),
        })
    }

    /// Replace the sampling generator with a seeded one.
    pub fn with_seed(self, seed: u64) -> Self {
        self.inner.write().rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Number of movies in the corpus.
    pub fn movie_count(&self) -> usize {
        self.inner.read().movies.len()
    }
}

impl Inner {
    fn sample(&mut self, exclude: &HashSet<MovieId>) -> Vec<MovieChoice> {
        let mut candidates: Vec<&Movie> = self
            .movies
            .iter()
            .filter(|movie| !exclude.contains(&movie.movie_id))
            .collect();
        candidates.shuffle(&mut self.rng);

        let mut years = HashSet::new();
        candidates
            .into_iter()
            .filter(|movie| years.insert(movie.release_year))
            .take(CANDIDATE_COUNT)
            .map(|movie| MovieChoice {
                movie_id: movie.movie_id,
                release_year: movie.release_year,
            })
            .collect()
    }
}

impl ClueRepository for CorpusRepository {
    fn sample_three_movie_candidates(
        &self,
        exclude: &[MovieId],
    ) -> Result<Vec<MovieChoice>, RepositoryError> {
        let mut inner = self.inner.write();
        let excluded: HashSet<MovieId> = exclude.iter().copied().collect();

        let mut choices = inner.sample(&excluded);
        if choices.len() < CANDIDATE_COUNT && !excluded.is_empty() {
            warn!(
                excluded = excluded.len(),
                "Not enough unplayed movies; offering played ones again"
            );
            choices = inner.sample(&HashSet::new());
        }
        if choices.len() < CANDIDATE_COUNT {
            return Err(RepositoryError::NotEnoughMovies {
                available: choices.len(),
            });
        }

        debug!(?choices, "Sampled movie candidates");
        Ok(choices)
    }

    fn get_movie(&self, movie_id: MovieId) -> Result<Movie, RepositoryError> {
        self.inner
            .read()
            .movies
            .iter()
            .find(|movie| movie.movie_id == movie_id)
            .cloned()
            .ok_or(RepositoryError::MovieNotFound(movie_id))
    }

    fn get_clues(&self, movie_id: MovieId) -> Result<Vec<Clue>, RepositoryError> {
        self.inner
            .read()
            .clues
            .get(&movie_id)
            .cloned()
            .ok_or(RepositoryError::MovieNotFound(movie_id))
    }

    fn get_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.inner.read().categories.clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::host::{evaluate_guess, Verdict};
    use serde_json::json;
    use tempfile::tempdir;

    pub(crate) fn sample_corpus() -> Corpus {
        serde_json::from_value(json!({
            "categories": [
                { "category_id": 1, "display_name": "Sex & Nudity", "short_name": "nudity" },
                { "category_id": 2, "display_name": "Violence & Gore", "short_name": "violence" },
                { "category_id": 3, "display_name": "Profanity", "short_name": "profanity" }
            ],
            "movies": [
                {
                    "imdb_id": "tt0133093",
                    "title": "The Matrix",
                    "release_year": 1999,
                    "clues": [
                        { "category": "violence", "clue_text": "A lobby shootout leaves many guards dead." },
                        { "category": 3, "clue_text": "Occasional  strong\n language." },
                        { "category": "violence", "clue_text": "The Matrix is full of gunfights." }
                    ]
                },
                {
                    "imdb_id": "tt0110912",
                    "title": "Pulp Fiction",
                    "release_year": 1994,
                    "clues": [
                        { "category": "profanity", "clue_text": "Hundreds of uses of the f-word." },
                        { "category": 2, "clue_text": "A man is shot in a car by accident.", "spoiler": true }
                    ]
                },
                {
                    "imdb_id": "tt0211915",
                    "title": "Amélie",
                    "release_year": 2001,
                    "clues": [
                        { "category": "nudity", "clue_text": "Several brief sex scenes played for comedy." }
                    ]
                },
                {
                    "imdb_id": "tt0088763",
                    "title": "Back to the Future",
                    "release_year": 1985,
                    "clues": [
                        { "category": "violence", "clue_text": "Terrorists shoot a man in a parking lot." }
                    ]
                }
            ]
        }))
        .expect("sample corpus is valid json")
    }

    #[test]
    fn validates_and_normalises_records() -> Result<()> {
        let repo = CorpusRepository::from_corpus(sample_corpus())?;
        assert_eq!(repo.movie_count(), 4);

        let inner = repo.inner.read();
        let amelie = inner
            .movies
            .iter()
            .find(|movie| movie.imdb_id == "tt0211915")
            .expect("amelie present");
        assert_eq!(amelie.stripped_title, "amelie");

        let matrix = inner
            .movies
            .iter()
            .find(|movie| movie.imdb_id == "tt0133093")
            .expect("matrix present");
        let clues = &inner.clues[&matrix.movie_id];
        assert_eq!(clues.len(), 3);
        assert_eq!(clues[1].clue_text, "Occasional strong language.");
        assert_eq!(clues[1].category_id, 3);
        assert_eq!(clues[0].category_id, 2);
        Ok(())
    }

    #[test]
    fn rejects_unknown_categories() {
        let mut corpus = sample_corpus();
        corpus.movies[0].clues[0].category = CategoryRef::ShortName("gore".to_string());
        let err = CorpusRepository::from_corpus(corpus).err().expect("validation fails");
        assert!(matches!(err, RepositoryError::InvalidRecord(_)));
    }

    #[test]
    fn folds_supplied_stripped_titles() -> Result<()> {
        let mut corpus = sample_corpus();
        corpus.movies[0].title = "El Niño".to_string();
        corpus.movies[0].stripped_title = Some("El Niño".to_string());
        corpus.movies[1].stripped_title = Some("?!".to_string());
        let repo = CorpusRepository::from_corpus(corpus)?;

        let inner = repo.inner.read();
        assert_eq!(inner.movies[0].stripped_title, "elnino");
        assert_eq!(
            inner.movies[1].stripped_title,
            strip_text(&inner.movies[1].title)
        );
        assert_eq!(
            evaluate_guess("El Niño", &inner.movies[0], "/pass"),
            Verdict::Correct
        );
        Ok(())
    }

    #[test]
    fn rejects_duplicate_short_names() {
        let mut corpus = sample_corpus();
        corpus.categories[1].short_name = corpus.categories[0].short_name.clone();
        assert!(matches!(
            CorpusRepository::from_corpus(corpus),
            Err(RepositoryError::InvalidRecord(message)) if message.contains("short name")
        ));
    }

    #[test]
    fn rejects_duplicate_imdb_ids() {
        let mut corpus = sample_corpus();
        corpus.movies[1].imdb_id = corpus.movies[0].imdb_id.clone();
        assert!(matches!(
            CorpusRepository::from_corpus(corpus),
            Err(RepositoryError::InvalidRecord(_))
        ));
    }

    #[test]
    fn samples_three_distinct_years() -> Result<()> {
        let repo = CorpusRepository::from_corpus(sample_corpus())?.with_seed(11);
        for _ in 0..20 {
            let choices = repo.sample_three_movie_candidates(&[])?;
            assert_eq!(choices.len(), 3);
            let years: HashSet<i32> = choices.iter().map(|choice| choice.release_year).collect();
            assert_eq!(years.len(), 3);
        }
        Ok(())
    }

    #[test]
    fn avoids_played_movies_while_possible() -> Result<()> {
        let repo = CorpusRepository::from_corpus(sample_corpus())?.with_seed(3);
        let played = repo.inner.read().movies[0].movie_id;
        for _ in 0..20 {
            let choices = repo.sample_three_movie_candidates(&[played])?;
            assert!(choices.iter().all(|choice| choice.movie_id != played));
        }

        let all: Vec<MovieId> = repo.inner.read().movies.iter().map(|m| m.movie_id).collect();
        let choices = repo.sample_three_movie_candidates(&all[..2])?;
        assert_eq!(choices.len(), 3);
        Ok(())
    }

    #[test]
    fn reports_too_small_corpus() -> Result<()> {
        let mut corpus = sample_corpus();
        corpus.movies.truncate(2);
        let repo = CorpusRepository::from_corpus(corpus)?;
        assert!(matches!(
            repo.sample_three_movie_candidates(&[]),
            Err(RepositoryError::NotEnoughMovies { available: 2 })
        ));
        Ok(())
    }

    #[test]
    fn looks_up_movies_and_clues() -> Result<()> {
        let repo = CorpusRepository::from_corpus(sample_corpus())?;
        let choice = repo.sample_three_movie_candidates(&[])?[0];
        let movie = repo.get_movie(choice.movie_id)?;
        assert_eq!(movie.release_year, choice.release_year);
        assert!(repo
            .get_clues(movie.movie_id)?
            .iter()
            .all(|clue| clue.movie_id == movie.movie_id));
        assert_eq!(repo.get_categories()?.len(), 3);

        let missing = Uuid::new_v4();
        assert!(matches!(
            repo.get_movie(missing),
            Err(RepositoryError::MovieNotFound(id)) if id == missing
        ));
        Ok(())
    }

    #[test]
    fn bundled_corpus_is_valid() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/corpus.json");
        let repo = CorpusRepository::load(path)?;
        assert!(repo.movie_count() >= 6);
        assert_eq!(repo.sample_three_movie_candidates(&[])?.len(), 3);
        Ok(())
    }

    #[test]
    fn loads_from_disk() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("corpus.json");
        fs::write(&path, serde_json::to_string_pretty(&sample_corpus())?)?;
        let repo = CorpusRepository::load(&path)?;
        assert_eq!(repo.movie_count(), 4);

        fs::write(&path, "{ not json")?;
        assert!(CorpusRepository::load(&path).is_err());
        Ok(())
    }
}
