use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Clue, Movie};

/// Number of clues a round can reveal; also the points for a first-clue answer.
pub const TOTAL_CLUES: u32 = 5;

/// Failure modes of a single round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    /// Every clue of the pool has already been played.
    #[error("no clues remaining for round {round_number}")]
    CluesExhausted { round_number: u32 },
}

/// How a guess was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessOutcome {
    Correct,
    Wrong,
    Skipped,
}

/// A guess made against one clue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRecord {
    /// 1-indexed clue the guess was made on.
    pub clue_number: u32,
    pub guess: String,
    pub outcome: GuessOutcome,
    /// Signed score change caused by the guess.
    pub points: i64,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    /// The movie was guessed.
    Solved { points: i64 },
    /// Clues ran out and the answer was revealed.
    Revealed,
}

/// Frozen view of a round kept in the game history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_number: u32,
    pub movie: Movie,
    pub clues_played: Vec<Clue>,
    pub guesses: Vec<GuessRecord>,
    pub outcome: Option<RoundOutcome>,
}

/// One movie-guessing cycle of up to [`TOTAL_CLUES`] clue reveals.
#[derive(Debug, Clone)]
pub struct Round {
    round_number: u32,
    current_movie: Movie,
    clues_pool: Vec<Clue>,
    clues_played: Vec<Clue>,
    current_clue_number: u32,
    total_clues: u32,
    guesses: Vec<GuessRecord>,
    outcome: Option<RoundOutcome>,
}

impl Round {
    pub fn new(round_number: u32, current_movie: Movie, clues: Vec<Clue>) -> Self {
        Self {
            round_number,
            current_movie,
            clues_pool: clues,
            clues_played: Vec::new(),
            current_clue_number: 0,
            total_clues: TOTAL_CLUES,
            guesses: Vec::new(),
            outcome: None,
        }
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn movie(&self) -> &Movie {
        &self.current_movie
    }

    pub fn clues_pool(&self) -> &[Clue] {
        &self.clues_pool
    }

    pub fn clues_played(&self) -> &[Clue] {
        &self.clues_played
    }

    pub fn guesses(&self) -> &[GuessRecord] {
        &self.guesses
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    pub fn total_clues(&self) -> u32 {
        self.total_clues
    }

    /// Current clue number, 1-indexed.
    pub fn get_clue_number(&self) -> u32 {
        self.current_clue_number + 1
    }

    /// Points awarded for a correct answer at the current clue.
    pub fn get_current_points(&self) -> i64 {
        i64::from(self.total_clues) - i64::from(self.current_clue_number)
    }

    pub fn increment_clue_number(&mut self) {
        self.current_clue_number += 1;
    }

    /// True once the clue budget is spent or nothing is left to draw.
    pub fn is_exhausted(&self) -> bool {
        self.current_clue_number >= self.total_clues || self.clues_pool.is_empty()
    }

    /// Draw a random clue from the pool and mark it as played.
    pub fn get_random_clue(&mut self) -> Result<Clue, RoundError> {
        self.get_random_clue_with(&mut rand::rng())
    }

    /// Same as [`Round::get_random_clue`] with a caller-provided generator.
    pub fn get_random_clue_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Clue, RoundError> {
        if self.clues_pool.is_empty() {
            return Err(RoundError::CluesExhausted {
                round_number: self.round_number,
            });
        }
        let index = rng.random_range(0..self.clues_pool.len());
        let clue = self.clues_pool.swap_remove(index);
        self.clues_played.push(clue.clone());
        Ok(clue)
    }

    /// Drop clues quoting the movie title verbatim. Returns how many were removed.
    pub fn remove_clues_with_movie_title(&mut self) -> usize {
        let title = &self.current_movie.title;
        let before = self.clues_pool.len();
        self.clues_pool
            .retain(|clue| !clue.clue_text.contains(title.as_str()));
        before - self.clues_pool.len()
    }

    /// Drop clues flagged as spoilers. Returns how many were removed.
    pub fn remove_spoilers(&mut self) -> usize {
        let before = self.clues_pool.len();
        self.clues_pool.retain(|clue| !clue.spoiler);
        before - self.clues_pool.len()
    }

    pub fn record_guess(&mut self, guess: impl Into<String>, outcome: GuessOutcome, points: i64) {
        self.guesses.push(GuessRecord {
            clue_number: self.get_clue_number(),
            guess: guess.into(),
            outcome,
            points,
        });
    }

    pub fn finish(&mut self, outcome: RoundOutcome) {
        self.outcome = Some(outcome);
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            round_number: self.round_number,
            movie: self.current_movie.clone(),
            clues_played: self.clues_played.clone(),
            guesses: self.guesses.clone(),
            outcome: self.outcome,
        }
    }
}
