use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::round::{Round, RoundSummary};
use crate::models::{MovieId, PlayerId};

/// Rounds after which the game is over.
pub const MAX_ROUNDS: u32 = 5;

/// Score and progress of a single play session.
#[derive(Debug, Clone)]
pub struct Game {
    game_id: Uuid,
    player_id: PlayerId,
    score: i64,
    round: u32,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    game_over: bool,
    current_round: Option<Round>,
    completed_rounds: Vec<RoundSummary>,
}

impl Game {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            game_id: Uuid::new_v4(),
            player_id,
            score: 0,
            round: 0,
            start_time: Utc::now(),
            end_time: None,
            game_over: false,
            current_round: None,
            completed_rounds: Vec::new(),
        }
    }

    pub fn game_id(&self) -> Uuid {
        self.game_id
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.current_round.as_ref()
    }

    pub fn current_round_mut(&mut self) -> Option<&mut Round> {
        self.current_round.as_mut()
    }

    pub fn completed_rounds(&self) -> &[RoundSummary] {
        &self.completed_rounds
    }

    /// Advance the round counter, ending the game once it passes [`MAX_ROUNDS`].
    ///
    /// The end time is stamped on the first terminal transition only.
    pub fn increment_round(&mut self) {
        self.round += 1;
        if self.round > MAX_ROUNDS {
            self.game_over = true;
            if self.end_time.is_none() {
                self.end_time = Some(Utc::now());
            }
        }
    }

    pub fn increment_score(&mut self, points: i64) {
        self.score += points;
    }

    pub fn decrement_score(&mut self, points: i64) {
        self.score -= points;
    }

    /// Current round number, 1-indexed.
    pub fn get_round(&self) -> u32 {
        self.round + 1
    }

    pub fn report_score(&self) -> String {
        format!("Your current score is: {}", self.score)
    }

    /// Make `round` the current round, archiving the previous one.
    pub fn start_round(&mut self, round: Round) {
        self.archive_current_round();
        self.current_round = Some(round);
    }

    /// Move the current round, if any, into the completed history.
    pub fn archive_current_round(&mut self) {
        if let Some(previous) = self.current_round.take() {
            self.completed_rounds.push(previous.summary());
        }
    }

    /// Movies already put in front of the player this session.
    pub fn played_movie_ids(&self) -> Vec<MovieId> {
        self.completed_rounds
            .iter()
            .map(|summary| summary.movie.movie_id)
            .chain(self.current_round.iter().map(|round| round.movie().movie_id))
            .collect()
    }
}
