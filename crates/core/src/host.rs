//! The game show host: drives a game turn by turn over a line-based console.

use std::{
    collections::HashMap,
    io::{self, BufRead, Write},
};

use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    game::{Game, GuessOutcome, Round, RoundError, RoundOutcome},
    models::{Category, CategoryId, Clue, Movie, MovieChoice, Player},
    repository::{ClueRepository, RepositoryError},
    text::{justify_text, strip_text},
};

const PROMPT: &str = "> ";
/// Consecutive unreadable lines tolerated before the console is given up on.
const MAX_READ_FAILURES: u32 = 5;

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The repository failed; there is no retry.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// The player's input stream ended.
    #[error("player input closed before the game ended")]
    InputClosed,
    /// Writing to or reading from the console failed.
    #[error("console i/o failed: {0}")]
    Io(#[from] io::Error),
    /// A clue was requested without a round in progress.
    #[error("no round in progress")]
    NoActiveRound,
}

/// What the host does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Offer years and start a new round.
    NextRound,
    /// Present another clue of the current round.
    NextClue,
}

/// How a guess compares to the movie in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The guess names the movie.
    Correct,
    /// Anything else.
    Wrong,
    /// The player asked for the next clue.
    Skip,
}

/// Judge a guess. The skip token wins over any title it might also match.
pub fn evaluate_guess(guess: &str, movie: &Movie, skip_token: &str) -> Verdict {
    if guess.trim() == skip_token {
        return Verdict::Skip;
    }
    let folded = strip_text(guess);
    if !folded.is_empty() && folded == movie.stripped_title {
        Verdict::Correct
    } else {
        Verdict::Wrong
    }
}

/// Tunables of the host taken from [`AppConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    /// Column width clue text is justified to.
    pub wrap_width: usize,
    /// Points deducted for a wrong guess.
    pub wrong_guess_penalty: i64,
    /// Guess that moves on without penalty.
    pub skip_token: String,
    /// Leave spoiler clues out of every round.
    pub hide_spoilers: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for HostSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            wrap_width: config.wrap_width,
            wrong_guess_penalty: config.wrong_guess_penalty,
            skip_token: config.skip_token.clone(),
            hide_spoilers: config.hide_spoilers,
        }
    }
}

/// Runs one game for one player.
pub struct GameShowHost<R, I, W> {
    repository: R,
    player: Player,
    game: Game,
    categories: HashMap<CategoryId, Category>,
    settings: HostSettings,
    rng: StdRng,
    input: I,
    output: W,
    read_failures: u32,
}

impl<R, I, W> GameShowHost<R, I, W>
where
    R: ClueRepository,
    I: BufRead,
    W: Write,
{
    /// Start a new game for `player`. Categories are fetched once, here.
    pub fn new(
        repository: R,
        player: Player,
        settings: HostSettings,
        input: I,
        output: W,
    ) -> Result<Self, SessionError> {
        let categories = repository
            .get_categories()?
            .into_iter()
            .map(|category| (category.category_id, category))
            .collect();
        let game = Game::new(player.player_id);
        info!(
            player = %player.username,
            game_id = %game.game_id(),
            "Game created"
        );
        Ok(Self {
            repository,
            player,
            game,
            categories,
            settings,
            rng: StdRng::from_os_rng(),
            input,
            output,
            read_failures: 0,
        })
    }

    /// Use a seeded generator for clue draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Game being played.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Player the game belongs to.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Play until the game is over and return the final score.
    pub fn game_loop(&mut self) -> Result<i64, SessionError> {
        let mut action = Action::NextRound;
        while !self.game.is_over() {
            action = match action {
                Action::NextRound => {
                    let choice = self.choose_movie()?;
                    self.setup_round(choice)?;
                    self.present_clue()?
                }
                Action::NextClue => self.next_clue()?,
            };
        }

        let score = self.game.score();
        writeln!(self.output, "\nGAME OVER")?;
        writeln!(self.output, "Final score: {score}")?;
        self.output.flush()?;
        info!(
            player = %self.player.username,
            score,
            rounds = self.game.completed_rounds().len() + 1,
            "Game finished"
        );
        Ok(score)
    }

    fn choose_movie(&mut self) -> Result<MovieChoice, SessionError> {
        let played = self.game.played_movie_ids();
        let choices = self.repository.sample_three_movie_candidates(&played)?;
        let years = choices
            .iter()
            .map(|choice| choice.release_year.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        loop {
            write!(
                self.output,
                "\nSelect from the following years:\n{years}\n{PROMPT}"
            )?;
            self.output.flush()?;

            if let Some(line) = self.read_line()? {
                let picked = line.trim().parse::<i32>().ok().and_then(|year| {
                    choices
                        .iter()
                        .copied()
                        .find(|choice| choice.release_year == year)
                });
                if let Some(choice) = picked {
                    debug!(year = choice.release_year, "Year selected");
                    return Ok(choice);
                }
                debug!(input = %line, "Rejected year selection");
            }
            writeln!(self.output, "Please select one of the listed years.")?;
        }
    }

    fn setup_round(&mut self, choice: MovieChoice) -> Result<(), SessionError> {
        let movie = self.repository.get_movie(choice.movie_id)?;
        let clues = self.repository.get_clues(movie.movie_id)?;

        let mut round = Round::new(self.game.get_round(), movie, clues);
        let quoting_title = round.remove_clues_with_movie_title();
        let spoilers = if self.settings.hide_spoilers {
            round.remove_spoilers()
        } else {
            0
        };
        info!(
            round = round.round_number(),
            clues = round.clues_pool().len(),
            quoting_title,
            spoilers,
            "Round started"
        );
        debug!(title = %round.movie().title, "Movie in play");

        writeln!(self.output, "\nRound {}", round.round_number())?;
        self.game.start_round(round);
        Ok(())
    }

    fn next_clue(&mut self) -> Result<Action, SessionError> {
        self.current_round()?.increment_clue_number();
        self.present_clue()
    }

    fn present_clue(&mut self) -> Result<Action, SessionError> {
        let Some(round) = self.game.current_round_mut() else {
            return Err(SessionError::NoActiveRound);
        };
        if round.is_exhausted() {
            debug!(
                round = round.round_number(),
                clue = round.get_clue_number(),
                "Round has no clue left to show"
            );
            return self.reveal_answer();
        }
        let clue = match round.get_random_clue_with(&mut self.rng) {
            Ok(clue) => clue,
            Err(RoundError::CluesExhausted { round_number }) => {
                debug!(round = round_number, "Clue pool exhausted");
                return self.reveal_answer();
            }
        };
        let clue_number = round.get_clue_number();

        self.announce_clue(clue_number, &clue)?;
        let guess = self.read_guess()?;
        self.judge(guess)
    }

    fn announce_clue(&mut self, clue_number: u32, clue: &Clue) -> Result<(), SessionError> {
        let category = match self.categories.get(&clue.category_id) {
            Some(category) => category.display_name.as_str(),
            None => {
                warn!(category_id = clue.category_id, "Clue has an unknown category");
                "Unknown"
            }
        };
        writeln!(
            self.output,
            "\nClue #{clue_number} is in the {category} category..."
        )?;
        writeln!(
            self.output,
            "{}",
            justify_text(&clue.clue_text, self.settings.wrap_width)
        )?;
        Ok(())
    }

    fn read_guess(&mut self) -> Result<String, SessionError> {
        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;
            match self.read_line()? {
                Some(line) if !line.trim().is_empty() => return Ok(line),
                Some(_) => writeln!(
                    self.output,
                    "Type a movie title, or {} for the next clue.",
                    self.settings.skip_token
                )?,
                None => writeln!(self.output, "Could not read that guess, please try again.")?,
            }
        }
    }

    fn judge(&mut self, guess: String) -> Result<Action, SessionError> {
        let penalty = self.settings.wrong_guess_penalty;
        let round = self
            .game
            .current_round_mut()
            .ok_or(SessionError::NoActiveRound)?;
        let verdict = evaluate_guess(&guess, round.movie(), &self.settings.skip_token);
        let clue_number = round.get_clue_number();

        match verdict {
            Verdict::Correct => {
                let points = round.get_current_points();
                round.record_guess(guess, GuessOutcome::Correct, points);
                round.finish(RoundOutcome::Solved { points });
                self.game.increment_score(points);
                info!(clue = clue_number, points, "Correct guess");
                writeln!(self.output, "Correct! +{points} {}", point_word(points))?;
                self.finish_round()?;
                Ok(Action::NextRound)
            }
            Verdict::Skip => {
                round.record_guess(guess, GuessOutcome::Skipped, 0);
                debug!(clue = clue_number, "Clue skipped");
                writeln!(self.output, "Skipping to the next clue (+0 points)")?;
                Ok(Action::NextClue)
            }
            Verdict::Wrong => {
                round.record_guess(guess, GuessOutcome::Wrong, -penalty);
                self.game.decrement_score(penalty);
                debug!(clue = clue_number, penalty, "Wrong guess");
                writeln!(self.output, "Wrong! -{penalty} {}", point_word(penalty))?;
                Ok(Action::NextClue)
            }
        }
    }

    fn reveal_answer(&mut self) -> Result<Action, SessionError> {
        let round = self.current_round()?;
        round.finish(RoundOutcome::Revealed);
        let movie = round.movie().clone();
        info!(round = round.round_number(), "Round ended without a correct guess");
        writeln!(
            self.output,
            "\nOut of clues! The movie was {} ({})",
            movie.title, movie.release_year
        )?;
        self.finish_round()?;
        Ok(Action::NextRound)
    }

    fn finish_round(&mut self) -> Result<(), SessionError> {
        if let Some(round) = self.game.current_round() {
            writeln!(self.output, "More about it: {}", round.movie().imdb_link())?;
        }
        self.game.increment_round();
        writeln!(self.output, "{}", self.game.report_score())?;
        Ok(())
    }

    fn current_round(&mut self) -> Result<&mut Round, SessionError> {
        self.game
            .current_round_mut()
            .ok_or(SessionError::NoActiveRound)
    }

    /// `Ok(None)` when the line could not be read and should be asked again.
    fn read_line(&mut self) -> Result<Option<String>, SessionError> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => Err(SessionError::InputClosed),
            Ok(_) => {
                self.read_failures = 0;
                Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
            }
            Err(err) => {
                self.read_failures += 1;
                if self.read_failures >= MAX_READ_FAILURES {
                    warn!(failures = self.read_failures, "Giving up on player input: {err}");
                    return Err(err.into());
                }
                warn!(kind = ?err.kind(), "Unreadable player input: {err}");
                Ok(None)
            }
        }
    }
}

fn point_word(points: i64) -> &'static str {
    if points.abs() == 1 {
        "point"
    } else {
        "points"
    }
}
