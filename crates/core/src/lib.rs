#![warn(clippy::all, missing_docs)]

//! Core logic for the IMDb Game.
//!
//! This crate hosts the data models, configuration handling, the clue
//! repository, round/game state and the game show host that drives a
//! session, plus the score book finished games are recorded in.

pub mod config;
pub mod game;
pub mod host;
pub mod models;
pub mod repository;
pub mod scores;
pub mod text;

pub use config::AppConfig;
pub use game::{Game, Round, RoundError};
pub use host::{GameShowHost, HostSettings, SessionError};
pub use models::{Category, Clue, Movie, MovieChoice, Player};
pub use repository::{ClueRepository, CorpusRepository, RepositoryError};
pub use scores::{GameRecord, ScoreBook};
