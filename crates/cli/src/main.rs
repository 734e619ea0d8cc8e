use anyhow::{Context, Result};
use std::{
    env,
    fs::{self, OpenOptions},
    io,
    sync::Mutex,
};

use imdb_game_core::{
    config::{self, AppConfig},
    CorpusRepository, GameRecord, GameShowHost, HostSettings, Player, ScoreBook, SessionError,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

const LEADERBOARD_SIZE: usize = 5;

fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let username = env::args()
        .nth(1)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| config.player_name.clone());
    let player = Player::new(username);

    let repository = CorpusRepository::load(&config.corpus_path)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut host = GameShowHost::new(
        repository,
        player.clone(),
        HostSettings::from(&config),
        stdin.lock(),
        stdout.lock(),
    )?;

    match host.game_loop() {
        Ok(_) => {}
        Err(SessionError::InputClosed) => {
            info!(player = %player.username, "Player left before the game ended");
            return Ok(());
        }
        Err(err) => return Err(err).context("game session failed"),
    }

    let record = GameRecord::from_game(host.game(), &player)?;
    drop(host);

    let book = ScoreBook::new(&config.scores_dir);
    let entry = book.record(&record)?;
    info!(path = %entry.path.display(), score = entry.score, "Game recorded");

    println!("\nTop scores:");
    for (rank, entry) in book.leaderboard(LEADERBOARD_SIZE)?.iter().enumerate() {
        println!(
            "{:>2}. {:<16} {:>4}  {}",
            rank + 1,
            entry.username,
            entry.score,
            entry.finished_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let log_dir = env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("imdb-game.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the game itself, so logs only go to the file
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
