//! Records of finished games.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    game::{Game, RoundSummary},
    models::{Player, PlayerId},
};

/// Summary of a recorded game shown in score listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Absolute path to the record on disk.
    pub path: PathBuf,
    /// Name of the player who played the game.
    pub username: String,
    /// Final score.
    pub score: i64,
    /// When the game ended.
    pub finished_at: DateTime<Utc>,
}

/// Full record of a finished game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    /// Identifier of the game.
    pub game_id: Uuid,
    /// Identifier of the player.
    pub player_id: PlayerId,
    /// Name of the player.
    pub username: String,
    /// Final score.
    pub score: i64,
    /// When the game started.
    pub start_time: DateTime<Utc>,
    /// When the game ended.
    pub end_time: DateTime<Utc>,
    /// Every round played, in order.
    #[serde(default)]
    pub rounds: Vec<RoundSummary>,
}

impl GameRecord {
    /// Snapshot a finished game. Fails if the game is still in progress.
    pub fn from_game(game: &Game, player: &Player) -> Result<Self> {
        let end_time = game
            .end_time()
            .ok_or_else(|| anyhow!("game {} has not finished", game.game_id()))?;
        let mut rounds = game.completed_rounds().to_vec();
        if let Some(current) = game.current_round() {
            rounds.push(current.summary());
        }
        Ok(Self {
            game_id: game.game_id(),
            player_id: player.player_id,
            username: player.username.clone(),
            score: game.score(),
            start_time: game.start_time(),
            end_time,
            rounds,
        })
    }
}

/// Stores one JSON file per finished game.
pub struct ScoreBook {
    root: PathBuf,
}

impl ScoreBook {
    /// Create a score book rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// All records sorted by finish time (most recent first).
    pub fn entries(&self) -> Result<Vec<ScoreEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root).context("failed to read scores directory")? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.path().extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            match self.read_record(entry.path()) {
                Ok(record) => entries.push(ScoreEntry {
                    path: entry.path(),
                    username: record.username,
                    score: record.score,
                    finished_at: record.end_time,
                }),
                Err(err) => {
                    warn!("Failed to read score record {:?}: {err}", entry.path());
                }
            }
        }

        entries.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));
        Ok(entries)
    }

    /// Highest scores first, ties broken by the earlier finish.
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<ScoreEntry>> {
        let mut entries = self.entries()?;
        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.finished_at.cmp(&b.finished_at))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    /// Persist a finished game and return its entry.
    pub fn record(&self, record: &GameRecord) -> Result<ScoreEntry> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;

        let file_name = format!(
            "{}_{}_{}.json",
            sanitize_component(&record.username),
            record.end_time.format("%Y%m%d%H%M%S"),
            record.game_id.simple()
        );
        let path = self.root.join(file_name);
        let serialised = serde_json::to_vec_pretty(record)?;
        fs::write(&path, serialised)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(ScoreEntry {
            path,
            username: record.username.clone(),
            score: record.score,
            finished_at: record.end_time,
        })
    }

    fn read_record(&self, path: impl AsRef<Path>) -> Result<GameRecord> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let record = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(record)
    }
}

fn sanitize_component(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
            result.push(ch);
        }
    }
    if result.is_empty() {
        "player".to_string()
    } else {
        result
    }
}
