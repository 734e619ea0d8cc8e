//! Application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory name under the platform config/data directories.
pub const APP_DIR: &str = "imdb-game";
/// Prefix of environment variable overrides (`IMDB_GAME_WRAP_WIDTH=80`).
pub const ENV_PREFIX: &str = "IMDB_GAME";

/// Settings for a game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// JSON corpus of movies, clues and categories.
    pub corpus_path: PathBuf,
    /// Directory where finished games are recorded.
    pub scores_dir: PathBuf,
    /// Player name used when none is given on the command line.
    pub player_name: String,
    /// Column width clue text is justified to.
    pub wrap_width: usize,
    /// Points deducted for a wrong guess.
    pub wrong_guess_penalty: i64,
    /// Guess that skips to the next clue without penalty.
    pub skip_token: String,
    /// Leave clues flagged as spoilers out of every round.
    pub hide_spoilers: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_path: config_dir().join("corpus.json"),
            scores_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("scores"),
            player_name: "player".to_string(),
            wrap_width: 60,
            wrong_guess_penalty: 1,
            skip_token: "/pass".to_string(),
            hide_spoilers: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Layer defaults, the TOML file at `path` (if present) and environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults =
            Config::try_from(&AppConfig::default()).context("failed to build default config")?;
        let settings = Config::builder()
            .add_source(defaults)
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

/// Platform configuration directory for the game.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Location of the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Write a default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(config_path())
}

/// Write a default config file at `path` if none exists yet.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }

    let defaults = AppConfig::default();
    let contents = format!(
        "# IMDb Game settings\n\
         corpus_path = {:?}\n\
         scores_dir = {:?}\n\
         player_name = {:?}\n\
         wrap_width = {}\n\
         wrong_guess_penalty = {}\n\
         skip_token = {:?}\n\
         hide_spoilers = {}\n",
        defaults.corpus_path.display().to_string(),
        defaults.scores_dir.display().to_string(),
        defaults.player_name,
        defaults.wrap_width,
        defaults.wrong_guess_penalty,
        defaults.skip_token,
        defaults.hide_spoilers,
    );
    fs::write(path, contents)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    info!(path = %path.display(), "Default config written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.wrap_width, 60);
        assert_eq!(config.wrong_guess_penalty, 1);
        assert_eq!(config.skip_token, "/pass");
        assert!(!config.hide_spoilers);
        Ok(())
    }

    #[test]
    fn default_file_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        ensure_default_config_at(&path)?;
        assert!(path.exists());
        assert_eq!(AppConfig::load_from(&path)?, AppConfig::default());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "wrap_width = 40\nwrong_guess_penalty = 2\nhide_spoilers = true\nplayer_name = \"mike\"\n",
        )?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.wrap_width, 40);
        assert_eq!(config.wrong_guess_penalty, 2);
        assert!(config.hide_spoilers);
        assert_eq!(config.player_name, "mike");
        assert_eq!(config.skip_token, "/pass");
        Ok(())
    }

    #[test]
    fn existing_file_is_left_alone() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "wrap_width = 72\n")?;
        ensure_default_config_at(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "wrap_width = 72\n");
        Ok(())
    }
}
