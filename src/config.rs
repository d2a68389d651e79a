//! Settings file handling.
//!
//! The file lives at `<config dir>/music-wordle/config.toml` unless a path is
//! given explicitly. Every key is optional; command-line flags are applied on
//! top by [`Config::apply_cli`].

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::game_state::{DEFAULT_MAX_ATTEMPTS, GameMode};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR: &str = "music-wordle";
pub const CONFIG_FILE: &str = "config.toml";
pub const TOKEN_ENV_VAR: &str = "SPOTIFY_ACCESS_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Built-in (or file-supplied) artist list
    Embedded,
    /// Public music catalog
    Deezer,
    /// Personal listening history
    Spotify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    Tui,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: GameMode,
    pub max_attempts: usize,
    pub source: SourceKind,
    pub artists_file: Option<PathBuf>,
    pub artist: Option<String>,
    pub interface: InterfaceKind,
    pub deezer_base_url: String,
    pub spotify_base_url: String,
    pub spotify_token: Option<String>,
    pub artist_cache_ttl_secs: u64,
    pub song_cache_ttl_secs: u64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: GameMode::Daily,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            source: SourceKind::Embedded,
            artists_file: None,
            artist: None,
            interface: InterfaceKind::Tui,
            deezer_base_url: "https://api.deezer.com".to_string(),
            spotify_base_url: "https://api.spotify.com/v1".to_string(),
            spotify_token: None,
            artist_cache_ttl_secs: 60 * 60,
            song_cache_ttl_secs: 30 * 60,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let config: Self = toml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(data) => Self::from_toml_str(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Loads from the explicit path if given, else from the default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Command-line flags take precedence over file values.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(mode) = cli.mode {
            self.mode = mode;
        }
        if let Some(source) = cli.source {
            self.source = source;
        }
        if let Some(path) = &cli.artists_path {
            self.artists_file = Some(path.clone());
        }
        if let Some(artist) = &cli.artist {
            self.artist = Some(artist.clone());
        }
        if let Some(max_attempts) = cli.max_attempts {
            self.max_attempts = max_attempts;
        }
        if cli.plain {
            self.interface = InterfaceKind::Plain;
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        self.validate()
    }

    /// Token from the file, falling back to the environment.
    pub fn resolve_spotify_token(&self) -> Option<String> {
        self.spotify_token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
            .filter(|token| !token.trim().is_empty())
    }

    pub fn artist_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.artist_cache_ttl_secs)
    }

    pub fn song_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.song_cache_ttl_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }
        if self.mode == GameMode::Song
            && self.artist.as_deref().is_none_or(|a| a.trim().is_empty())
        {
            return Err(Error::Config(
                "song mode needs an artist (--artist or `artist` in the config file)".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
