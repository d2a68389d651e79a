use crate::error::{Error, Result};
use crate::validation::normalize;
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const EMBEDDED_ARTISTS: &str = include_str!("resources/artists.txt");

/// Draws made when looking for a song that has not been played this session.
pub const MAX_SONG_DRAWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub hints: Vec<String>,
    pub photo: Option<String>,
}

impl Artist {
    /// Artist with no metadata beyond its (normalized) name.
    pub fn named(name: &str) -> Self {
        let name = normalize(name);
        Self {
            id: format!("local-{}", name.to_lowercase().replace(' ', "-")),
            name,
            hints: Vec::new(),
            photo: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_cover: Option<String>,
    pub hints: Vec<String>,
}

/// What the player is trying to guess in a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Puzzle {
    Artist(Artist),
    Song(Song),
}

impl Puzzle {
    pub fn answer(&self) -> &str {
        match self {
            Self::Artist(artist) => &artist.name,
            Self::Song(song) => &song.title,
        }
    }

    pub fn hints(&self) -> &[String] {
        match self {
            Self::Artist(artist) => &artist.hints,
            Self::Song(song) => &song.hints,
        }
    }

    /// Artist photo or album cover, shown once the round is over.
    pub fn artwork(&self) -> Option<&str> {
        match self {
            Self::Artist(artist) => artist.photo.as_deref(),
            Self::Song(song) => song.album_cover.as_deref(),
        }
    }

    /// Performer shown alongside a song puzzle.
    pub fn credited_artist(&self) -> Option<&str> {
        match self {
            Self::Artist(_) => None,
            Self::Song(song) => Some(&song.artist),
        }
    }
}

/// Source of round targets. Implemented by the embedded list and by the
/// networked providers.
pub trait CatalogProvider {
    /// Provider name for logs and messages.
    fn name(&self) -> &str;

    fn artists(&mut self) -> Result<Vec<Artist>>;

    fn songs_by(&mut self, artist: &str) -> Result<Vec<Song>>;

    fn random_artist(&mut self, rng: &mut StdRng) -> Result<Artist> {
        let artists = self.artists()?;
        if artists.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        let index = rng.gen_range(0..artists.len());
        Ok(artists[index].clone())
    }

    /// Same artist for every call on a given calendar day.
    fn daily_artist(&mut self, date: NaiveDate) -> Result<Artist> {
        let artists = self.artists()?;
        let index = daily_index(date, artists.len()).ok_or(Error::EmptyCatalog)?;
        Ok(artists[index].clone())
    }

    /// Picks a random song, retrying a few times to avoid ids in `played`.
    fn random_song(
        &mut self,
        artist: &str,
        played: &HashSet<String>,
        rng: &mut StdRng,
    ) -> Result<Song> {
        let songs = self.songs_by(artist)?;
        if songs.is_empty() {
            return Err(Error::NoSongsFound {
                artist: artist.to_string(),
            });
        }
        for _ in 0..MAX_SONG_DRAWS {
            let song = &songs[rng.gen_range(0..songs.len())];
            if !played.contains(&song.id) {
                return Ok(song.clone());
            }
        }
        Err(Error::NoSongsFound {
            artist: artist.to_string(),
        })
    }
}

/// Index of the daily pick: the 1-based day of the year modulo the catalog
/// size. `None` for an empty catalog.
#[must_use]
pub fn daily_index(date: NaiveDate, catalog_len: usize) -> Option<usize> {
    if catalog_len == 0 {
        return None;
    }
    Some(date.ordinal() as usize % catalog_len)
}

/// Builds an rng from an explicit seed, or from entropy when none is given.
#[must_use]
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Parses a newline-delimited artist list. Blank lines and `#` comments are
/// skipped; duplicate names keep their first position.
pub fn load_artists_from_str(data: &str) -> Vec<Artist> {
    let mut seen = HashSet::new();
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Artist::named)
        .filter(|artist| seen.insert(artist.name.clone()))
        .collect()
}

pub fn load_artists_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Artist>> {
    let data = fs::read_to_string(path)?;
    Ok(load_artists_from_str(&data))
}

/// Offline catalog backed by a fixed artist list. It has no song data.
pub struct StaticCatalog {
    artists: Vec<Artist>,
}

impl StaticCatalog {
    pub fn new(artists: Vec<Artist>) -> Self {
        Self { artists }
    }

    pub fn embedded() -> Self {
        Self::new(load_artists_from_str(EMBEDDED_ARTISTS))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let artists = load_artists_from_file(path)?;
        if artists.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(Self::new(artists))
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }
}

impl CatalogProvider for StaticCatalog {
    fn name(&self) -> &str {
        "embedded"
    }

    fn artists(&mut self) -> Result<Vec<Artist>> {
        Ok(self.artists.clone())
    }

    fn songs_by(&mut self, artist: &str) -> Result<Vec<Song>> {
        Err(Error::NoSongsFound {
            artist: artist.to_string(),
        })
    }
}
