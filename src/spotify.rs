//! Personal listening-history provider.
//!
//! Builds the artist pool from the player's top artists, the artists of their
//! top tracks and their recently played tracks. Requests carry a bearer token
//! obtained outside this program.

use crate::cache::TtlCache;
use crate::catalog::{Artist, CatalogProvider, Song};
use crate::error::{Error, Result};
use crate::http::{HttpFetch, UreqFetch};
use crate::info_log;
use crate::validation::normalize;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const PAGE_LIMIT: &str = "50";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

/// Full artist objects carry images, genres and popularity; the simplified
/// ones embedded in tracks do not, so those fields default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotifyArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub album: Option<SpotifyAlbum>,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct PlayHistory {
    track: SpotifyTrack,
}

pub fn parse_top_artists(body: &str) -> Result<Vec<SpotifyArtist>> {
    Ok(serde_json::from_str::<Paging<SpotifyArtist>>(body)?.items)
}

pub fn parse_top_tracks(body: &str) -> Result<Vec<SpotifyTrack>> {
    Ok(serde_json::from_str::<Paging<SpotifyTrack>>(body)?.items)
}

pub fn parse_recently_played(body: &str) -> Result<Vec<SpotifyTrack>> {
    let history = serde_json::from_str::<Paging<PlayHistory>>(body)?;
    Ok(history.items.into_iter().map(|item| item.track).collect())
}

/// Every distinct artist credited on `tracks`, in order of first appearance.
#[must_use]
pub fn artists_from_tracks(tracks: &[SpotifyTrack]) -> Vec<SpotifyArtist> {
    let mut seen = HashSet::new();
    tracks
        .iter()
        .flat_map(|track| track.artists.iter())
        .filter(|artist| seen.insert(artist.id.clone()))
        .cloned()
        .collect()
}

/// Merges artist lists by id. A later occurrence replaces the earlier record
/// but keeps its position; the result is ordered by popularity, highest first.
#[must_use]
pub fn merge_artists(sources: Vec<Vec<SpotifyArtist>>) -> Vec<SpotifyArtist> {
    let mut merged: Vec<SpotifyArtist> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for artist in sources.into_iter().flatten() {
        match positions.get(&artist.id) {
            Some(&index) => merged[index] = artist,
            None => {
                positions.insert(artist.id.clone(), merged.len());
                merged.push(artist);
            }
        }
    }
    merged.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    merged
}

#[must_use]
pub fn to_artist(artist: &SpotifyArtist) -> Artist {
    let mut hints = vec!["One of the artists you listen to".to_string()];
    if !artist.genres.is_empty() {
        hints.push(format!("Genres: {}", artist.genres.join(", ")));
    }
    if artist.popularity > 0 {
        hints.push(format!("Popularity on Spotify: {}/100", artist.popularity));
    }
    Artist {
        id: format!("spotify-{}", artist.id),
        name: normalize(&artist.name),
        hints,
        photo: artist.images.first().map(|image| image.url.clone()),
    }
}

#[must_use]
pub fn to_song(track: &SpotifyTrack) -> Song {
    let performers: Vec<&str> = track.artists.iter().map(|a| a.name.as_str()).collect();
    let album = track.album.as_ref();
    let mut hints = Vec::new();
    if let Some(album) = album {
        hints.push(format!("From the album \"{}\"", album.name));
    }
    if performers.len() > 1 {
        hints.push(format!("Featuring {}", performers[1..].join(", ")));
    }
    Song {
        id: format!("spotify-track-{}", track.id),
        title: normalize(&track.name),
        artist: performers.first().copied().unwrap_or_default().to_string(),
        album: album.map(|a| a.name.clone()).unwrap_or_default(),
        album_cover: album
            .and_then(|a| a.images.first())
            .map(|image| image.url.clone()),
        hints,
    }
}

/// Tracks credited (in any position) to `artist`, compared case-insensitively.
#[must_use]
pub fn tracks_by<'a>(tracks: &'a [SpotifyTrack], artist: &str) -> Vec<&'a SpotifyTrack> {
    let wanted = artist.trim().to_lowercase();
    tracks
        .iter()
        .filter(|track| track.artists.iter().any(|a| a.name.to_lowercase() == wanted))
        .collect()
}

pub struct SpotifyCatalog<F: HttpFetch = UreqFetch> {
    http: F,
    base_url: String,
    token: String,
    artists: TtlCache<(), Vec<Artist>>,
    tracks: TtlCache<(), Vec<SpotifyTrack>>,
}

impl SpotifyCatalog {
    pub fn new(base_url: &str, token: Option<String>, ttl: Duration) -> Result<Self> {
        Self::with_fetcher(UreqFetch::new(), base_url, token, ttl)
    }
}

impl<F: HttpFetch> SpotifyCatalog<F> {
    pub fn with_fetcher(
        http: F,
        base_url: &str,
        token: Option<String>,
        ttl: Duration,
    ) -> Result<Self> {
        let token = token.ok_or(Error::MissingToken)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            artists: TtlCache::new(ttl),
            tracks: TtlCache::new(ttl),
        })
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        self.http.get_text(&url, query, Some(&self.token))
    }

    fn top_artists(&self) -> Result<Vec<SpotifyArtist>> {
        let body = self.get(
            "/me/top/artists",
            &[("time_range", "medium_term"), ("limit", PAGE_LIMIT)],
        )?;
        parse_top_artists(&body)
    }

    fn top_tracks(&mut self) -> Result<Vec<SpotifyTrack>> {
        if let Some(cached) = self.tracks.get(&()) {
            return Ok(cached.clone());
        }
        let body = self.get(
            "/me/top/tracks",
            &[("time_range", "medium_term"), ("limit", PAGE_LIMIT)],
        )?;
        let tracks = parse_top_tracks(&body)?;
        self.tracks.insert((), tracks.clone());
        Ok(tracks)
    }

    /// History is best effort: a failure yields no artists.
    fn recently_played(&self) -> Vec<SpotifyTrack> {
        let result = self
            .get("/me/player/recently-played", &[("limit", PAGE_LIMIT)])
            .and_then(|body| parse_recently_played(&body));
        match result {
            Ok(tracks) => tracks,
            Err(e) => {
                log::warn!("could not read recently played tracks: {e}");
                Vec::new()
            }
        }
    }
}

impl<F: HttpFetch> CatalogProvider for SpotifyCatalog<F> {
    fn name(&self) -> &str {
        "spotify"
    }

    fn artists(&mut self) -> Result<Vec<Artist>> {
        if let Some(cached) = self.artists.get(&()) {
            return Ok(cached.clone());
        }
        let top = self.top_artists()?;
        let from_tracks = artists_from_tracks(&self.top_tracks()?);
        let recent = artists_from_tracks(&self.recently_played());

        let merged = merge_artists(vec![top, from_tracks, recent]);
        if merged.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        info_log!("SpotifyCatalog - {} artists in listening history", merged.len());
        let artists: Vec<Artist> = merged.iter().map(to_artist).collect();
        self.artists.insert((), artists.clone());
        Ok(artists)
    }

    fn songs_by(&mut self, artist: &str) -> Result<Vec<Song>> {
        let tracks = self.top_tracks()?;
        let songs: Vec<Song> = tracks_by(&tracks, artist).into_iter().map(to_song).collect();
        if songs.is_empty() {
            return Err(Error::NoSongsFound {
                artist: artist.to_string(),
            });
        }
        Ok(songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fixtures::FixtureFetch;
    use pretty_assertions::assert_eq;

    const TOP_ARTISTS: &str = r#"{
        "items": [
            {"id": "a1", "name": "Radiohead", "genres": ["alternative rock", "art rock"],
             "popularity": 79, "images": [{"url": "https://i/a1.jpg", "height": 640, "width": 640}]},
            {"id": "a2", "name": "Portishead", "genres": [], "popularity": 65, "images": []}
        ],
        "total": 2, "limit": 50, "offset": 0
    }"#;

    const TOP_TRACKS: &str = r#"{
        "items": [
            {"id": "t1", "name": "Karma Police",
             "artists": [{"id": "a1", "name": "Radiohead"}],
             "album": {"name": "OK Computer", "images": [{"url": "https://i/okc.jpg"}]}},
            {"id": "t2", "name": "Teardrop",
             "artists": [{"id": "a3", "name": "Massive Attack"}, {"id": "a4", "name": "Elizabeth Fraser"}],
             "album": {"name": "Mezzanine", "images": []}}
        ]
    }"#;

    const RECENTLY_PLAYED: &str = r#"{
        "items": [
            {"played_at": "2026-10-14T20:00:00Z",
             "track": {"id": "t3", "name": "Glory Box", "artists": [{"id": "a2", "name": "Portishead"}]}}
        ]
    }"#;

    fn artist(id: &str, popularity: u32) -> SpotifyArtist {
        SpotifyArtist {
            id: id.to_string(),
            name: id.to_uppercase(),
            images: Vec::new(),
            genres: Vec::new(),
            popularity,
        }
    }

    #[test]
    fn test_parse_payloads() {
        let artists = parse_top_artists(TOP_ARTISTS).unwrap();
        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].genres, vec!["alternative rock", "art rock"]);

        let tracks = parse_top_tracks(TOP_TRACKS).unwrap();
        assert_eq!(tracks[1].artists.len(), 2);
        assert_eq!(tracks[1].artists[0].popularity, 0);

        let recent = parse_recently_played(RECENTLY_PLAYED).unwrap();
        assert_eq!(recent[0].name, "Glory Box");
        assert_eq!(recent[0].album, None);
    }

    #[test]
    fn test_artists_from_tracks_dedupes() {
        let mut tracks = parse_top_tracks(TOP_TRACKS).unwrap();
        tracks.extend(parse_top_tracks(TOP_TRACKS).unwrap());
        let ids: Vec<String> = artists_from_tracks(&tracks).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["a1", "a3", "a4"]);
    }

    #[test]
    fn test_merge_artists_later_record_wins() {
        let merged = merge_artists(vec![
            vec![artist("a", 50), artist("b", 90)],
            vec![artist("a", 0), artist("c", 70)],
        ]);
        let summary: Vec<(String, u32)> = merged.into_iter().map(|a| (a.id, a.popularity)).collect();
        assert_eq!(
            summary,
            vec![("b".to_string(), 90), ("c".to_string(), 70), ("a".to_string(), 0)]
        );
    }

    #[test]
    fn test_to_artist() {
        let artists = parse_top_artists(TOP_ARTISTS).unwrap();
        let converted = to_artist(&artists[0]);
        assert_eq!(converted.id, "spotify-a1");
        assert_eq!(converted.name, "RADIOHEAD");
        assert_eq!(converted.photo.as_deref(), Some("https://i/a1.jpg"));
        assert_eq!(
            converted.hints,
            vec![
                "One of the artists you listen to".to_string(),
                "Genres: alternative rock, art rock".to_string(),
                "Popularity on Spotify: 79/100".to_string(),
            ]
        );
    }

    #[test]
    fn test_to_song() {
        let tracks = parse_top_tracks(TOP_TRACKS).unwrap();
        let song = to_song(&tracks[1]);
        assert_eq!(song.title, "TEARDROP");
        assert_eq!(song.artist, "Massive Attack");
        assert_eq!(song.album, "Mezzanine");
        assert_eq!(song.album_cover, None);
        assert_eq!(
            song.hints,
            vec![
                "From the album \"Mezzanine\"".to_string(),
                "Featuring Elizabeth Fraser".to_string(),
            ]
        );
    }

    #[test]
    fn test_tracks_by() {
        let tracks = parse_top_tracks(TOP_TRACKS).unwrap();
        assert_eq!(tracks_by(&tracks, "radiohead").len(), 1);
        assert_eq!(tracks_by(&tracks, " Elizabeth Fraser ").len(), 1);
        assert!(tracks_by(&tracks, "Blur").is_empty());
    }

    const BASE: &str = "http://spotify.test/v1";

    fn top_artists_key() -> String {
        format!("{BASE}/me/top/artists?time_range=medium_term&limit=50")
    }

    fn top_tracks_key() -> String {
        format!("{BASE}/me/top/tracks?time_range=medium_term&limit=50")
    }

    fn recent_key() -> String {
        format!("{BASE}/me/player/recently-played?limit=50")
    }

    fn catalog(fetch: FixtureFetch) -> SpotifyCatalog<FixtureFetch> {
        SpotifyCatalog::with_fetcher(fetch, BASE, Some("tok".to_string()), Duration::from_secs(60))
            .unwrap()
    }

    #[test]
    fn test_artists_merge_all_sources() {
        let fetch = FixtureFetch::default()
            .route(&top_artists_key(), TOP_ARTISTS)
            .route(&top_tracks_key(), TOP_TRACKS)
            .route(&recent_key(), RECENTLY_PLAYED);
        let mut spotify = catalog(fetch);

        let ids: Vec<String> = spotify.artists().unwrap().into_iter().map(|a| a.id).collect();
        // Track and history records replace the full ones, so every popularity
        // is 0 and the stable sort keeps first-seen order.
        assert_eq!(
            ids,
            vec!["spotify-a1", "spotify-a2", "spotify-a3", "spotify-a4"]
        );
        assert!(
            spotify
                .http
                .calls
                .borrow()
                .iter()
                .all(|(_, token)| token.as_deref() == Some("tok"))
        );
        assert_eq!(spotify.http.call_count(), 3);

        spotify.artists().unwrap();
        assert_eq!(spotify.http.call_count(), 3);
    }

    #[test]
    fn test_artists_tolerate_missing_history() {
        let fetch = FixtureFetch::default()
            .route(&top_artists_key(), TOP_ARTISTS)
            .route(&top_tracks_key(), TOP_TRACKS);
        let mut spotify = catalog(fetch);

        let ids: Vec<String> = spotify.artists().unwrap().into_iter().map(|a| a.id).collect();
        // Portishead keeps its full record (popularity 65) and sorts first.
        assert_eq!(
            ids,
            vec!["spotify-a2", "spotify-a1", "spotify-a3", "spotify-a4"]
        );
        assert_eq!(spotify.http.called(&recent_key()), 1);
    }

    #[test]
    fn test_artists_require_top_artists() {
        let fetch = FixtureFetch::default()
            .route(&top_tracks_key(), TOP_TRACKS)
            .route(&recent_key(), RECENTLY_PLAYED);
        assert!(matches!(catalog(fetch).artists(), Err(Error::Http { .. })));
    }

    #[test]
    fn test_artists_empty_history() {
        let empty = r#"{"items": []}"#;
        let fetch = FixtureFetch::default()
            .route(&top_artists_key(), empty)
            .route(&top_tracks_key(), empty)
            .route(&recent_key(), empty);
        assert!(matches!(catalog(fetch).artists(), Err(Error::EmptyCatalog)));
    }

    #[test]
    fn test_songs_by_reuses_top_tracks() {
        let fetch = FixtureFetch::default()
            .route(&top_artists_key(), TOP_ARTISTS)
            .route(&top_tracks_key(), TOP_TRACKS)
            .route(&recent_key(), RECENTLY_PLAYED);
        let mut spotify = catalog(fetch);
        spotify.artists().unwrap();

        let songs = spotify.songs_by("radiohead").unwrap();
        assert_eq!(songs[0].title, "KARMA POLICE");
        assert!(matches!(
            spotify.songs_by("Blur"),
            Err(Error::NoSongsFound { artist }) if artist == "Blur"
        ));
        assert_eq!(spotify.http.called(&top_tracks_key()), 1);
    }

    #[test]
    fn test_missing_token() {
        let result = SpotifyCatalog::new("https://api.spotify.com/v1", None, Duration::from_secs(60));
        assert!(matches!(result, Err(Error::MissingToken)));
    }
}
