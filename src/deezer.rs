//! Public music catalog provider.
//!
//! Artists come from searching a fixed list of well-known names; songs come
//! from an artist's top tracks. Both are cached for a configurable TTL.

use crate::cache::TtlCache;
use crate::catalog::{Artist, CatalogProvider, Song};
use crate::error::{Error, Result};
use crate::http::{HttpFetch, UreqFetch};
use crate::validation::normalize;
use crate::{debug_log, info_log};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Seed names searched to build the artist pool.
pub const POPULAR_ARTISTS: [&str; 40] = [
    "taylor swift", "bts", "adele", "drake", "ariana grande",
    "billie eilish", "justin bieber", "dua lipa", "the weeknd", "bruno mars",
    "coldplay", "imagine dragons", "maroon 5", "blackpink", "eminem",
    "rihanna", "beyonce", "lady gaga", "katy perry", "post malone",
    "shawn mendes", "harry styles", "olivia rodrigo", "doja cat", "bad bunny",
    "twice", "stray kids", "newjeans", "seventeen", "ive",
    "michael jackson", "queen", "the beatles", "elvis presley", "madonna",
    "ed sheeran", "sam smith", "john legend", "alicia keys", "usher",
];

/// Seeds actually searched when the pool is built.
const SEARCHED_SEEDS: usize = 20;
const MAX_POOL_SIZE: usize = 30;
const ARTIST_SEARCH_LIMIT: &str = "5";
const TOP_TRACKS_LIMIT: &str = "50";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeezerArtist {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub picture_small: Option<String>,
    #[serde(default)]
    pub picture_medium: Option<String>,
    #[serde(default)]
    pub nb_fan: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeezerTrackArtist {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeezerAlbum {
    pub title: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub cover_small: Option<String>,
    #[serde(default)]
    pub cover_medium: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeezerTrack {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub duration: u64,
    pub artist: DeezerTrackArtist,
    pub album: DeezerAlbum,
}

/// `{"data": [...]}` envelope. Error payloads carry no `data` and decode as
/// an empty list.
#[derive(Debug, Deserialize)]
struct DataList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

pub fn parse_artist_search(body: &str) -> Result<Vec<DeezerArtist>> {
    Ok(serde_json::from_str::<DataList<DeezerArtist>>(body)?.data)
}

pub fn parse_tracks(body: &str) -> Result<Vec<DeezerTrack>> {
    Ok(serde_json::from_str::<DataList<DeezerTrack>>(body)?.data)
}

/// Deduplicates by id (first wins), orders by fan count and caps the pool.
#[must_use]
pub fn rank_artists(found: Vec<DeezerArtist>) -> Vec<DeezerArtist> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<DeezerArtist> = found
        .into_iter()
        .filter(|artist| seen.insert(artist.id))
        .collect();
    ranked.sort_by(|a, b| b.nb_fan.cmp(&a.nb_fan));
    ranked.truncate(MAX_POOL_SIZE);
    ranked
}

/// First search hit whose name contains, or is contained in, the query
/// (case-insensitive); otherwise the first hit.
#[must_use]
pub fn pick_matching_artist<'a>(query: &str, candidates: &'a [DeezerArtist]) -> Option<&'a DeezerArtist> {
    let query = query.to_lowercase();
    candidates
        .iter()
        .find(|artist| {
            let name = artist.name.to_lowercase();
            name.contains(&query) || query.contains(&name)
        })
        .or_else(|| candidates.first())
}

#[must_use]
pub fn to_artist(artist: &DeezerArtist) -> Artist {
    let fans = if artist.nb_fan > 0 {
        group_thousands(artist.nb_fan)
    } else {
        "many".to_string()
    };
    Artist {
        id: format!("deezer-{}", artist.id),
        name: normalize(&artist.name),
        hints: vec![
            "Internationally popular artist".to_string(),
            format!("Has {fans} fans on Deezer"),
        ],
        photo: artist
            .picture_medium
            .clone()
            .or_else(|| artist.picture_small.clone())
            .or_else(|| artist.picture.clone()),
    }
}

#[must_use]
pub fn to_song(track: &DeezerTrack) -> Song {
    let mut hints = vec![
        format!("From the album \"{}\"", track.album.title),
        format!("Duration: {}", format_duration(track.duration)),
    ];
    if track.album.title != track.title {
        hints.push("The album is named differently from the song".to_string());
    }
    Song {
        id: format!("deezer-track-{}", track.id),
        title: normalize(&track.title),
        artist: track.artist.name.clone(),
        album: track.album.title.clone(),
        album_cover: track
            .album
            .cover_medium
            .clone()
            .or_else(|| track.album.cover.clone())
            .or_else(|| track.album.cover_small.clone()),
        hints,
    }
}

/// `m:ss` rendering of a duration in seconds.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

pub struct DeezerCatalog<F: HttpFetch = UreqFetch> {
    http: F,
    base_url: String,
    artists: TtlCache<(), Vec<Artist>>,
    songs: TtlCache<String, Vec<Song>>,
}

impl DeezerCatalog {
    pub fn new(base_url: &str, artist_ttl: Duration, song_ttl: Duration) -> Self {
        Self::with_fetcher(UreqFetch::new(), base_url, artist_ttl, song_ttl)
    }
}

impl<F: HttpFetch> DeezerCatalog<F> {
    pub fn with_fetcher(http: F, base_url: &str, artist_ttl: Duration, song_ttl: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            artists: TtlCache::new(artist_ttl),
            songs: TtlCache::new(song_ttl),
        }
    }

    fn search_artists(&self, query: &str) -> Result<Vec<DeezerArtist>> {
        let url = format!("{}/search/artist", self.base_url);
        let body = self
            .http
            .get_text(&url, &[("q", query), ("limit", ARTIST_SEARCH_LIMIT)], None)?;
        parse_artist_search(&body)
    }

    fn top_tracks(&self, artist_id: u64) -> Result<Vec<DeezerTrack>> {
        let url = format!("{}/artist/{artist_id}/top", self.base_url);
        let body = self.http.get_text(&url, &[("limit", TOP_TRACKS_LIMIT)], None)?;
        parse_tracks(&body)
    }

    /// Individual seed failures are skipped. When nothing at all is found the
    /// last failure is returned, if there was one.
    fn fetch_popular_artists(&self) -> Result<Vec<Artist>> {
        let mut found = Vec::new();
        let mut last_error = None;
        for seed in POPULAR_ARTISTS.iter().take(SEARCHED_SEEDS) {
            match self.search_artists(seed) {
                Ok(hits) => found.extend(hits.into_iter().next()),
                Err(e) => {
                    debug_log!("DeezerCatalog - artist search for '{}' failed: {}", seed, e);
                    last_error = Some(e);
                }
            }
        }
        let ranked = rank_artists(found);
        if ranked.is_empty() {
            return Err(last_error.unwrap_or(Error::EmptyCatalog));
        }
        if let Some(e) = last_error {
            log::warn!("some artist searches failed, last error: {e}");
        }
        info_log!("DeezerCatalog - built artist pool of {}", ranked.len());
        Ok(ranked.iter().map(to_artist).collect())
    }

    fn fetch_songs(&self, artist: &str) -> Result<Vec<Song>> {
        let candidates = self.search_artists(artist)?;
        let target = pick_matching_artist(artist, &candidates).ok_or_else(|| Error::NoSongsFound {
            artist: artist.to_string(),
        })?;
        debug_log!("DeezerCatalog - '{}' resolved to {} ({})", artist, target.name, target.id);
        let songs: Vec<Song> = self
            .top_tracks(target.id)?
            .iter()
            .filter(|track| track.artist.id == target.id)
            .map(to_song)
            .collect();
        Ok(songs)
    }
}

impl<F: HttpFetch> CatalogProvider for DeezerCatalog<F> {
    fn name(&self) -> &str {
        "deezer"
    }

    fn artists(&mut self) -> Result<Vec<Artist>> {
        if let Some(cached) = self.artists.get(&()) {
            return Ok(cached.clone());
        }
        let artists = self.fetch_popular_artists()?;
        self.artists.insert((), artists.clone());
        Ok(artists)
    }

    fn songs_by(&mut self, artist: &str) -> Result<Vec<Song>> {
        let key = artist.trim().to_lowercase();
        if let Some(cached) = self.songs.get(&key) {
            return Ok(cached.clone());
        }
        self.songs.evict_expired();
        let songs = self.fetch_songs(artist.trim())?;
        if songs.is_empty() {
            return Err(Error::NoSongsFound {
                artist: artist.to_string(),
            });
        }
        self.songs.insert(key, songs.clone());
        Ok(songs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fixtures::FixtureFetch;
    use pretty_assertions::assert_eq;

    const SEARCH_BODY: &str = r#"{
        "data": [
            {"id": 27, "name": "Daft Punk", "picture_medium": "https://img/27-m.jpg", "nb_fan": 4512345, "type": "artist"},
            {"id": 11, "name": "Daft Punk Tribute", "nb_fan": 120, "type": "artist"}
        ],
        "total": 2
    }"#;

    const TRACKS_BODY: &str = r#"{
        "data": [
            {"id": 3135556, "title": "Harder, Better, Faster, Stronger", "duration": 224,
             "artist": {"id": 27, "name": "Daft Punk"},
             "album": {"id": 302127, "title": "Discovery", "cover_medium": "https://img/discovery.jpg"}},
            {"id": 999, "title": "Get Lucky", "duration": 248,
             "artist": {"id": 5, "name": "Someone Else"},
             "album": {"id": 1, "title": "Get Lucky"}}
        ]
    }"#;

    fn artist(id: u64, name: &str, nb_fan: u64) -> DeezerArtist {
        DeezerArtist {
            id,
            name: name.to_string(),
            picture: None,
            picture_small: None,
            picture_medium: None,
            nb_fan,
        }
    }

    #[test]
    fn test_parse_artist_search() {
        let artists = parse_artist_search(SEARCH_BODY).unwrap();
        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].name, "Daft Punk");
        assert_eq!(artists[0].nb_fan, 4_512_345);
        assert_eq!(artists[1].picture_medium, None);
    }

    #[test]
    fn test_parse_error_payload_is_empty() {
        let body = r#"{"error": {"type": "DataException", "message": "no data", "code": 800}}"#;
        assert!(parse_artist_search(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_tracks("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_rank_artists() {
        let ranked = rank_artists(vec![
            artist(1, "Adele", 100),
            artist(2, "Queen", 300),
            artist(1, "Adele", 100),
            artist(3, "Usher", 200),
        ]);
        let ids: Vec<u64> = ranked.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_rank_artists_caps_pool() {
        let many: Vec<DeezerArtist> = (0..40).map(|i| artist(i, "X", i)).collect();
        assert_eq!(rank_artists(many).len(), MAX_POOL_SIZE);
    }

    #[test]
    fn test_pick_matching_artist() {
        let hits = vec![artist(1, "Queens of the Stone Age", 1), artist(2, "Queen", 2)];
        assert_eq!(pick_matching_artist("queen", &hits).unwrap().id, 1);
        assert_eq!(pick_matching_artist("QUEEN + Adam Lambert", &hits).unwrap().id, 2);
        let hits = vec![artist(9, "Somebody", 1)];
        assert_eq!(pick_matching_artist("nobody", &hits).unwrap().id, 9);
        assert!(pick_matching_artist("nobody", &[]).is_none());
    }

    #[test]
    fn test_to_artist() {
        let parsed = parse_artist_search(SEARCH_BODY).unwrap();
        let converted = to_artist(&parsed[0]);
        assert_eq!(converted.id, "deezer-27");
        assert_eq!(converted.name, "DAFT PUNK");
        assert_eq!(converted.photo.as_deref(), Some("https://img/27-m.jpg"));
        assert_eq!(converted.hints[1], "Has 4,512,345 fans on Deezer");

        let unknown = to_artist(&artist(1, "x", 0));
        assert_eq!(unknown.hints[1], "Has many fans on Deezer");
    }

    #[test]
    fn test_to_song() {
        let tracks = parse_tracks(TRACKS_BODY).unwrap();
        let song = to_song(&tracks[0]);
        assert_eq!(song.id, "deezer-track-3135556");
        assert_eq!(song.title, "HARDER, BETTER, FASTER, STRONGER");
        assert_eq!(song.album_cover.as_deref(), Some("https://img/discovery.jpg"));
        assert_eq!(
            song.hints,
            vec![
                "From the album \"Discovery\"".to_string(),
                "Duration: 3:44".to_string(),
                "The album is named differently from the song".to_string(),
            ]
        );

        let title_track = to_song(&tracks[1]);
        assert_eq!(title_track.hints.len(), 2);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(600), "10:00");
    }

    const BASE: &str = "http://deezer.test";

    fn search_key(query: &str) -> String {
        format!("{BASE}/search/artist?q={query}&limit=5")
    }

    fn catalog(fetch: FixtureFetch) -> DeezerCatalog<FixtureFetch> {
        let ttl = Duration::from_secs(60);
        DeezerCatalog::with_fetcher(fetch, &format!("{BASE}/"), ttl, ttl)
    }

    #[test]
    fn test_artist_pool_from_seed_searches() {
        let fetch = FixtureFetch::default()
            .route(
                &search_key("taylor swift"),
                r#"{"data": [{"id": 12246, "name": "Taylor Swift", "nb_fan": 10},
                             {"id": 99, "name": "Taylor Swift Tribute", "nb_fan": 1000}]}"#,
            )
            .route(
                &search_key("adele"),
                r#"{"data": [{"id": 75798, "name": "Adele", "nb_fan": 20}]}"#,
            )
            .route(
                &search_key(POPULAR_ARTISTS[SEARCHED_SEEDS]),
                r#"{"data": [{"id": 1, "name": "Never Searched", "nb_fan": 99999}]}"#,
            );
        let mut deezer = catalog(fetch);

        // First hit per seed only; failed seeds are skipped.
        let names: Vec<String> = deezer.artists().unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["ADELE", "TAYLOR SWIFT"]);
        assert_eq!(deezer.http.call_count(), SEARCHED_SEEDS);
        assert_eq!(deezer.http.called(&search_key(POPULAR_ARTISTS[SEARCHED_SEEDS])), 0);

        deezer.artists().unwrap();
        assert_eq!(deezer.http.call_count(), SEARCHED_SEEDS);
    }

    #[test]
    fn test_artist_pool_reports_http_failure() {
        let mut deezer = catalog(FixtureFetch::default());
        assert!(matches!(deezer.artists(), Err(Error::Http { .. })));
    }

    #[test]
    fn test_artist_pool_empty_results() {
        let mut fetch = FixtureFetch::default();
        for seed in POPULAR_ARTISTS.iter().take(SEARCHED_SEEDS) {
            fetch = fetch.route(&search_key(seed), r#"{"data": []}"#);
        }
        assert!(matches!(catalog(fetch).artists(), Err(Error::EmptyCatalog)));
    }

    #[test]
    fn test_songs_by_filters_and_caches() {
        let fetch = FixtureFetch::default()
            .route(&search_key("Daft Punk"), SEARCH_BODY)
            .route(&format!("{BASE}/artist/27/top?limit=50"), TRACKS_BODY);
        let mut deezer = catalog(fetch);

        let songs = deezer.songs_by("Daft Punk").unwrap();
        let titles: Vec<&str> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["HARDER, BETTER, FASTER, STRONGER"]);
        assert_eq!(deezer.http.call_count(), 2);

        // Cached under the trimmed, lower-cased name.
        assert_eq!(deezer.songs_by("  daft punk ").unwrap(), songs);
        assert_eq!(deezer.http.call_count(), 2);
    }

    #[test]
    fn test_songs_by_without_tracks() {
        let fetch = FixtureFetch::default()
            .route(&search_key("Daft Punk"), SEARCH_BODY)
            .route(&format!("{BASE}/artist/27/top?limit=50"), r#"{"data": []}"#)
            .route(&search_key("Nobody"), r#"{"data": []}"#);
        let mut deezer = catalog(fetch);
        assert!(matches!(
            deezer.songs_by("Daft Punk"),
            Err(Error::NoSongsFound { artist }) if artist == "Daft Punk"
        ));
        assert!(matches!(deezer.songs_by("Nobody"), Err(Error::NoSongsFound { .. })));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(7), "7");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(123456), "123,456");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
