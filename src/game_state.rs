//! Round state machine and the session controller that drives it.
//!
//! A [`Round`] owns one target and its attempt history and moves
//! `Playing -> Won | Lost`. [`game_loop`] fetches puzzles from a
//! [`CatalogProvider`], feeds player actions from a [`GameInterface`] into the
//! round and reports the outcome back to the interface.

use crate::catalog::{CatalogProvider, Puzzle, make_rng};
use crate::error::Result;
use crate::feedback::{LetterFeedback, compare, is_solved};
use crate::share::share_text;
use crate::validation::{GuessError, normalize, validate_guess};
use crate::{debug_log, info_log};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

pub const DEFAULT_MAX_ATTEMPTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// One artist per calendar day
    Daily,
    /// Random artists
    Practice,
    /// Random songs by a chosen artist
    Song,
}

/// A submitted guess and the board row it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessAttempt {
    pub guess: String,
    pub feedback: Vec<LetterFeedback>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("invalid guess: {0}")]
    InvalidGuess(#[from] GuessError),
    #[error("the round is already over")]
    RoundFinished,
}

#[derive(Debug, Clone)]
pub struct Round {
    target: String,
    attempts: Vec<GuessAttempt>,
    max_attempts: usize,
    status: GameStatus,
}

impl Round {
    /// Starts a round for `target`. At least one attempt is always allowed.
    pub fn new(target: &str, max_attempts: usize) -> Self {
        Self {
            target: normalize(target),
            attempts: Vec::new(),
            max_attempts: max_attempts.max(1),
            status: GameStatus::Playing,
        }
    }

    /// Validates, evaluates and records one guess, then advances the state.
    ///
    /// Rejected input leaves the round untouched.
    pub fn submit(&mut self, raw_guess: &str) -> std::result::Result<&GuessAttempt, RoundError> {
        if self.status != GameStatus::Playing {
            return Err(RoundError::RoundFinished);
        }
        let trimmed = raw_guess.trim();
        validate_guess(trimmed)?;

        let guess = normalize(trimmed);
        let feedback = compare(&guess, &self.target);
        let solved = is_solved(&feedback, guess.chars().count());
        self.attempts.push(GuessAttempt { guess, feedback });

        if solved {
            self.status = GameStatus::Won;
        } else if self.attempts.len() >= self.max_attempts {
            self.status = GameStatus::Lost;
        }
        debug_log!(
            "Round::submit() - attempt {}/{} -> {:?}",
            self.attempts.len(),
            self.max_attempts,
            self.status
        );
        Ok(&self.attempts[self.attempts.len() - 1])
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Board width in characters.
    pub fn target_len(&self) -> usize {
        self.target.chars().count()
    }

    pub fn attempts(&self) -> &[GuessAttempt] {
        &self.attempts
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn attempts_remaining(&self) -> usize {
        self.max_attempts - self.attempts.len()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::Playing
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Guess(String),
    Hint,
    NewGame,
    Exit,
}

/// What an interface needs to lay out a fresh board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundInfo {
    pub mode: GameMode,
    pub target_len: usize,
    pub max_attempts: usize,
    pub hint_count: usize,
    pub credited_artist: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub status: GameStatus,
    pub answer: String,
    pub attempts: usize,
    pub max_attempts: usize,
    pub share: String,
    pub artwork: Option<String>,
}

/// Front end of a session. Implemented by the line-based CLI and the TUI.
pub trait GameInterface {
    fn display_round_start(&mut self, info: &RoundInfo);
    /// Next player action, or `None` when the input produced nothing to act on.
    fn read_action(&mut self) -> Option<UserAction>;
    fn display_invalid_guess(&mut self, error: &GuessError);
    fn display_attempt(&mut self, round: &Round);
    /// `None` once every hint of the round has been revealed.
    fn display_hint(&mut self, hint: Option<&str>);
    fn display_round_over(&mut self, summary: &RoundSummary);
    fn display_error(&mut self, message: &str);
    fn display_exit_message(&mut self);
}

/// Fixed inputs of a play session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub mode: GameMode,
    /// Performer for song rounds.
    pub artist: Option<String>,
    pub max_attempts: usize,
    pub seed: Option<u64>,
    /// Day used to choose the daily artist.
    pub date: NaiveDate,
}

enum RoundOutcome {
    NextRound,
    Exit,
}

/// Plays rounds until the player exits or no further puzzle can be fetched.
///
/// A daily session plays the daily artist first and continues with practice
/// rounds. A failed fetch ends the session with that error; reporting it is
/// left to the caller, after the interface has released the terminal.
pub fn game_loop<P, I>(catalog: &mut P, settings: &SessionSettings, interface: &mut I) -> Result<()>
where
    P: CatalogProvider + ?Sized,
    I: GameInterface + ?Sized,
{
    let mut rng = make_rng(settings.seed);
    let mut played_songs = HashSet::new();
    let mut rounds_played = 0usize;

    loop {
        let mode = match (settings.mode, rounds_played) {
            (GameMode::Daily, 0) => GameMode::Daily,
            (GameMode::Daily, _) => GameMode::Practice,
            (mode, _) => mode,
        };
        let puzzle = match next_puzzle(catalog, settings, mode, &mut rng, &mut played_songs) {
            Ok(puzzle) => puzzle,
            Err(e) => {
                debug_log!("game_loop() - fetch from {} failed: {}", catalog.name(), e);
                return Err(e);
            }
        };
        info_log!("game_loop() - starting {:?} round", mode);
        rounds_played += 1;

        match play_round(&puzzle, mode, settings.max_attempts, interface) {
            RoundOutcome::NextRound => continue,
            RoundOutcome::Exit => {
                interface.display_exit_message();
                return Ok(());
            }
        }
    }
}

fn next_puzzle<P: CatalogProvider + ?Sized>(
    catalog: &mut P,
    settings: &SessionSettings,
    mode: GameMode,
    rng: &mut StdRng,
    played_songs: &mut HashSet<String>,
) -> Result<Puzzle> {
    match mode {
        GameMode::Daily => catalog.daily_artist(settings.date).map(Puzzle::Artist),
        GameMode::Practice => catalog.random_artist(rng).map(Puzzle::Artist),
        GameMode::Song => {
            let artist = settings.artist.as_deref().unwrap_or_default();
            let song = catalog.random_song(artist, played_songs, rng)?;
            played_songs.insert(song.id.clone());
            Ok(Puzzle::Song(song))
        }
    }
}

fn play_round<I: GameInterface + ?Sized>(
    puzzle: &Puzzle,
    mode: GameMode,
    max_attempts: usize,
    interface: &mut I,
) -> RoundOutcome {
    let mut round = Round::new(puzzle.answer(), max_attempts);
    let hints = puzzle.hints();
    let mut hints_shown = 0;

    interface.display_round_start(&RoundInfo {
        mode,
        target_len: round.target_len(),
        max_attempts: round.max_attempts(),
        hint_count: hints.len(),
        credited_artist: puzzle.credited_artist().map(str::to_string),
    });

    loop {
        let Some(action) = interface.read_action() else {
            continue;
        };
        match action {
            UserAction::Exit => return RoundOutcome::Exit,
            UserAction::NewGame => return RoundOutcome::NextRound,
            UserAction::Hint => {
                let hint = hints.get(hints_shown).map(String::as_str);
                if hint.is_some() {
                    hints_shown += 1;
                }
                interface.display_hint(hint);
            }
            UserAction::Guess(_) if round.is_over() => {
                interface.display_error("The round is over. Start a new game or exit.");
            }
            UserAction::Guess(raw) => match round.submit(&raw) {
                Ok(_) => {
                    interface.display_attempt(&round);
                    if round.is_over() {
                        let summary = RoundSummary {
                            status: round.status(),
                            answer: puzzle.answer().to_string(),
                            attempts: round.attempts().len(),
                            max_attempts: round.max_attempts(),
                            share: share_text(&round, puzzle.credited_artist()),
                            artwork: puzzle.artwork().map(str::to_string),
                        };
                        info_log!("play_round() - round finished: {:?}", summary.status);
                        interface.display_round_over(&summary);
                    }
                }
                Err(RoundError::InvalidGuess(e)) => {
                    debug_log!("play_round() - rejected guess {:?}: {}", raw, e);
                    interface.display_invalid_guess(&e);
                }
                Err(RoundError::RoundFinished) => {
                    interface.display_error("The round is over. Start a new game or exit.");
                }
            },
        }
    }
}
