// Library interface for music-wordle
// This allows integration tests and the binary to share the game modules

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod deezer;
pub mod error;
pub mod feedback;
pub mod game_state;
pub mod http;
pub mod logging;
pub mod share;
pub mod spotify;
pub mod tui;
pub mod validation;

// Re-export commonly used items for easier testing
pub use catalog::{Artist, CatalogProvider, Puzzle, Song, StaticCatalog};
pub use error::{Error, Result};
pub use feedback::{LetterFeedback, LetterStatus, compare, is_solved};
pub use game_state::{GameMode, GameStatus, Round, SessionSettings, game_loop};
pub use share::share_text;
pub use validation::{GuessError, is_valid_guess, normalize, validate_guess};
