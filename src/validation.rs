use thiserror::Error;

/// Longest accepted guess, counted in characters after trailing whitespace
/// is removed.
pub const MAX_GUESS_LENGTH: usize = 60;

/// Punctuation allowed in artist names and song titles besides letters and
/// whitespace.
pub const ALLOWED_SYMBOLS: [char; 6] = ['&', '\'', '(', ')', ',', '-'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuessError {
    #[error("guess is empty")]
    Empty,
    #[error("guess is {length} characters long (at most {max} allowed)")]
    TooLong { length: usize, max: usize },
    #[error("'{0}' is not allowed (use letters, spaces and & ' ( ) , -)")]
    InvalidCharacter(char),
}

/// Checks raw user input, reporting the first reason it cannot be played.
///
/// Case does not matter. The length bound applies to the uppercased text
/// without trailing whitespace; every character, leading and interior
/// whitespace included, must be an ASCII letter, whitespace or one of
/// `& ' ( ) , -`.
pub fn validate_guess(text: &str) -> Result<(), GuessError> {
    // Measured after uppercasing: some letters expand (ß -> SS).
    let upper = text.to_uppercase();
    let length = upper.trim_end().chars().count();
    if length == 0 {
        return Err(GuessError::Empty);
    }
    if length > MAX_GUESS_LENGTH {
        return Err(GuessError::TooLong {
            length,
            max: MAX_GUESS_LENGTH,
        });
    }
    match upper.chars().find(|&c| !is_allowed(c)) {
        Some(c) => Err(GuessError::InvalidCharacter(c)),
        None => Ok(()),
    }
}

#[must_use]
pub fn is_valid_guess(text: &str) -> bool {
    validate_guess(text).is_ok()
}

/// Uppercases and trims surrounding whitespace. Applied identically to guesses
/// and targets before comparison.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_uppercase()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_whitespace() || ALLOWED_SYMBOLS.contains(&c)
}
