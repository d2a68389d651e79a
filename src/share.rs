use crate::game_state::{GameStatus, Round};

pub const SHARE_TITLE: &str = "🎵 Music Wordle";

/// Text a player can paste to share a finished round without spoiling it.
///
/// The header shows `attempts/max` for a win and `X/max` otherwise. When a
/// performer is given (song rounds) it is named on its own line. Each attempt
/// becomes one row of colored squares.
#[must_use]
pub fn share_text(round: &Round, credited_artist: Option<&str>) -> String {
    let result = match round.status() {
        GameStatus::Won => format!("{}/{}", round.attempts().len(), round.max_attempts()),
        GameStatus::Lost | GameStatus::Playing => format!("X/{}", round.max_attempts()),
    };

    let mut text = format!("{SHARE_TITLE} {result}\n");
    if let Some(artist) = credited_artist {
        text.push_str(&format!("🎤 Artist: {artist}\n"));
    }
    text.push('\n');

    for attempt in round.attempts() {
        let line: String = attempt.feedback.iter().map(|f| f.status.emoji()).collect();
        text.push_str(&line);
        text.push('\n');
    }
    text
}
