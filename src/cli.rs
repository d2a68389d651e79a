use crate::config::SourceKind;
use crate::feedback::LetterStatus;
use crate::game_state::{
    GameInterface, GameMode, GameStatus, Round, RoundInfo, RoundSummary, UserAction,
};
use crate::validation::GuessError;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Guess the artist (or song) in a handful of tries, Wordle style.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Game mode
    #[arg(short, long, value_enum)]
    pub mode: Option<GameMode>,

    /// Artist whose songs are guessed in song mode
    #[arg(short, long)]
    pub artist: Option<String>,

    /// Where round targets come from
    #[arg(short, long, value_enum)]
    pub source: Option<SourceKind>,

    /// Path to a newline-delimited artist list
    #[arg(short = 'i', long = "input")]
    pub artists_path: Option<PathBuf>,

    /// Guesses allowed per round
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// Path to the config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for random picks
    #[arg(long)]
    pub seed: Option<u64>,

    /// Line-based interface instead of the full-screen board
    #[arg(long)]
    pub plain: bool,

    /// Debug logging on stderr (otherwise off under the full-screen board)
    #[arg(short, long)]
    pub verbose: bool,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Plain-text board row: each letter followed by its status marker
/// (`=` correct, `~` present, `.` absent). Missing letters show as `_`.
#[must_use]
pub fn render_row(round: &Round, index: usize) -> String {
    let Some(attempt) = round.attempts().get(index) else {
        return String::new();
    };
    attempt
        .feedback
        .iter()
        .map(|f| {
            let letter = f.letter.unwrap_or('_');
            let marker = match f.status {
                LetterStatus::Correct => '=',
                LetterStatus::Present => '~',
                LetterStatus::Absent => '.',
            };
            format!("{letter}{marker}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn mode_prompt(info: &RoundInfo) -> String {
    match (&info.mode, &info.credited_artist) {
        (GameMode::Song, Some(artist)) => format!("Guess the song by {artist}"),
        (GameMode::Daily, _) => "Guess today's artist".to_string(),
        _ => "Guess the artist".to_string(),
    }
}

/// Line-oriented front end over any reader/writer pair.
pub struct CliInterface<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead> CliInterface<R, std::io::Stdout> {
    pub fn new(reader: R) -> Self {
        Self::with_writer(reader, std::io::stdout())
    }
}

impl<R: BufRead, W: Write> CliInterface<R, W> {
    pub fn with_writer(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn say(&mut self, text: &str) {
        // Output failures on a terminal are not recoverable mid-game.
        let _ = writeln!(self.writer, "{text}");
    }
}

impl<R: BufRead, W: Write> GameInterface for CliInterface<R, W> {
    fn display_round_start(&mut self, info: &RoundInfo) {
        let prompt = mode_prompt(info);
        self.say(&format!(
            "\n{prompt}: {} characters, {} attempts.",
            info.target_len, info.max_attempts
        ));
        if info.hint_count > 0 {
            self.say(&format!("{} hints available ('hint' to reveal one).", info.hint_count));
        }
    }

    fn read_action(&mut self) -> Option<UserAction> {
        self.say("\nEnter your guess (or 'hint', 'next' for a new game, 'exit' to quit):");
        let mut input = String::new();
        match self.reader.read_line(&mut input) {
            Ok(0) | Err(_) => return Some(UserAction::Exit),
            Ok(_) => {}
        }
        let trimmed = input.trim();
        match trimmed.to_uppercase().as_str() {
            "EXIT" => Some(UserAction::Exit),
            "NEXT" => Some(UserAction::NewGame),
            "HINT" => Some(UserAction::Hint),
            _ => Some(UserAction::Guess(trimmed.to_string())),
        }
    }

    fn display_invalid_guess(&mut self, error: &GuessError) {
        self.say(&format!("Invalid guess: {error}."));
    }

    fn display_attempt(&mut self, round: &Round) {
        let index = round.attempts().len().saturating_sub(1);
        let row = render_row(round, index);
        self.say(&row);
        if !round.is_over() {
            self.say(&format!(
                "Attempt {}/{}",
                round.attempts().len(),
                round.max_attempts()
            ));
        }
    }

    fn display_hint(&mut self, hint: Option<&str>) {
        match hint {
            Some(hint) => self.say(&format!("Hint: {hint}")),
            None => self.say("No hints left."),
        }
    }

    fn display_round_over(&mut self, summary: &RoundSummary) {
        match summary.status {
            GameStatus::Won => {
                let plural = if summary.attempts > 1 { "s" } else { "" };
                self.say(&format!(
                    "Congratulations! You got \"{}\" in {} attempt{plural}!",
                    summary.answer, summary.attempts
                ));
            }
            GameStatus::Lost | GameStatus::Playing => {
                self.say(&format!("Out of attempts. The answer was \"{}\".", summary.answer));
            }
        }
        if let Some(url) = &summary.artwork {
            self.say(&format!("Artwork: {url}"));
        }
        self.say(&format!("\n{}", summary.share));
        self.say("Type 'next' for a new game or 'exit' to quit.");
    }

    fn display_error(&mut self, message: &str) {
        self.say(&format!("Error: {message}"));
    }

    fn display_exit_message(&mut self) {
        self.say("Exiting.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn interface(input: &str) -> CliInterface<Cursor<&str>, Vec<u8>> {
        CliInterface::with_writer(Cursor::new(input), Vec::new())
    }

    #[test]
    fn test_parse_cli_defaults() {
        let cli = Cli::parse_from(["music-wordle"]);
        assert_eq!(cli.mode, None);
        assert_eq!(cli.artists_path, None);
        assert!(!cli.plain);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_cli_song_mode() {
        let cli = Cli::parse_from([
            "music-wordle",
            "--mode",
            "song",
            "--artist",
            "Queen",
            "--source",
            "deezer",
        ]);
        assert_eq!(cli.mode, Some(GameMode::Song));
        assert_eq!(cli.artist.as_deref(), Some("Queen"));
        assert_eq!(cli.source, Some(SourceKind::Deezer));
    }

    #[test]
    fn test_parse_cli_with_path() {
        let cli = Cli::parse_from(["music-wordle", "-i", "artists.txt"]);
        assert_eq!(cli.artists_path, Some(PathBuf::from("artists.txt")));
    }

    #[test]
    fn test_read_action_commands() {
        let mut ui = interface("exit\nNext\nhint\n  guns n' roses  \n");
        assert_eq!(ui.read_action(), Some(UserAction::Exit));
        assert_eq!(ui.read_action(), Some(UserAction::NewGame));
        assert_eq!(ui.read_action(), Some(UserAction::Hint));
        assert_eq!(
            ui.read_action(),
            Some(UserAction::Guess("guns n' roses".to_string()))
        );
    }

    #[test]
    fn test_read_action_eof_exits() {
        let mut ui = interface("");
        assert_eq!(ui.read_action(), Some(UserAction::Exit));
    }

    #[test]
    fn test_render_row() {
        let mut round = Round::new("APPLE", 6);
        round.submit("PAPER").unwrap();
        assert_eq!(render_row(&round, 0), "P~ A~ P= E~ R.");
        round.submit("AB").unwrap();
        assert_eq!(render_row(&round, 1), "A= B. _. _. _.");
        assert_eq!(render_row(&round, 5), "");
    }

    #[test]
    fn test_round_over_output() {
        let mut ui = interface("");
        ui.display_round_over(&RoundSummary {
            status: GameStatus::Won,
            answer: "ADELE".to_string(),
            attempts: 1,
            max_attempts: 6,
            share: "🎵 Music Wordle 1/6\n".to_string(),
            artwork: None,
        });
        let output = String::from_utf8(ui.into_writer()).unwrap();
        assert!(output.contains("You got \"ADELE\" in 1 attempt!"));
        assert!(output.contains("🎵 Music Wordle 1/6"));
        assert!(!output.contains("Artwork"));
    }

    #[test]
    fn test_round_over_shows_artwork() {
        let mut ui = interface("");
        ui.display_round_over(&RoundSummary {
            status: GameStatus::Lost,
            answer: "HELLO".to_string(),
            attempts: 6,
            max_attempts: 6,
            share: "🎵 Music Wordle X/6\n".to_string(),
            artwork: Some("https://img.test/25.jpg".to_string()),
        });
        let output = String::from_utf8(ui.into_writer()).unwrap();
        assert!(output.contains("The answer was \"HELLO\".\nArtwork: https://img.test/25.jpg\n"));
    }

    #[test]
    fn test_invalid_guess_output() {
        let mut ui = interface("");
        ui.display_invalid_guess(&GuessError::InvalidCharacter('/'));
        let output = String::from_utf8(ui.into_writer()).unwrap();
        assert!(output.starts_with("Invalid guess: '/' is not allowed"));
    }
}
