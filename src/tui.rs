//! Full-screen board using Ratatui.
//!
//! # Architecture
//! - `BoardState`: everything shown on screen plus key handling, free of any
//!   terminal so it can be driven directly
//! - `TuiInterface`: owns the terminal, renders a `BoardState` and implements
//!   [`GameInterface`]
//!
//! # State Machine
//! `EnteringGuess` → `RoundOver` → (N) back to `EnteringGuess` on the next round.

use crate::feedback::{LetterFeedback, LetterStatus};
use crate::game_state::{
    GameInterface, GameMode, GameStatus, Round, RoundInfo, RoundSummary, UserAction,
};
use crate::validation::{ALLOWED_SYMBOLS, GuessError};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ROW_SPACING: u16 = 2;
const HINT_KEY: char = '?';

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

/// (background, foreground) of an evaluated tile.
fn tile_colors(status: LetterStatus) -> (Color, Color) {
    match status {
        LetterStatus::Correct => (Color::Green, Color::Black),
        LetterStatus::Present => (Color::Yellow, Color::Black),
        LetterStatus::Absent => (Color::Gray, Color::White),
    }
}

const PENDING_COLORS: (Color, Color) = (Color::DarkGray, Color::White);

/// Characters the input row accepts. Anything else would be rejected on
/// submission anyway.
fn accepts_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == ' ' || ALLOWED_SYMBOLS.contains(&c)
}

fn has_modifier_keys(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TuiState {
    EnteringGuess,
    RoundOver,
}

#[derive(Debug)]
struct BoardState {
    title: String,
    rows: Vec<Vec<LetterFeedback>>,
    target_len: usize,
    max_attempts: usize,
    current_input: String,
    state: TuiState,
    hint_count: usize,
    hints: Vec<String>,
    share: String,
    artwork: Option<String>,
    message: String,
    error_message: String,
    status: String,
}

impl BoardState {
    fn new() -> Self {
        Self {
            title: "MUSIC WORDLE".to_string(),
            rows: Vec::new(),
            target_len: 0,
            max_attempts: 0,
            current_input: String::new(),
            state: TuiState::EnteringGuess,
            hint_count: 0,
            hints: Vec::new(),
            share: String::new(),
            artwork: None,
            message: String::new(),
            error_message: String::new(),
            status: "Loading...".to_string(),
        }
    }

    fn start_round(&mut self, info: &RoundInfo) {
        self.title = match (info.mode, &info.credited_artist) {
            (GameMode::Song, Some(artist)) => format!("MUSIC WORDLE - a song by {artist}"),
            (GameMode::Daily, _) => "MUSIC WORDLE - today's artist".to_string(),
            _ => "MUSIC WORDLE - guess the artist".to_string(),
        };
        self.rows.clear();
        self.target_len = info.target_len;
        self.max_attempts = info.max_attempts;
        self.current_input.clear();
        self.state = TuiState::EnteringGuess;
        self.hint_count = info.hint_count;
        self.hints.clear();
        self.share.clear();
        self.artwork = None;
        self.message = format!(
            "{} characters, {} attempts",
            info.target_len, info.max_attempts
        );
        self.error_message.clear();
        self.status = "Type your guess".to_string();
    }

    fn finish_round(&mut self, summary: &RoundSummary) {
        self.state = TuiState::RoundOver;
        self.message = match summary.status {
            GameStatus::Won => format!("✓ You got \"{}\"!", summary.answer),
            GameStatus::Lost | GameStatus::Playing => {
                format!("The answer was \"{}\"", summary.answer)
            }
        };
        self.share.clone_from(&summary.share);
        self.artwork.clone_from(&summary.artwork);
        self.status = "Round over".to_string();
    }

    fn input_len(&self) -> usize {
        self.current_input.chars().count()
    }

    fn showing_current_input(&self) -> bool {
        self.state == TuiState::EnteringGuess && self.rows.len() < self.max_attempts
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<UserAction> {
        match self.state {
            TuiState::EnteringGuess => self.handle_guess_input(key),
            TuiState::RoundOver => Self::handle_round_over_input(key),
        }
    }

    fn handle_guess_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        self.error_message.clear();
        if has_modifier_keys(&key) {
            debug_log!(
                "handle_guess_input() - Ignoring key with modifier: {:?}",
                key.modifiers
            );
            return None;
        }

        match key.code {
            KeyCode::Esc => {
                info_log!("handle_guess_input() - ESC pressed, returning Exit");
                Some(UserAction::Exit)
            }
            KeyCode::Char(HINT_KEY) => Some(UserAction::Hint),
            KeyCode::Char(c) if accepts_char(c) && self.input_len() < self.target_len => {
                self.current_input.push(c.to_ascii_uppercase());
                None
            }
            KeyCode::Char(c) if accepts_char(c) => {
                self.error_message = format!("The answer has {} characters", self.target_len);
                None
            }
            KeyCode::Char(c) => {
                self.error_message = format!("'{c}' is not allowed");
                debug_log!("handle_guess_input() - Rejecting character: '{}'", c);
                None
            }
            KeyCode::Backspace => {
                self.current_input.pop();
                None
            }
            KeyCode::Enter if self.current_input.trim().is_empty() => {
                self.error_message = "Type a guess first".to_string();
                None
            }
            KeyCode::Enter => {
                let guess = std::mem::take(&mut self.current_input);
                info_log!("handle_guess_input() - Submitting '{}'", guess);
                Some(UserAction::Guess(guess))
            }
            _ => {
                debug_log!("handle_guess_input() - Ignoring key: {:?}", key.code);
                None
            }
        }
    }

    fn handle_round_over_input(key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Char('n' | 'N') => Some(UserAction::NewGame),
            KeyCode::Esc => Some(UserAction::Exit),
            _ => None,
        }
    }
}

/// Terminal front end.
///
/// Enters raw mode and the alternate screen on creation; both are restored on
/// drop.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    board: BoardState,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete");

        Ok(Self {
            terminal,
            board: BoardState::new(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let board = &self.board;
        self.terminal.draw(|f| render(f, board))?;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    fn handle_input(&mut self) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }
        match event::read()? {
            // Release and Repeat events would double the input on some terminals.
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                if let KeyCode::Char('\u{FFFD}') = key.code {
                    return Ok(None);
                }
                debug_log!(
                    "handle_input() - Key event: code={:?}, modifiers={:?}",
                    key.code,
                    key.modifiers
                );
                Ok(self.board.handle_key(key))
            }
            other => {
                debug_log!("handle_input() - Ignoring event: {:?}", other);
                Ok(None)
            }
        }
    }
}

fn render(f: &mut Frame, board: &BoardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title
            Constraint::Length(14), // Board
            Constraint::Min(8),     // Info panel
            Constraint::Length(3),  // Status line
            Constraint::Length(3),  // Instructions
        ])
        .split(f.area());

    render_title(f, chunks[0], &board.title);
    render_board(f, chunks[1], board);
    render_info(f, chunks[2], board);
    render_status(f, chunks[3], &board.status);
    render_instructions(f, chunks[4], board.state);
}

fn render_title(f: &mut Frame, area: Rect, title: &str) {
    let title = Paragraph::new(title.to_string())
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

/// Wide tiles (` X `) when the row fits, single-cell tiles otherwise.
fn tile_span(letter: char, (bg, fg): (Color, Color), wide: bool) -> Vec<Span<'static>> {
    let style = Style::default().fg(fg).bg(bg);
    if wide {
        vec![Span::styled(format!(" {letter} "), style), Span::raw(" ")]
    } else {
        vec![Span::styled(letter.to_string(), style)]
    }
}

fn fits_wide(target_len: usize, area: Rect) -> bool {
    target_len * 4 + 2 <= usize::from(area.width)
}

#[allow(clippy::cast_possible_truncation)]
fn render_board(f: &mut Frame, area: Rect, board: &BoardState) {
    let block = Block::default().title("Guesses").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let wide = fits_wide(board.target_len, inner);
    let available_rows = (inner.height / ROW_SPACING) as usize;
    let mut lines: Vec<Vec<Span>> = board
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .flat_map(|cell| tile_span(cell.letter.unwrap_or(' '), tile_colors(cell.status), wide))
                .collect()
        })
        .collect();
    if board.showing_current_input() {
        let typed: Vec<char> = board.current_input.chars().collect();
        lines.push(
            (0..board.target_len)
                .flat_map(|i| tile_span(typed.get(i).copied().unwrap_or(' '), PENDING_COLORS, wide))
                .collect(),
        );
    }

    // Most recent rows win when the board is taller than the panel.
    let skip_count = lines.len().saturating_sub(available_rows);
    for (display_index, spans) in lines.into_iter().skip(skip_count).enumerate() {
        let y = inner.y + (display_index as u16 * ROW_SPACING);
        if y >= inner.y + inner.height {
            break;
        }
        let mut row = vec![Span::raw("  ")];
        row.extend(spans);
        f.render_widget(
            Paragraph::new(Line::from(row)),
            Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: 1,
            },
        );
    }
}

fn render_info(f: &mut Frame, area: Rect, board: &BoardState) {
    let mut lines = Vec::new();

    if board.hint_count > 0 {
        lines.push(Line::from(vec![Span::styled(
            format!("Hints ({}/{}):", board.hints.len(), board.hint_count),
            INFO_STYLE,
        )]));
        for hint in &board.hints {
            lines.push(Line::from(format!("  {hint}")));
        }
        lines.push(Line::from(""));
    }

    if !board.share.is_empty() {
        for line in board.share.lines() {
            lines.push(Line::from(vec![Span::styled(line.to_string(), SUCCESS_STYLE)]));
        }
        lines.push(Line::from(""));
    }

    if !board.message.is_empty() {
        lines.push(Line::from(vec![Span::styled(
            board.message.clone(),
            MESSAGE_STYLE,
        )]));
    }

    if let Some(url) = &board.artwork {
        lines.push(Line::from(vec![
            Span::styled("Artwork: ", INFO_STYLE),
            Span::raw(url.clone()),
        ]));
    }

    if !board.error_message.is_empty() {
        lines.push(Line::from(vec![Span::styled(
            board.error_message.clone(),
            ERROR_STYLE,
        )]));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Information").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_instructions(f: &mut Frame, area: Rect, state: TuiState) {
    let text = match state {
        TuiState::EnteringGuess => "Type your guess | ENTER: Submit | ?: Hint | ESC: Quit",
        TuiState::RoundOver => "N: New Game | ESC: Quit",
    };
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_status(f: &mut Frame, area: Rect, status: &str) {
    let status_text = if status.is_empty() { "Ready" } else { status };
    let paragraph = Paragraph::new(status_text.to_string())
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(paragraph, area);
}

impl GameInterface for TuiInterface {
    fn display_round_start(&mut self, info: &RoundInfo) {
        info_log!("TuiInterface::display_round_start() - {:?}", info.mode);
        self.board.start_round(info);
        self.draw_or_log();
    }

    fn read_action(&mut self) -> Option<UserAction> {
        loop {
            if self.draw().is_err() {
                info_log!("read_action() - Draw failed, returning Exit");
                return Some(UserAction::Exit);
            }
            match self.handle_input() {
                Ok(Some(action)) => {
                    info_log!("read_action() - Action received: {:?}", action);
                    return Some(action);
                }
                Ok(None) => {}
                Err(e) => {
                    info_log!("read_action() - Input error {}, returning Exit", e);
                    return Some(UserAction::Exit);
                }
            }
        }
    }

    fn display_invalid_guess(&mut self, error: &GuessError) {
        self.board.error_message = format!("Invalid guess: {error}");
        self.draw_or_log();
    }

    fn display_attempt(&mut self, round: &Round) {
        self.board.rows = round
            .attempts()
            .iter()
            .map(|attempt| attempt.feedback.clone())
            .collect();
        self.board.status = format!(
            "Attempt {}/{}",
            round.attempts().len(),
            round.max_attempts()
        );
        self.draw_or_log();
    }

    fn display_hint(&mut self, hint: Option<&str>) {
        match hint {
            Some(hint) => self.board.hints.push(hint.to_string()),
            None => self.board.error_message = "No hints left".to_string(),
        }
        self.draw_or_log();
    }

    fn display_round_over(&mut self, summary: &RoundSummary) {
        self.board.finish_round(summary);
        self.draw_or_log();
    }

    fn display_error(&mut self, message: &str) {
        self.board.error_message = message.to_string();
        self.board.status = "Error".to_string();
        self.draw_or_log();
    }

    fn display_exit_message(&mut self) {
        self.board.message = "Exiting...".to_string();
        self.board.status = "Exiting application...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
