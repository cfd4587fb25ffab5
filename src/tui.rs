//! TUI (Terminal User Interface) front end
//!
//! Full-screen game using Ratatui. The event loop wakes up either on a key
//! press or when the next round timer is due, so reveal animations advance
//! without input.
//!
//! # Keys
//! - letters / BACKSPACE / ENTER: edit and submit the guess
//! - `4` `5` `6`: switch word length (starts a new round)
//! - TAB: toggle the statistics panel
//! - ENTER after the round ends: new round
//! - ESC: quit

use crate::config::WordLength;
use crate::evaluator::LetterStatus;
use crate::keyboard::{KEYBOARD_ROWS, KeyboardStatusMap};
use crate::reveal::TileView;
use crate::round::{MessageKind, Phase, Round};
use crate::service::WordService;
use crate::session::Session;
use crate::stats::{StatsRecord, StatsStorage, format_time};
use crate::timers::Millis;
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::io;
use std::time::{Duration, Instant};

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ROW_SPACING: u16 = 2;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;

const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

/// Background and foreground for a tile or key.
fn status_colors(status: Option<LetterStatus>) -> (Color, Color) {
    match status {
        None => (Color::DarkGray, Color::White),
        Some(LetterStatus::Correct) => (Color::Green, Color::Black),
        Some(LetterStatus::Present) => (Color::Yellow, Color::Black),
        Some(LetterStatus::Absent) => (Color::Gray, Color::White),
    }
}

fn tile_style(view: TileView) -> Style {
    match view {
        TileView::Hidden => {
            let (bg, fg) = status_colors(None);
            Style::default().fg(fg).bg(bg)
        }
        TileView::Flipping(status) => {
            let (bg, fg) = status_colors(Some(status));
            Style::default()
                .fg(fg)
                .bg(bg)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC)
        }
        TileView::Final(status) => {
            let (bg, fg) = status_colors(Some(status));
            Style::default().fg(fg).bg(bg)
        }
    }
}

/// Milliseconds since `started`, the clock every round timer runs on.
#[must_use]
pub fn elapsed_millis(started: Instant) -> Millis {
    Millis::try_from(started.elapsed().as_millis()).unwrap_or(Millis::MAX)
}

fn instructions(round: &Round) -> &'static str {
    if round.phase().is_terminal() {
        "ENTER: New game | 4/5/6: New game with that length | TAB: Stats | ESC: Quit"
    } else if round.can_restart() {
        "ENTER: Retry | 4/5/6: New game with that length | TAB: Stats | ESC: Quit"
    } else {
        "Type a guess | ENTER: Submit | 4/5/6: New game with that length | TAB: Stats | ESC: Quit"
    }
}

/// Everything the renderer needs, borrowed for one frame.
struct RenderContext<'a> {
    round: &'a Round,
    stats: Option<&'a StatsRecord>,
    input_error: &'a str,
}

pub struct TuiInterface<S: WordService, T: StatsStorage> {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    session: Session<S, T>,
    started: Instant,
    /// Shown in the side panel while `Some`.
    stats: Option<StatsRecord>,
    result_shown: bool,
    input_error: String,
    should_quit: bool,
}

impl<S: WordService, T: StatsStorage> TuiInterface<S, T> {
    pub fn new(session: Session<S, T>, started: Instant) -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete");

        Ok(Self {
            terminal,
            session,
            started,
            stats: None,
            result_shown: false,
            input_error: String::new(),
            should_quit: false,
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

    fn now(&self) -> Millis {
        elapsed_millis(self.started)
    }

    /// Main loop: fire due timers, draw, wait for input or the next timer.
    pub fn run(&mut self) -> Result<(), io::Error> {
        while !self.should_quit {
            let now = self.now();
            self.session.tick(now);
            self.refresh_finished_stats();
            self.draw()?;

            let wait = self
                .session
                .next_deadline()
                .map_or(EVENT_POLL_TIMEOUT_MS, |due| {
                    due.saturating_sub(now).min(EVENT_POLL_TIMEOUT_MS)
                });
            if event::poll(Duration::from_millis(wait))? {
                self.handle_event(event::read()?);
            }
        }
        info_log!("TuiInterface::run() - quitting");
        Ok(())
    }

    /// Open the stats panel with the freshly recorded record when a round ends.
    fn refresh_finished_stats(&mut self) {
        match self.session.last_result() {
            Some(result) if !self.result_shown => {
                self.stats = Some(result.stats.clone());
                self.result_shown = true;
            }
            Some(_) => {}
            None => self.result_shown = false,
        }
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let ctx = RenderContext {
            round: self.session.round(),
            stats: self.stats.as_ref(),
            input_error: &self.input_error,
        };
        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let max_rows = ctx.round.config().max_attempts as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                         // Title
                Constraint::Length(max_rows * ROW_SPACING + 2), // Board
                Constraint::Length(3),                         // Message
                Constraint::Length(5),                         // Keyboard
                Constraint::Min(0),                            // Statistics
                Constraint::Length(3),                         // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0], ctx.round.word_length());
        Self::render_board(f, chunks[1], ctx.round);
        Self::render_message(f, chunks[2], ctx.round, ctx.input_error);
        Self::render_keyboard(f, chunks[3], ctx.round.keyboard());
        if let Some(stats) = ctx.stats {
            Self::render_stats(f, chunks[4], ctx.round.word_length(), stats);
        }
        Self::render_instructions(f, chunks[5], ctx.round);
    }

    fn render_title(f: &mut Frame, area: Rect, length: WordLength) {
        let title = Paragraph::new(format!("NERDLE  ({length} letters)"))
            .style(HEADER_STYLE)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_board(f: &mut Frame, area: Rect, round: &Round) {
        let block = Block::default().title("Guesses").borders(Borders::ALL);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let letters = round.word_length().letters();
        let attempts = round.attempts();
        let show_input = !round.phase().is_terminal();

        for row in 0..round.config().max_attempts {
            let mut spans = vec![Span::raw("  ")];
            for pos in 0..letters {
                let (letter, style) = if let Some(attempt) = attempts.get(row) {
                    let letter = attempt.word.chars().nth(pos).unwrap_or(' ');
                    (letter, tile_style(round.reveal().tile(row, pos)))
                } else if row == attempts.len() && show_input {
                    let letter = round.current_guess().chars().nth(pos).unwrap_or(' ');
                    (letter, tile_style(TileView::Hidden))
                } else {
                    (' ', tile_style(TileView::Hidden))
                };
                spans.push(Span::styled(
                    format!(" {} ", letter.to_ascii_uppercase()),
                    style,
                ));
                spans.push(Span::raw(" "));
            }
            Self::render_line(f, inner, row, spans);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_line(f: &mut Frame, area: Rect, row_index: usize, spans: Vec<Span>) {
        let y = area.y + (row_index as u16 * ROW_SPACING);
        if y >= area.y + area.height {
            return;
        }
        f.render_widget(
            Paragraph::new(Line::from(spans)),
            Rect {
                x: area.x,
                y,
                width: area.width,
                height: 1,
            },
        );
    }

    fn render_message(f: &mut Frame, area: Rect, round: &Round, input_error: &str) {
        let line = if !input_error.is_empty() {
            Line::from(Span::styled(input_error, ERROR_STYLE))
        } else if let Some(message) = round.message() {
            let style = match message.kind {
                MessageKind::Notice => INFO_STYLE,
                MessageKind::Error | MessageKind::Defeat => ERROR_STYLE,
                MessageKind::Victory => SUCCESS_STYLE,
            };
            Line::from(Span::styled(message.text.as_str(), style))
        } else if round.phase() == Phase::AwaitingWord {
            Line::from(Span::styled("Fetching a word...", MESSAGE_STYLE))
        } else {
            Line::from("")
        };
        let paragraph = Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_keyboard(f: &mut Frame, area: Rect, keyboard: &KeyboardStatusMap) {
        let lines: Vec<Line> = KEYBOARD_ROWS
            .iter()
            .map(|row| {
                let spans: Vec<Span> = row
                    .chars()
                    .flat_map(|c| {
                        let (bg, fg) = status_colors(keyboard.get(c));
                        [
                            Span::styled(
                                format!(" {} ", c.to_ascii_uppercase()),
                                Style::default().fg(fg).bg(bg),
                            ),
                            Span::raw(" "),
                        ]
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_stats(f: &mut Frame, area: Rect, length: WordLength, stats: &StatsRecord) {
        let fewest = stats
            .fewest_guesses
            .map_or_else(|| "--".to_string(), |n| n.to_string());
        let lines = vec![
            Line::from(format!(
                "Played {}   Win % {}   Current Streak {}   Max Streak {}",
                stats.total_games,
                stats.win_rate(),
                stats.current_streak,
                stats.longest_streak
            )),
            Line::from(format!(
                "Fastest Time {}   Fewest Guesses {}",
                format_time(stats.fastest_solve_time),
                fewest
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(format!("Statistics ({length} letters)"))
                    .borders(Borders::ALL),
            );
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, round: &Round) {
        let paragraph = Paragraph::new(instructions(round))
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            debug_log!("handle_event() - Ignoring non-key event: {:?}", event);
            return;
        };
        // Only process Press events, ignore Release and Repeat to avoid double input
        if key.kind != KeyEventKind::Press {
            return;
        }
        // Terminal focus changes can leak replacement and control characters
        if let KeyCode::Char(c) = key.code
            && (c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD)
        {
            debug_log!("handle_event() - Ignoring invalid character: {:?}", c);
            return;
        }
        self.handle_key(key);
    }

    fn has_modifier_keys(key: &KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.input_error.clear();
        let now = self.now();
        debug_log!("handle_key() - {:?} ({:?})", key.code, key.modifiers);

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            _ if Self::has_modifier_keys(&key) => {}
            KeyCode::Tab => {
                self.stats = match self.stats {
                    Some(_) => None,
                    None => Some(self.session.current_stats()),
                };
            }
            KeyCode::Char(c @ '4'..='6') => {
                let length = c
                    .to_digit(10)
                    .and_then(|d| WordLength::from_letters(d as usize));
                if let Some(length) = length {
                    self.session.set_word_length(length, now);
                    self.stats = None;
                }
            }
            KeyCode::Char(c) if c.is_ascii_alphabetic() => {
                self.session.type_letter(c);
            }
            KeyCode::Char(c) => {
                self.input_error = format!("Only letters are allowed! ('{c}' is not a letter)");
            }
            KeyCode::Backspace => self.session.backspace(),
            KeyCode::Enter if self.session.round().can_restart() => {
                self.session.new_round(now);
                self.stats = None;
            }
            KeyCode::Enter => {
                self.session.submit(now);
            }
            _ => {}
        }
    }
}

impl<S: WordService, T: StatsStorage> Drop for TuiInterface<S, T> {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::error::ServiceError;

    #[test]
    fn test_instructions_offer_retry_after_fetch_failure() {
        let mut round = Round::new(GameConfig::default());
        assert!(instructions(&round).starts_with("Type a guess"));

        let request = round.take_requests().pop().unwrap();
        round.on_word_fetched(request.token, Err(ServiceError::Network("down".into())), 0);
        assert!(instructions(&round).starts_with("ENTER: Retry"));
        assert!(instructions(&round).contains("4/5/6: New game with that length"));
    }

    #[test]
    fn test_elapsed_millis_is_monotonic() {
        let started = Instant::now();
        let first = elapsed_millis(started);
        assert!(elapsed_millis(started) >= first);
    }
}
