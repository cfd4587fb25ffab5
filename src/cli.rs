use crate::config::{DEFAULT_FLIP_DELAY_MS, GameConfig, MAX_FLIP_DELAY_MS, WordLength};
use crate::evaluator::LetterStatus;
use crate::keyboard::{KEYBOARD_ROWS, KeyboardStatusMap};
use crate::round::{Attempt, Phase, SubmitResult};
use crate::service::WordService;
use crate::session::Session;
use crate::stats::{StatsRecord, StatsStorage, format_time};
use crate::timers::Millis;
use crate::{debug_log, info_log};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Guess the hidden tech word in six tries
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a newline-delimited dictionary of extra accepted words
    #[arg(short = 'i', long = "input")]
    pub wordbank_path: Option<PathBuf>,

    /// Letters per word
    #[arg(
        short = 'l',
        long = "length",
        default_value_t = 5,
        value_parser = clap::value_parser!(u8).range(4..=6)
    )]
    pub word_length: u8,

    /// Where statistics are stored
    #[arg(long = "stats-file")]
    pub stats_path: Option<PathBuf>,

    /// Where log output is written
    #[arg(long = "log-file")]
    pub log_path: Option<PathBuf>,

    /// Delay between tiles flipping during a reveal, in milliseconds
    #[arg(
        long = "flip-delay-ms",
        default_value_t = DEFAULT_FLIP_DELAY_MS,
        value_parser = clap::value_parser!(u64).range(0..=MAX_FLIP_DELAY_MS)
    )]
    pub flip_delay_ms: u64,

    /// Line-oriented mode instead of the full-screen interface
    #[arg(long)]
    pub plain: bool,
}

impl Cli {
    #[must_use]
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            word_length: WordLength::normalize(usize::from(self.word_length)),
            flip_delay_ms: self.flip_delay_ms,
            ..GameConfig::default()
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// Plain-mode input/output

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlainInput {
    Guess(String),
    Length(WordLength),
    NewGame,
    Stats,
    Exit,
    Invalid(String),
}

#[must_use]
pub fn parse_input(line: &str) -> PlainInput {
    let input = line.trim().to_lowercase();
    match input.as_str() {
        "exit" | ":quit" | ":q" => PlainInput::Exit,
        "next" | ":new" => PlainInput::NewGame,
        ":stats" => PlainInput::Stats,
        ":4" => PlainInput::Length(WordLength::Four),
        ":5" => PlainInput::Length(WordLength::Five),
        ":6" => PlainInput::Length(WordLength::Six),
        "" => PlainInput::Invalid("Type a guess or a command.".to_string()),
        cmd if cmd.starts_with(':') => PlainInput::Invalid(format!("Unknown command '{cmd}'.")),
        word if word.chars().all(|c| c.is_ascii_alphabetic()) => {
            PlainInput::Guess(word.to_string())
        }
        _ => PlainInput::Invalid("Only letters are allowed!".to_string()),
    }
}

fn status_mark(letter: char, status: Option<LetterStatus>) -> String {
    let upper = letter.to_ascii_uppercase();
    match status {
        Some(LetterStatus::Correct) => format!("[{upper}]"),
        Some(LetterStatus::Present) => format!("({upper})"),
        Some(LetterStatus::Absent) => " . ".to_string(),
        None => format!(" {upper} "),
    }
}

pub fn display_attempts<W: Write>(out: &mut W, attempts: &[Attempt]) -> io::Result<()> {
    for (i, attempt) in attempts.iter().enumerate() {
        let tiles: String = attempt
            .word
            .chars()
            .zip(attempt.evaluation.statuses())
            .map(|(c, s)| status_mark(c, Some(*s)))
            .collect();
        writeln!(out, "{}. {}  {}", i + 1, tiles, attempt.evaluation.codes())?;
    }
    Ok(())
}

pub fn display_keyboard<W: Write>(out: &mut W, keyboard: &KeyboardStatusMap) -> io::Result<()> {
    for (indent, row) in KEYBOARD_ROWS.iter().enumerate() {
        let keys: String = row.chars().map(|c| status_mark(c, keyboard.get(c))).collect();
        writeln!(out, "{}{}", " ".repeat(indent), keys)?;
    }
    Ok(())
}

pub fn display_stats<W: Write>(
    out: &mut W,
    length: WordLength,
    stats: &StatsRecord,
) -> io::Result<()> {
    writeln!(out, "Statistics ({length} letters)")?;
    writeln!(
        out,
        "  Played: {}  Win %: {}  Current Streak: {}  Max Streak: {}",
        stats.total_games,
        stats.win_rate(),
        stats.current_streak,
        stats.longest_streak
    )?;
    writeln!(
        out,
        "  Fastest Time: {}  Fewest Guesses: {}",
        format_time(stats.fastest_solve_time),
        stats
            .fewest_guesses
            .map_or_else(|| "--".to_string(), |n| n.to_string())
    )
}

fn display_prompt<W: Write>(out: &mut W, phase: Phase, length: WordLength) -> io::Result<()> {
    match phase {
        Phase::Won | Phase::Lost => writeln!(
            out,
            "\nRound over. ':new' to play again, ':4'/':5'/':6' to change length, ':quit' to exit:"
        ),
        Phase::AwaitingWord | Phase::InProgress => writeln!(
            out,
            "\nEnter a {length}-letter guess (':4'/':5'/':6' length, ':new', ':stats', ':quit'):"
        ),
    }
}

fn display_message<W: Write, S: WordService, T: StatsStorage>(
    out: &mut W,
    session: &Session<S, T>,
) -> io::Result<()> {
    if let Some(message) = session.round().message() {
        writeln!(out, "{}", message.text)?;
    }
    Ok(())
}

/// Line-oriented game loop. Every accepted guess is settled at once, so the
/// reveal and terminal check happen before the next prompt.
pub fn run_plain<R, W, S, T, C>(
    session: &mut Session<S, T>,
    mut reader: R,
    out: &mut W,
    mut clock: C,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    S: WordService,
    T: StatsStorage,
    C: FnMut() -> Millis,
{
    display_message(out, session)?;
    loop {
        let length = session.round().word_length();
        display_prompt(out, session.round().phase(), length)?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            info_log!("run_plain() - end of input");
            break;
        }

        match parse_input(&line) {
            PlainInput::Exit => {
                writeln!(out, "Exiting.")?;
                break;
            }
            PlainInput::NewGame => {
                session.new_round(clock());
                writeln!(out, "New {length}-letter game started.")?;
                display_message(out, session)?;
            }
            PlainInput::Length(new_length) => {
                session.set_word_length(new_length, clock());
                writeln!(out, "New {new_length}-letter game started.")?;
                display_message(out, session)?;
            }
            PlainInput::Stats => {
                let stats = session.current_stats();
                display_stats(out, length, &stats)?;
            }
            PlainInput::Invalid(reason) => {
                writeln!(out, "{reason}")?;
            }
            PlainInput::Guess(word) => {
                debug_log!("run_plain() - guess '{}'", word);
                session.clear_guess();
                for c in word.chars() {
                    session.type_letter(c);
                }
                // Letters beyond the word length are dropped by the round,
                // so over-long input is checked here.
                let result = if word.len() > length.letters() {
                    session.reject_length()
                } else {
                    session.submit(clock())
                };
                session.settle();

                if result == SubmitResult::Ignored {
                    writeln!(out, "No guesses accepted right now.")?;
                    continue;
                }
                display_attempts(out, session.round().attempts())?;
                display_keyboard(out, session.round().keyboard())?;
                display_message(out, session)?;
                if let Some(result) = session.last_result() {
                    display_stats(out, result.outcome.word_length, &result.stats)?;
                }
            }
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate;

    #[test]
    fn test_parse_cli_defaults() {
        let cli = Cli::parse_from(["nerdle"]);
        assert_eq!(cli.wordbank_path, None);
        assert_eq!(cli.word_length, 5);
        assert!(!cli.plain);
        assert_eq!(cli.game_config(), GameConfig::default());
    }

    #[test]
    fn test_parse_cli_with_options() {
        let cli = Cli::parse_from([
            "nerdle",
            "-i",
            "words.txt",
            "--length",
            "6",
            "--flip-delay-ms",
            "0",
            "--plain",
        ]);
        assert_eq!(cli.wordbank_path, Some(PathBuf::from("words.txt")));
        let config = cli.game_config();
        assert_eq!(config.word_length, WordLength::Six);
        assert_eq!(config.flip_delay_ms, 0);
        assert!(cli.plain);
    }

    #[test]
    fn test_parse_cli_rejects_unsupported_length() {
        assert!(Cli::try_parse_from(["nerdle", "--length", "7"]).is_err());
        assert!(Cli::try_parse_from(["nerdle", "-l", "3"]).is_err());
    }

    #[test]
    fn test_parse_cli_bounds_flip_delay() {
        assert!(Cli::try_parse_from(["nerdle", "--flip-delay-ms", "10000"]).is_ok());
        assert!(Cli::try_parse_from(["nerdle", "--flip-delay-ms", "10001"]).is_err());
    }

    #[test]
    fn test_parse_input_commands() {
        assert_eq!(parse_input("exit\n"), PlainInput::Exit);
        assert_eq!(parse_input(":QUIT"), PlainInput::Exit);
        assert_eq!(parse_input("next"), PlainInput::NewGame);
        assert_eq!(parse_input(":stats"), PlainInput::Stats);
        assert_eq!(parse_input(" :6 "), PlainInput::Length(WordLength::Six));
        assert!(matches!(parse_input(":7"), PlainInput::Invalid(_)));
    }

    #[test]
    fn test_parse_input_guesses() {
        assert_eq!(parse_input("  CRANE  "), PlainInput::Guess("crane".to_string()));
        assert_eq!(parse_input("ab"), PlainInput::Guess("ab".to_string()));
        assert!(matches!(parse_input("cr4ne"), PlainInput::Invalid(_)));
        assert!(matches!(parse_input(""), PlainInput::Invalid(_)));
    }

    #[test]
    fn test_display_attempts_marks_statuses() {
        let attempts = vec![Attempt {
            word: "allee".to_string(),
            evaluation: evaluate("allee", "apple"),
        }];
        let mut out = Vec::new();
        display_attempts(&mut out, &attempts).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "1. [A](L) .  . [E]  GYXXG\n");
    }

    #[test]
    fn test_display_stats_formats_bests() {
        let stats = StatsRecord {
            total_games: 4,
            wins: 3,
            current_streak: 2,
            longest_streak: 3,
            fastest_solve_time: Some(65_000),
            fewest_guesses: None,
        };
        let mut out = Vec::new();
        display_stats(&mut out, WordLength::Five, &stats).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Played: 4  Win %: 75"));
        assert!(text.contains("Fastest Time: 1:05  Fewest Guesses: --"));
    }
}
