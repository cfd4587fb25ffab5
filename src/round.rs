//! Round state machine.
//!
//! `AwaitingWord -> InProgress -> Won | Lost`
//!
//! The round never talks to the word service itself. It queues [`Request`]s
//! that the driver executes and answers through [`Round::on_word_fetched`]
//! and [`Round::on_validated`]. Answers carry the token of the request they
//! belong to; anything not matching the request currently awaited (including
//! every answer issued before a reset) is dropped. Timers work the same way
//! through the round generation.

use crate::config::{GameConfig, WordLength};
use crate::debug_log;
use crate::error::ServiceError;
use crate::evaluator::{Evaluation, evaluate};
use crate::info_log;
use crate::keyboard::KeyboardStatusMap;
use crate::reveal::{RevealSequencer, RevealStep};
use crate::stats::Outcome;
use crate::timers::{Millis, TimerQueue};
use log::warn;

pub const MSG_FETCH_FAILED: &str = "Failed to fetch the word. Please try again later.";
pub const MSG_INVALID_WORD: &str = "Invalid word. Try again.";
pub const MSG_VALIDATION_FAILED: &str = "Error validating the word. Please try again.";
pub const MSG_WON: &str = "Congratulations! You've guessed the word.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingWord,
    InProgress,
    Won,
    Lost,
}

impl Phase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    generation: u64,
    seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    RandomWord(WordLength),
    Validate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub token: RequestToken,
    pub kind: RequestKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Feedback on the last submission, cleared once the next reveal settles.
    Notice,
    /// Service failure, stays until replaced.
    Error,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub word: String,
    pub evaluation: Evaluation,
}

/// Immediate result of pressing submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitResult {
    /// Round not accepting guesses right now.
    Ignored,
    WrongLength,
    /// Sent for validation.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundTimer {
    RevealStep { row: usize },
    Settle { row: usize },
}

/// Terminal result decided when a guess is accepted, applied when its
/// reveal settles.
#[derive(Debug, Clone, Copy)]
struct PendingEnding {
    row: usize,
    won: bool,
    elapsed_ms: Option<u64>,
}

#[derive(Debug)]
pub struct Round {
    config: GameConfig,
    generation: u64,
    next_seq: u64,
    phase: Phase,
    target: Option<String>,
    attempts: Vec<Attempt>,
    current_guess: String,
    keyboard: KeyboardStatusMap,
    reveal: RevealSequencer,
    timers: TimerQueue<RoundTimer>,
    message: Option<Message>,
    started_at: Option<Millis>,
    word_request: Option<RequestToken>,
    validation: Option<(RequestToken, String)>,
    ending: Option<PendingEnding>,
    requests: Vec<Request>,
    outcome: Option<Outcome>,
}

impl Round {
    /// Create a round and queue the request for its target word.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let mut round = Self {
            config,
            generation: 0,
            next_seq: 0,
            phase: Phase::AwaitingWord,
            target: None,
            attempts: Vec::new(),
            current_guess: String::new(),
            keyboard: KeyboardStatusMap::new(),
            reveal: RevealSequencer::new(),
            timers: TimerQueue::new(),
            message: None,
            started_at: None,
            word_request: None,
            validation: None,
            ending: None,
            requests: Vec::new(),
            outcome: None,
        };
        round.request_word();
        round
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn word_length(&self) -> WordLength {
        self.config.word_length
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    #[must_use]
    pub fn current_guess(&self) -> &str {
        &self.current_guess
    }

    #[must_use]
    pub fn keyboard(&self) -> &KeyboardStatusMap {
        &self.keyboard
    }

    #[must_use]
    pub fn reveal(&self) -> &RevealSequencer {
        &self.reveal
    }

    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// The target word, disclosed only once the round is over.
    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        if self.phase.is_terminal() {
            self.target.as_deref()
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_validating(&self) -> bool {
        self.validation.is_some()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    /// Drain the service requests queued since the last call.
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    /// The result of the round that just ended, handed out exactly once.
    pub fn take_outcome(&mut self) -> Option<Outcome> {
        self.outcome.take()
    }

    fn input_locked(&self) -> bool {
        self.phase.is_terminal() || self.validation.is_some()
    }

    pub fn type_letter(&mut self, letter: char) -> bool {
        if self.input_locked()
            || !letter.is_ascii_alphabetic()
            || self.current_guess.len() >= self.config.word_length.letters()
        {
            return false;
        }
        self.current_guess.push(letter.to_ascii_lowercase());
        debug_log!("type_letter() - guess now '{}'", self.current_guess);
        true
    }

    pub fn backspace(&mut self) {
        if !self.input_locked() {
            self.current_guess.pop();
        }
    }

    pub fn clear_guess(&mut self) {
        if self.validation.is_none() {
            self.current_guess.clear();
        }
    }

    fn accepts_submission(&self) -> bool {
        self.phase == Phase::InProgress && self.ending.is_none() && self.validation.is_none()
    }

    pub fn submit(&mut self, _now: Millis) -> SubmitResult {
        if self.current_guess.len() != self.config.word_length.letters() {
            return self.reject_length();
        }
        if !self.accepts_submission() {
            debug_log!("submit() - ignored in phase {:?}", self.phase);
            return SubmitResult::Ignored;
        }

        let guess = self.current_guess.clone();
        let token = self.next_token();
        self.validation = Some((token, guess.clone()));
        self.requests.push(Request {
            token,
            kind: RequestKind::Validate(guess),
        });
        SubmitResult::Pending
    }

    /// Refuse a guess of the wrong length without contacting the service.
    /// Used directly by front ends that see input longer than the round
    /// lets the player type.
    pub fn reject_length(&mut self) -> SubmitResult {
        if !self.accepts_submission() {
            debug_log!("reject_length() - ignored in phase {:?}", self.phase);
            return SubmitResult::Ignored;
        }
        let letters = self.config.word_length.letters();
        self.message = Some(Message::new(
            MessageKind::Notice,
            format!("Guess must be {letters} letters."),
        ));
        SubmitResult::WrongLength
    }

    pub fn on_word_fetched(
        &mut self,
        token: RequestToken,
        result: Result<String, ServiceError>,
        now: Millis,
    ) {
        if self.word_request != Some(token) {
            debug_log!("on_word_fetched() - dropping stale response {:?}", token);
            return;
        }
        self.word_request = None;

        let letters = self.config.word_length.letters();
        let result = result.and_then(|word| {
            let word = word.trim().to_lowercase();
            if word.len() == letters && word.chars().all(|c| c.is_ascii_alphabetic()) {
                Ok(word)
            } else {
                Err(ServiceError::Format(format!(
                    "expected a {letters}-letter word, got '{word}'"
                )))
            }
        });

        match result {
            Ok(word) => {
                info_log!("Round {} started", self.generation);
                self.target = Some(word);
                self.phase = Phase::InProgress;
                self.started_at = Some(now);
                self.message = None;
            }
            Err(e) => {
                warn!("Fetching target word failed: {e}");
                self.message = Some(Message::new(MessageKind::Error, MSG_FETCH_FAILED));
            }
        }
    }

    pub fn on_validated(
        &mut self,
        token: RequestToken,
        result: Result<bool, ServiceError>,
        now: Millis,
    ) {
        let guess = match self.validation.take() {
            Some((pending, guess)) if pending == token => guess,
            other => {
                self.validation = other;
                debug_log!("on_validated() - dropping stale response {:?}", token);
                return;
            }
        };

        match result {
            Ok(true) => self.accept(guess, now),
            Ok(false) | Err(ServiceError::Format(_)) => {
                self.message = Some(Message::new(MessageKind::Notice, MSG_INVALID_WORD));
            }
            Err(e @ ServiceError::Network(_)) => {
                warn!("Validating guess failed: {e}");
                self.message = Some(Message::new(MessageKind::Error, MSG_VALIDATION_FAILED));
            }
        }
    }

    fn accept(&mut self, guess: String, now: Millis) {
        let Some(target) = self.target.as_deref() else {
            return;
        };
        let evaluation = evaluate(&guess, target);
        let solved = guess == target;
        info_log!(
            "Attempt {} accepted: {}",
            self.attempts.len() + 1,
            evaluation.codes()
        );

        let (row, interrupted) = self.reveal.begin(evaluation.clone());
        if let Some(previous) = interrupted {
            self.commit_row(previous);
        }
        self.attempts.push(Attempt {
            word: guess,
            evaluation,
        });
        self.current_guess.clear();

        let delay = self.config.flip_delay_ms;
        for i in 0..self.config.word_length.letters() as u64 {
            let due = now.saturating_add(i.saturating_mul(delay));
            self.timers
                .schedule(due, self.generation, RoundTimer::RevealStep { row });
        }
        self.timers.schedule(
            now.saturating_add(self.config.settle_delay_ms()),
            self.generation,
            RoundTimer::Settle { row },
        );

        // Win is checked first: both can hold on the last attempt.
        if solved {
            self.ending = Some(PendingEnding {
                row,
                won: true,
                elapsed_ms: self.started_at.map(|start| now.saturating_sub(start)),
            });
        } else if self.attempts.len() >= self.config.max_attempts {
            self.ending = Some(PendingEnding {
                row,
                won: false,
                elapsed_ms: None,
            });
        }
    }

    /// Fire every timer due at `now`.
    pub fn tick(&mut self, now: Millis) {
        while let Some(timer) = self.timers.pop_due(now) {
            if timer.generation != self.generation {
                debug_log!("tick() - dropping timer from generation {}", timer.generation);
                continue;
            }
            match timer.payload {
                RoundTimer::RevealStep { row } => {
                    if self.reveal.advance(row) == RevealStep::Completed {
                        self.commit_row(row);
                    }
                }
                RoundTimer::Settle { row } => self.settle(row),
            }
        }
    }

    fn commit_row(&mut self, row: usize) {
        if let Some(attempt) = self.attempts.get(row) {
            self.keyboard.upgrade(&attempt.word, &attempt.evaluation);
            debug_log!("commit_row() - row {} persisted", row);
        }
    }

    fn settle(&mut self, row: usize) {
        match self.ending {
            Some(ending) if ending.row == row => self.finish(ending),
            Some(_) => {}
            None => {
                if self
                    .message
                    .as_ref()
                    .is_some_and(|m| m.kind == MessageKind::Notice)
                {
                    self.message = None;
                }
            }
        }
    }

    fn finish(&mut self, ending: PendingEnding) {
        self.ending = None;
        let answer = self.target.clone().unwrap_or_default();
        let (phase, message, attempts_used) = if ending.won {
            (
                Phase::Won,
                Message::new(MessageKind::Victory, MSG_WON),
                self.attempts.len(),
            )
        } else {
            (
                Phase::Lost,
                Message::new(MessageKind::Defeat, format!("Game over! The word was {answer}.")),
                self.config.max_attempts,
            )
        };
        info_log!("Round {} finished: {:?}", self.generation, phase);
        self.phase = phase;
        self.message = Some(message);
        self.outcome = Some(Outcome {
            won: ending.won,
            attempts_used: u32::try_from(attempts_used).unwrap_or(u32::MAX),
            elapsed_ms: ending.elapsed_ms,
            word_length: self.config.word_length,
        });
    }

    /// Switch word length. Always starts a fresh round.
    pub fn reconfigure(&mut self, word_length: WordLength) {
        self.config = self.config.with_word_length(word_length);
        self.reset();
    }

    /// Whether starting over is the natural next step: the round has ended,
    /// or its target word could not be fetched.
    #[must_use]
    pub fn can_restart(&self) -> bool {
        self.phase.is_terminal()
            || (self.phase == Phase::AwaitingWord && self.word_request.is_none())
    }

    /// Abandon the current round and request a new target.
    pub fn new_round(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.timers.clear();
        self.requests.clear();
        self.phase = Phase::AwaitingWord;
        self.target = None;
        self.attempts.clear();
        self.current_guess.clear();
        self.keyboard.clear();
        self.reveal.reset();
        self.message = None;
        self.started_at = None;
        self.validation = None;
        self.ending = None;
        info_log!(
            "Round reset to generation {} ({} letters)",
            self.generation,
            self.config.word_length
        );
        self.request_word();
    }

    fn request_word(&mut self) {
        let token = self.next_token();
        self.word_request = Some(token);
        self.requests.push(Request {
            token,
            kind: RequestKind::RandomWord(self.config.word_length),
        });
    }

    fn next_token(&mut self) -> RequestToken {
        let seq = self.next_seq;
        self.next_seq += 1;
        RequestToken {
            generation: self.generation,
            seq,
        }
    }
}
