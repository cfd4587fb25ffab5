use crate::config::{GameConfig, WordLength};
use crate::round::{RequestKind, Round, SubmitResult};
use crate::service::WordService;
use crate::stats::{Outcome, StatsManager, StatsRecord, StatsStorage};
use crate::timers::Millis;
use crate::{debug_log, info_log};

/// A finished round together with the statistics it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResult {
    pub outcome: Outcome,
    pub stats: StatsRecord,
}

/// Drives a [`Round`]: executes its service requests and writes each
/// finished round into the statistics store exactly once.
#[derive(Debug)]
pub struct Session<S: WordService, T: StatsStorage> {
    round: Round,
    service: S,
    stats: StatsManager<T>,
    last_result: Option<RecordedResult>,
}

impl<S: WordService, T: StatsStorage> Session<S, T> {
    pub fn new(config: GameConfig, service: S, storage: T, now: Millis) -> Self {
        let mut session = Self {
            round: Round::new(config),
            service,
            stats: StatsManager::new(storage),
            last_result: None,
        };
        session.pump(now);
        session
    }

    #[must_use]
    pub fn round(&self) -> &Round {
        &self.round
    }

    #[must_use]
    pub fn stats_manager(&self) -> &StatsManager<T> {
        &self.stats
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&RecordedResult> {
        self.last_result.as_ref()
    }

    /// Statistics for the word length currently being played.
    pub fn current_stats(&mut self) -> StatsRecord {
        self.stats.read_stats(self.round.word_length())
    }

    pub fn type_letter(&mut self, letter: char) -> bool {
        self.round.type_letter(letter)
    }

    pub fn backspace(&mut self) {
        self.round.backspace();
    }

    pub fn clear_guess(&mut self) {
        self.round.clear_guess();
    }

    pub fn submit(&mut self, now: Millis) -> SubmitResult {
        let result = self.round.submit(now);
        self.pump(now);
        result
    }

    pub fn reject_length(&mut self) -> SubmitResult {
        self.round.reject_length()
    }

    pub fn tick(&mut self, now: Millis) {
        self.round.tick(now);
        self.collect_outcome();
    }

    /// Fire every pending timer regardless of its deadline.
    pub fn settle(&mut self) {
        while let Some(deadline) = self.round.next_deadline() {
            self.round.tick(deadline);
        }
        self.collect_outcome();
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.round.next_deadline()
    }

    pub fn set_word_length(&mut self, word_length: WordLength, now: Millis) {
        info_log!("Session - switching to {} letters", word_length);
        self.round.reconfigure(word_length);
        self.last_result = None;
        self.pump(now);
    }

    pub fn new_round(&mut self, now: Millis) {
        self.round.new_round();
        self.last_result = None;
        self.pump(now);
    }

    fn pump(&mut self, now: Millis) {
        loop {
            let requests = self.round.take_requests();
            if requests.is_empty() {
                break;
            }
            for request in requests {
                match request.kind {
                    RequestKind::RandomWord(length) => {
                        let result = self.service.random_word(length);
                        self.round.on_word_fetched(request.token, result, now);
                    }
                    RequestKind::Validate(word) => {
                        let result = self.service.validate_word(&word);
                        debug_log!("pump() - validation of '{}': {:?}", word, result);
                        self.round.on_validated(request.token, result, now);
                    }
                }
            }
        }
        self.collect_outcome();
    }

    fn collect_outcome(&mut self) {
        if let Some(outcome) = self.round.take_outcome() {
            let stats = self.stats.record_outcome(&outcome);
            self.last_result = Some(RecordedResult { outcome, stats });
        }
    }
}
