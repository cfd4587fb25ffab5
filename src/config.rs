use std::fmt;

pub const MAX_ATTEMPTS: usize = 6;
pub const DEFAULT_FLIP_DELAY_MS: u64 = 300;
pub const MAX_FLIP_DELAY_MS: u64 = 10_000;

/// Supported target word sizes. Anything else normalises to [`WordLength::Five`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WordLength {
    Four,
    #[default]
    Five,
    Six,
}

impl WordLength {
    pub const ALL: [WordLength; 3] = [WordLength::Four, WordLength::Five, WordLength::Six];

    #[must_use]
    pub fn letters(self) -> usize {
        match self {
            Self::Four => 4,
            Self::Five => 5,
            Self::Six => 6,
        }
    }

    #[must_use]
    pub fn from_letters(n: usize) -> Option<Self> {
        match n {
            4 => Some(Self::Four),
            5 => Some(Self::Five),
            6 => Some(Self::Six),
            _ => None,
        }
    }

    /// Lenient conversion used for storage keys and service requests.
    #[must_use]
    pub fn normalize(n: usize) -> Self {
        Self::from_letters(n).unwrap_or_default()
    }

    /// Key under which this length is stored in the statistics file.
    #[must_use]
    pub fn key(self) -> String {
        self.letters().to_string()
    }
}

impl fmt::Display for WordLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letters())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub word_length: WordLength,
    pub max_attempts: usize,
    /// Interval between two tiles flipping during a reveal.
    pub flip_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            word_length: WordLength::default(),
            max_attempts: MAX_ATTEMPTS,
            flip_delay_ms: DEFAULT_FLIP_DELAY_MS,
        }
    }
}

impl GameConfig {
    #[must_use]
    pub fn with_word_length(self, word_length: WordLength) -> Self {
        Self {
            word_length,
            ..self
        }
    }

    /// Time from accepting a guess until its terminal check runs.
    #[must_use]
    pub fn settle_delay_ms(&self) -> u64 {
        self.flip_delay_ms
            .saturating_mul(self.word_length.letters() as u64)
    }
}
