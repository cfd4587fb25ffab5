use std::collections::HashMap;

/// Per-letter result of comparing a guess against the target.
///
/// Variants are declared in precedence order so the derived `Ord` gives
/// `Absent < Present < Correct`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LetterStatus {
    Absent,  // Gray
    Present, // Yellow
    Correct, // Green
}

impl LetterStatus {
    /// Single-character feedback code (G/Y/X) used by the plain front end.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Correct => 'G',
            Self::Present => 'Y',
            Self::Absent => 'X',
        }
    }
}

/// Statuses for every position of one attempt. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation(Vec<LetterStatus>);

impl Evaluation {
    #[must_use]
    pub fn statuses(&self) -> &[LetterStatus] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<LetterStatus> {
        self.0.get(position).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every position is correct.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|s| *s == LetterStatus::Correct)
    }

    /// Feedback string such as `GYXXG`.
    #[must_use]
    pub fn codes(&self) -> String {
        self.0.iter().map(|s| s.code()).collect()
    }
}

/// Evaluate `guess` against `target`.
///
/// Exact matches are credited first and consume one occurrence of their
/// letter; remaining positions are marked present only while unconsumed
/// occurrences are left, so a duplicated guess letter is never credited more
/// often than it appears in the target.
#[must_use]
pub fn evaluate(guess: &str, target: &str) -> Evaluation {
    let guess_chars: Vec<char> = guess.chars().collect();
    let target_chars: Vec<char> = target.chars().collect();
    debug_assert_eq!(guess_chars.len(), target_chars.len());

    let mut remaining: HashMap<char, usize> = HashMap::new();
    for &c in &target_chars {
        *remaining.entry(c).or_insert(0) += 1;
    }

    let mut statuses: Vec<Option<LetterStatus>> = vec![None; guess_chars.len()];

    // First pass: greens
    for (i, &g) in guess_chars.iter().enumerate() {
        if target_chars.get(i) == Some(&g) {
            statuses[i] = Some(LetterStatus::Correct);
            if let Some(count) = remaining.get_mut(&g) {
                *count -= 1;
            }
        }
    }

    // Second pass: yellows from whatever is left in the pool
    for (i, &g) in guess_chars.iter().enumerate() {
        if statuses[i].is_some() {
            continue;
        }
        statuses[i] = match remaining.get_mut(&g) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Some(LetterStatus::Present)
            }
            _ => Some(LetterStatus::Absent),
        };
    }

    Evaluation(
        statuses
            .into_iter()
            .map(|s| s.unwrap_or(LetterStatus::Absent))
            .collect(),
    )
}
