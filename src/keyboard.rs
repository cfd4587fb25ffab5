use crate::evaluator::{Evaluation, LetterStatus};
use std::collections::BTreeMap;

pub const KEYBOARD_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Best status observed for each letter during the current round.
///
/// Entries only ever move up in precedence: a letter that reached
/// `Correct` stays `Correct`, and `Present` is never overwritten by `Absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardStatusMap {
    letters: BTreeMap<char, LetterStatus>,
}

impl KeyboardStatusMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, letter: char) -> Option<LetterStatus> {
        self.letters.get(&letter.to_ascii_lowercase()).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Fold one evaluated attempt into the map.
    pub fn upgrade(&mut self, guess: &str, evaluation: &Evaluation) {
        for (letter, candidate) in guess.chars().zip(evaluation.statuses()) {
            let letter = letter.to_ascii_lowercase();
            match self.letters.get(&letter) {
                Some(existing) if *existing >= *candidate => {}
                _ => {
                    self.letters.insert(letter, *candidate);
                }
            }
        }
    }

    /// Functional form of [`KeyboardStatusMap::upgrade`].
    #[must_use]
    pub fn upgraded(&self, guess: &str, evaluation: &Evaluation) -> Self {
        let mut next = self.clone();
        next.upgrade(guess, evaluation);
        next
    }

    pub fn clear(&mut self) {
        self.letters.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate;

    fn apply(map: &mut KeyboardStatusMap, guess: &str, target: &str) {
        map.upgrade(guess, &evaluate(guess, target));
    }

    #[test]
    fn test_correct_is_never_downgraded() {
        let mut map = KeyboardStatusMap::new();
        apply(&mut map, "axxxx", "apple");
        assert_eq!(map.get('a'), Some(LetterStatus::Correct));

        apply(&mut map, "baaaa", "apple");
        assert_eq!(map.get('a'), Some(LetterStatus::Correct));
    }

    #[test]
    fn test_present_survives_later_absent() {
        let mut map = KeyboardStatusMap::new();
        apply(&mut map, "lxxxx", "apple");
        assert_eq!(map.get('l'), Some(LetterStatus::Present));

        // Second 'l' is surplus and evaluates absent, the first stays present
        apply(&mut map, "llxxx", "apple");
        assert_eq!(map.get('l'), Some(LetterStatus::Present));
    }

    #[test]
    fn test_absent_upgrades_to_present_then_correct() {
        let mut map = KeyboardStatusMap::new();
        apply(&mut map, "xxxxl", "apple");
        assert_eq!(map.get('x'), Some(LetterStatus::Absent));
        assert_eq!(map.get('l'), Some(LetterStatus::Present));

        apply(&mut map, "xxxlx", "apple");
        assert_eq!(map.get('l'), Some(LetterStatus::Correct));
    }

    #[test]
    fn test_duplicate_letter_takes_best_position() {
        let map = KeyboardStatusMap::new().upgraded("allee", &evaluate("allee", "apple"));
        assert_eq!(map.get('a'), Some(LetterStatus::Correct));
        assert_eq!(map.get('l'), Some(LetterStatus::Present));
        assert_eq!(map.get('e'), Some(LetterStatus::Correct));
        assert_eq!(map.get('z'), None);
    }

    #[test]
    fn test_clear_empties_map() {
        let mut map = KeyboardStatusMap::new();
        apply(&mut map, "crane", "slate");
        assert!(!map.is_empty());
        map.clear();
        assert!(map.is_empty());
    }
}
