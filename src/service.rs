//! Collaborator contract for target-word supply and dictionary checks,
//! plus an offline implementation backed by [`WordPools`].

use crate::config::WordLength;
use crate::error::ServiceError;
use crate::wordbank::WordPools;
use crate::{debug_log, info_log};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

/// Longest input the validation endpoint accepts.
pub const MAX_VALIDATION_LENGTH: usize = 10;

pub trait WordService {
    /// A random lowercase target word of exactly `length` letters.
    fn random_word(&mut self, length: WordLength) -> Result<String, ServiceError>;

    /// Whether `word` (any case) is an accepted word of its own length.
    fn validate_word(&mut self, word: &str) -> Result<bool, ServiceError>;
}

/// Reject inputs the validation endpoint refuses to look up.
pub fn check_word_format(word: &str) -> Result<String, ServiceError> {
    if word.is_empty() || word.chars().count() > MAX_VALIDATION_LENGTH {
        return Err(ServiceError::Format(format!(
            "must be 1-{MAX_VALIDATION_LENGTH} characters"
        )));
    }
    if !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ServiceError::Format(
            "alphabetic characters only".to_string(),
        ));
    }
    Ok(word.to_lowercase())
}

/// In-process word service.
///
/// Targets are drawn from `targets`; validation accepts anything in
/// `targets` or in the extra dictionary.
#[derive(Debug)]
pub struct LocalWordService {
    targets: WordPools,
    dictionary: WordPools,
    rng: StdRng,
}

impl LocalWordService {
    #[must_use]
    pub fn new(targets: WordPools) -> Self {
        Self::with_rng(targets, StdRng::from_os_rng())
    }

    /// Deterministic target selection.
    #[must_use]
    pub fn with_seed(targets: WordPools, seed: u64) -> Self {
        Self::with_rng(targets, StdRng::seed_from_u64(seed))
    }

    fn with_rng(targets: WordPools, rng: StdRng) -> Self {
        let dictionary = targets.clone();
        Self {
            targets,
            dictionary,
            rng,
        }
    }

    #[must_use]
    pub fn with_dictionary(mut self, extra: &WordPools) -> Self {
        self.dictionary.extend(extra);
        info_log!(
            "LocalWordService - dictionary has {} words",
            self.dictionary.len()
        );
        self
    }
}

impl WordService for LocalWordService {
    fn random_word(&mut self, length: WordLength) -> Result<String, ServiceError> {
        let pool = self.targets.pool(length);
        let word = pool
            .choose(&mut self.rng)
            .ok_or_else(|| ServiceError::Network(format!("no {length}-letter words available")))?;
        debug_log!("random_word({}) - picked a word from {} candidates", length, pool.len());
        Ok((*word).to_string())
    }

    fn validate_word(&mut self, word: &str) -> Result<bool, ServiceError> {
        let normalized = check_word_format(word)?;
        let valid = self.dictionary.contains(&normalized);
        debug_log!("validate_word('{}') - {}", normalized, valid);
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordbank::load_wordbank_from_str;

    fn service() -> LocalWordService {
        LocalWordService::with_seed(load_wordbank_from_str("rust\nbyte\ncache\nstack\nkernel"), 7)
    }

    #[test]
    fn test_random_word_has_requested_length() {
        let mut svc = service();
        for length in WordLength::ALL {
            let word = svc.random_word(length).unwrap();
            assert_eq!(word.len(), length.letters());
        }
    }

    #[test]
    fn test_random_word_is_deterministic_for_seed() {
        let mut a = service();
        let mut b = service();
        for _ in 0..5 {
            assert_eq!(a.random_word(WordLength::Five), b.random_word(WordLength::Five));
        }
    }

    #[test]
    fn test_empty_pool_is_unavailable() {
        let mut svc = LocalWordService::with_seed(load_wordbank_from_str("cache"), 1);
        assert!(matches!(
            svc.random_word(WordLength::Six),
            Err(ServiceError::Network(_))
        ));
    }

    #[test]
    fn test_validate_is_case_insensitive() {
        let mut svc = service();
        assert_eq!(svc.validate_word("CaChE"), Ok(true));
        assert_eq!(svc.validate_word("crane"), Ok(false));
    }

    #[test]
    fn test_validate_rejects_bad_format() {
        let mut svc = service();
        assert!(matches!(svc.validate_word(""), Err(ServiceError::Format(_))));
        assert!(matches!(
            svc.validate_word("abcdefghijk"),
            Err(ServiceError::Format(_))
        ));
        assert!(matches!(svc.validate_word("cr4ne"), Err(ServiceError::Format(_))));
        // Ten letters is fine, just not in the dictionary
        assert_eq!(svc.validate_word("abcdefghij"), Ok(false));
    }

    #[test]
    fn test_extra_dictionary_extends_validation_only() {
        let mut svc = service().with_dictionary(&load_wordbank_from_str("crane"));
        assert_eq!(svc.validate_word("crane"), Ok(true));
        for _ in 0..10 {
            assert_ne!(svc.random_word(WordLength::Five).unwrap(), "crane");
        }
    }
}
