//! Durable per-word-length player statistics.
//!
//! On disk the store is JSON:
//!
//! ```text
//! { "version": 2, "byLength": { "4": {...}, "5": {...}, "6": {...} } }
//! ```
//!
//! Files written before word lengths were configurable hold a single bare
//! record. Those are migrated under length 5 the first time they are read and
//! written back immediately in the versioned layout. Unparseable data is
//! replaced by an empty store.

use crate::config::WordLength;
use crate::error::StatsError;
use crate::info_log;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const STATS_VERSION: u32 = 2;
const STATS_DIR: &str = "nerdle";
const STATS_FILE: &str = "stats.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsRecord {
    pub total_games: u32,
    pub wins: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Milliseconds.
    pub fastest_solve_time: Option<u64>,
    pub fewest_guesses: Option<u32>,
}

impl StatsRecord {
    /// Rounded win percentage, 0 when nothing has been played.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn win_rate(&self) -> u32 {
        if self.total_games == 0 {
            return 0;
        }
        (f64::from(self.wins) / f64::from(self.total_games) * 100.0).round() as u32
    }

    /// Field-by-field read of a stored record. Missing, null or mistyped
    /// fields take their empty value; the others are kept.
    fn from_value(value: &Value) -> Self {
        let number = |key: &str| value.get(key).and_then(Value::as_u64);
        let count = |key: &str| number(key).and_then(|n| u32::try_from(n).ok());
        Self {
            total_games: count("totalGames").unwrap_or_default(),
            wins: count("wins").unwrap_or_default(),
            current_streak: count("currentStreak").unwrap_or_default(),
            longest_streak: count("longestStreak").unwrap_or_default(),
            fastest_solve_time: number("fastestSolveTime"),
            fewest_guesses: count("fewestGuesses"),
        }
    }

    fn apply(&mut self, outcome: &Outcome) {
        self.total_games = self.total_games.saturating_add(1);
        if outcome.won {
            self.wins = self.wins.saturating_add(1);
            self.current_streak = self.current_streak.saturating_add(1);
            self.longest_streak = self.longest_streak.max(self.current_streak);
            if let Some(elapsed) = outcome.elapsed_ms {
                self.fastest_solve_time = Some(
                    self.fastest_solve_time
                        .map_or(elapsed, |best| best.min(elapsed)),
                );
            }
            self.fewest_guesses = Some(
                self.fewest_guesses
                    .map_or(outcome.attempts_used, |best| best.min(outcome.attempts_used)),
            );
        } else {
            self.current_streak = 0;
        }
    }
}

/// Result of one finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub won: bool,
    pub attempts_used: u32,
    pub elapsed_ms: Option<u64>,
    pub word_length: WordLength,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsStore {
    pub version: u32,
    pub by_length: BTreeMap<String, StatsRecord>,
}

impl Default for StatsStore {
    fn default() -> Self {
        Self {
            version: STATS_VERSION,
            by_length: WordLength::ALL
                .iter()
                .map(|length| (length.key(), StatsRecord::default()))
                .collect(),
        }
    }
}

/// How a stored document was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOrigin {
    Current,
    /// Bare record from before the versioned layout.
    Legacy,
    Corrupt,
}

impl StoreOrigin {
    /// Whether the interpreted store must be written back right away.
    #[must_use]
    pub fn needs_persist(self) -> bool {
        matches!(self, Self::Legacy | Self::Corrupt)
    }
}

impl StatsStore {
    #[must_use]
    pub fn record(&self, length: WordLength) -> StatsRecord {
        self.by_length
            .get(&length.key())
            .cloned()
            .unwrap_or_default()
    }

    /// Fold an outcome into the record for its word length and return the
    /// updated record.
    pub fn apply(&mut self, outcome: &Outcome) -> StatsRecord {
        let record = self.by_length.entry(outcome.word_length.key()).or_default();
        record.apply(outcome);
        record.clone()
    }

    /// Interpret stored contents, normalising whatever shape they have.
    #[must_use]
    pub fn parse(contents: &str) -> (Self, StoreOrigin) {
        let Ok(value) = serde_json::from_str::<Value>(contents) else {
            return (Self::default(), StoreOrigin::Corrupt);
        };

        if let Some(by_length) = value.get("byLength").and_then(Value::as_object) {
            let mut store = Self::default();
            for length in WordLength::ALL {
                let key = length.key();
                let record = by_length
                    .get(&key)
                    .filter(|v| v.is_object())
                    .map(StatsRecord::from_value)
                    .unwrap_or_default();
                store.by_length.insert(key, record);
            }
            return (store, StoreOrigin::Current);
        }

        if value.get("totalGames").is_some_and(Value::is_number) {
            let mut store = Self::default();
            store
                .by_length
                .insert(WordLength::Five.key(), StatsRecord::from_value(&value));
            return (store, StoreOrigin::Legacy);
        }

        (Self::default(), StoreOrigin::Corrupt)
    }

    pub fn to_json(&self) -> Result<String, StatsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Load/save seam for the serialized store.
pub trait StatsStorage {
    /// Stored contents, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<String>, StatsError>;

    /// Replace the stored contents in a single write.
    fn save(&mut self, contents: &str) -> Result<(), StatsError>;
}

#[must_use]
pub fn default_stats_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(STATS_DIR).join(STATS_FILE))
}

/// JSON file storage. Saves go through a temporary file and a rename.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, StatsError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, contents: &str) -> Result<(), StatsError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory storage, used when no file is wanted and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Option<String>,
    writes: usize,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents<S: Into<String>>(contents: S) -> Self {
        Self {
            contents: Some(contents.into()),
            writes: 0,
        }
    }

    #[must_use]
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of saves performed.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl StatsStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StatsError> {
        Ok(self.contents.clone())
    }

    fn save(&mut self, contents: &str) -> Result<(), StatsError> {
        self.contents = Some(contents.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Reads and updates the statistics store through a [`StatsStorage`].
///
/// Storage failures are logged and never reach the player.
#[derive(Debug)]
pub struct StatsManager<S: StatsStorage> {
    storage: S,
}

impl<S: StatsStorage> StatsManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the whole store, migrating or resetting it if needed.
    pub fn load(&mut self) -> StatsStore {
        let contents = match self.storage.load() {
            Ok(Some(contents)) => contents,
            Ok(None) => return StatsStore::default(),
            Err(e) => {
                warn!("Could not read stats, using empty stats: {e}");
                return StatsStore::default();
            }
        };

        let (store, origin) = StatsStore::parse(&contents);
        match origin {
            StoreOrigin::Legacy => {
                info_log!("Migrating legacy stats record to version {}", STATS_VERSION);
            }
            StoreOrigin::Corrupt => warn!("Stored stats were unreadable, resetting them"),
            StoreOrigin::Current => {}
        }
        if origin.needs_persist() {
            self.persist(&store);
        }
        store
    }

    /// Record for one word length; empty if none was stored yet.
    pub fn read_stats(&mut self, length: WordLength) -> StatsRecord {
        self.load().record(length)
    }

    pub fn record_outcome(&mut self, outcome: &Outcome) -> StatsRecord {
        let mut store = self.load();
        let record = store.apply(outcome);
        self.persist(&store);
        info_log!(
            "Recorded {} for length {}: {:?}",
            if outcome.won { "win" } else { "loss" },
            outcome.word_length,
            record
        );
        record
    }

    fn persist(&mut self, store: &StatsStore) {
        let result = store.to_json().and_then(|json| self.storage.save(&json));
        if let Err(e) = result {
            warn!("Could not save stats: {e}");
        }
    }
}

/// `m:ss`, or `--` when there is no time yet.
#[must_use]
pub fn format_time(ms: Option<u64>) -> String {
    let Some(ms) = ms else {
        return "--".to_string();
    };
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn win(attempts: u32, elapsed: u64) -> Outcome {
        Outcome {
            won: true,
            attempts_used: attempts,
            elapsed_ms: Some(elapsed),
            word_length: WordLength::Five,
        }
    }

    fn loss(length: WordLength) -> Outcome {
        Outcome {
            won: false,
            attempts_used: 6,
            elapsed_ms: None,
            word_length: length,
        }
    }

    #[test]
    fn test_read_from_empty_storage_is_zeroed() {
        let mut manager = StatsManager::new(MemoryStorage::new());
        assert_eq!(manager.read_stats(WordLength::Five), StatsRecord::default());
        assert_eq!(manager.storage().writes(), 0);
    }

    #[test]
    fn test_two_wins_accumulate() {
        let mut manager = StatsManager::new(MemoryStorage::new());
        manager.record_outcome(&win(4, 5000));
        let record = manager.record_outcome(&win(3, 4000));
        assert_eq!(
            record,
            StatsRecord {
                total_games: 2,
                wins: 2,
                current_streak: 2,
                longest_streak: 2,
                fastest_solve_time: Some(4000),
                fewest_guesses: Some(3),
            }
        );
        assert_eq!(manager.read_stats(WordLength::Five), record);
    }

    #[test]
    fn test_loss_resets_streak_only() {
        let mut manager = StatsManager::new(MemoryStorage::new());
        manager.record_outcome(&win(3, 3000));
        let record = manager.record_outcome(&loss(WordLength::Five));
        assert_eq!(record.total_games, 2);
        assert_eq!(record.wins, 1);
        assert_eq!(record.current_streak, 0);
        assert_eq!(record.longest_streak, 1);
        assert_eq!(record.fastest_solve_time, Some(3000));
        assert_eq!(record.fewest_guesses, Some(3));
    }

    #[test]
    fn test_worse_win_keeps_personal_bests() {
        let mut store = StatsStore::default();
        store.by_length.insert(
            "5".to_string(),
            StatsRecord {
                total_games: 10,
                wins: 5,
                current_streak: 0,
                longest_streak: 5,
                fastest_solve_time: Some(3000),
                fewest_guesses: Some(3),
            },
        );
        let updated = store.apply(&win(4, 5000));
        assert_eq!(updated.total_games, 11);
        assert_eq!(updated.wins, 6);
        assert_eq!(updated.current_streak, 1);
        assert_eq!(updated.longest_streak, 5);
        assert_eq!(updated.fastest_solve_time, Some(3000));
        assert_eq!(updated.fewest_guesses, Some(3));
    }

    #[test]
    fn test_lengths_are_independent() {
        let mut manager = StatsManager::new(MemoryStorage::new());
        manager.record_outcome(&win(2, 1000));
        manager.record_outcome(&loss(WordLength::Six));
        assert_eq!(manager.read_stats(WordLength::Five).wins, 1);
        assert_eq!(manager.read_stats(WordLength::Six).total_games, 1);
        assert_eq!(manager.read_stats(WordLength::Six).wins, 0);
        assert_eq!(manager.read_stats(WordLength::Four), StatsRecord::default());
    }

    #[test]
    fn test_legacy_record_migrates_once() {
        let legacy = r#"{"totalGames":2,"wins":1,"currentStreak":1,"longestStreak":1,"fastestSolveTime":3000,"fewestGuesses":4}"#;
        let mut manager = StatsManager::new(MemoryStorage::with_contents(legacy));

        let record = manager.read_stats(WordLength::Five);
        assert_eq!(record.total_games, 2);
        assert_eq!(record.fastest_solve_time, Some(3000));
        assert_eq!(manager.storage().writes(), 1);

        let stored: Value = serde_json::from_str(manager.storage().contents().unwrap()).unwrap();
        assert_eq!(stored["version"], 2);
        assert_eq!(stored["byLength"]["5"]["totalGames"], 2);
        assert_eq!(stored["byLength"]["4"]["totalGames"], 0);
        assert!(stored["byLength"]["6"]["fewestGuesses"].is_null());

        // Already migrated, nothing more to write
        assert_eq!(manager.read_stats(WordLength::Five), record);
        assert_eq!(manager.storage().writes(), 1);
    }

    #[test]
    fn test_corrupt_data_resets_store() {
        let mut manager = StatsManager::new(MemoryStorage::with_contents("{not json"));
        assert_eq!(manager.read_stats(WordLength::Five), StatsRecord::default());
        assert_eq!(manager.storage().writes(), 1);
        let (_, origin) = StatsStore::parse(manager.storage().contents().unwrap());
        assert_eq!(origin, StoreOrigin::Current);
    }

    #[test]
    fn test_unknown_shape_is_corrupt() {
        assert_eq!(StatsStore::parse("[1,2,3]").1, StoreOrigin::Corrupt);
        assert_eq!(StatsStore::parse(r#"{"wins":3}"#).1, StoreOrigin::Corrupt);
        assert_eq!(StatsStore::parse("null").1, StoreOrigin::Corrupt);
    }

    #[test]
    fn test_partial_versioned_store_is_normalized() {
        let contents = r#"{"version":2,"byLength":{"5":{"wins":3,"totalGames":4},"6":7}}"#;
        let (store, origin) = StatsStore::parse(contents);
        assert_eq!(origin, StoreOrigin::Current);
        let five = store.record(WordLength::Five);
        assert_eq!(five.wins, 3);
        assert_eq!(five.total_games, 4);
        assert_eq!(five.fewest_guesses, None);
        assert_eq!(store.record(WordLength::Six), StatsRecord::default());
        assert_eq!(store.record(WordLength::Four), StatsRecord::default());
    }

    #[test]
    fn test_malformed_fields_keep_the_rest_of_the_record() {
        let contents = r#"{"version":2,"byLength":{"5":{"totalGames":40,"wins":30,
            "currentStreak":null,"longestStreak":"nine","fastestSolveTime":51000,
            "fewestGuesses":-2}}}"#;
        let (store, origin) = StatsStore::parse(contents);
        assert_eq!(origin, StoreOrigin::Current);
        let five = store.record(WordLength::Five);
        assert_eq!(five.total_games, 40);
        assert_eq!(five.wins, 30);
        assert_eq!(five.current_streak, 0);
        assert_eq!(five.longest_streak, 0);
        assert_eq!(five.fastest_solve_time, Some(51000));
        assert_eq!(five.fewest_guesses, None);

        let legacy = r#"{"totalGames":12,"wins":"x","currentStreak":3,"fewestGuesses":null}"#;
        let (store, origin) = StatsStore::parse(legacy);
        assert_eq!(origin, StoreOrigin::Legacy);
        let five = store.record(WordLength::Five);
        assert_eq!(five.total_games, 12);
        assert_eq!(five.wins, 0);
        assert_eq!(five.current_streak, 3);
        assert_eq!(five.fewest_guesses, None);
    }

    #[test]
    fn test_counters_saturate_at_maximum() {
        let contents = format!(
            concat!(
                r#"{{"version":2,"byLength":{{"5":{{"#,
                r#""totalGames":{max},"wins":{max},"currentStreak":{max}}}}}}}"#
            ),
            max = u32::MAX
        );
        let mut manager = StatsManager::new(MemoryStorage::with_contents(contents));
        let record = manager.record_outcome(&Outcome {
            won: true,
            attempts_used: 3,
            elapsed_ms: Some(9000),
            word_length: WordLength::Five,
        });
        assert_eq!(record.total_games, u32::MAX);
        assert_eq!(record.wins, u32::MAX);
        assert_eq!(record.current_streak, u32::MAX);
        assert_eq!(record.longest_streak, u32::MAX);
    }

    #[test]
    fn test_serialized_layout_uses_camel_case() {
        let json = StatsStore::default().to_json().unwrap();
        assert!(json.contains("\"byLength\""));
        assert!(json.contains("\"fastestSolveTime\": null"));
        assert!(json.contains("\"version\": 2"));
    }

    #[test]
    fn test_file_storage_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("nerdle_stats_unit_{}", std::process::id()))
            .join("stats.json");
        let _ = fs::remove_file(&path);

        let mut manager = StatsManager::new(FileStorage::new(&path));
        assert_eq!(manager.read_stats(WordLength::Four), StatsRecord::default());
        manager.record_outcome(&Outcome {
            won: true,
            attempts_used: 5,
            elapsed_ms: Some(61_000),
            word_length: WordLength::Four,
        });

        let mut reopened = StatsManager::new(FileStorage::new(&path));
        let record = reopened.read_stats(WordLength::Four);
        assert_eq!(record.wins, 1);
        assert_eq!(record.fewest_guesses, Some(5));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_win_rate_rounds() {
        let record = StatsRecord {
            total_games: 3,
            wins: 2,
            ..StatsRecord::default()
        };
        assert_eq!(record.win_rate(), 67);
        assert_eq!(StatsRecord::default().win_rate(), 0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(None), "--");
        assert_eq!(format_time(Some(65_000)), "1:05");
        assert_eq!(format_time(Some(125_000)), "2:05");
        assert_eq!(format_time(Some(999)), "0:00");
    }
}
