// Library interface for nerdle
// This allows integration tests to access internal modules

pub mod cli;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod keyboard;
pub mod logging;
pub mod reveal;
pub mod round;
pub mod service;
pub mod session;
pub mod stats;
pub mod timers;
pub mod tui;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use config::{GameConfig, WordLength};
pub use evaluator::{Evaluation, LetterStatus, evaluate};
pub use round::{Phase, Round, SubmitResult};
pub use service::{LocalWordService, WordService};
pub use session::Session;
pub use stats::{FileStorage, MemoryStorage, StatsManager, StatsRecord, StatsStorage};
pub use wordbank::{WordPools, load_wordbank_from_file, load_wordbank_from_str};
