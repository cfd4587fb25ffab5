use anyhow::Context;
use nerdle::cli::{parse_cli, run_plain};
use nerdle::info_log;
use nerdle::logging::{default_log_path, init_logging};
use nerdle::service::LocalWordService;
use nerdle::session::Session;
use nerdle::stats::{FileStorage, default_stats_path};
use nerdle::timers::Millis;
use nerdle::tui::{TuiInterface, elapsed_millis};
use nerdle::wordbank::{
    EMBEDDED_WORDBANK, WordPools, load_wordbank_from_file, load_wordbank_from_str,
};
use std::io;
use std::path::PathBuf;
use std::time::Instant;

const FALLBACK_STATS_FILE: &str = "nerdle-stats.json";

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();

    if let Some(path) = cli.log_path.clone().or_else(default_log_path)
        && let Err(e) = init_logging(&path)
    {
        eprintln!("Logging disabled: {e:#}");
    }
    info_log!("nerdle starting with {:?}", cli);

    let targets = load_wordbank_from_str(EMBEDDED_WORDBANK);
    let extra = match &cli.wordbank_path {
        Some(path) => load_wordbank_from_file(path)
            .with_context(|| format!("Failed to load word bank from '{}'", path.display()))?,
        None => WordPools::new(),
    };
    let service = LocalWordService::new(targets).with_dictionary(&extra);

    let stats_path = cli
        .stats_path
        .clone()
        .or_else(default_stats_path)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_STATS_FILE));
    info_log!("Stats file: {}", stats_path.display());
    let storage = FileStorage::new(stats_path);

    let started = Instant::now();
    let clock = move || -> Millis { elapsed_millis(started) };
    let mut session = Session::new(cli.game_config(), service, storage, clock());

    if cli.plain {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        run_plain(&mut session, stdin.lock(), &mut stdout, clock).context("plain mode failed")?;
    } else {
        let mut tui = TuiInterface::new(session, started).context("starting the terminal UI")?;
        tui.run().context("terminal UI failed")?;
        tui.cleanup().context("restoring the terminal")?;
    }
    Ok(())
}
