use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::Context;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use pinyin_toolkit::{Config, Toolkit};

/// Reads Chinese text line by line from stdin and prints the reading,
/// colored characters and meanings of each line as tab-separated columns.
fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("load configuration")?;
    info!(
        "using dictionaries at {} (language: {}, mode: {:?})",
        config.dict_dir.display(),
        config.dict_language,
        config.load_mode
    );

    let toolkit = Toolkit::from_config(config).context("build toolkit")?;
    let start = Instant::now();
    let dictionary = toolkit.dictionary();
    info!(
        "{} entries loaded in {} ms",
        dictionary.lexicon().entry_count(),
        start.elapsed().as_millis()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("read stdin")?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let meanings = toolkit.formatted_meanings(text, None)?.unwrap_or_default();
        writeln!(
            stdout,
            "{}\t{}\t{}",
            toolkit.reading(text),
            toolkit.colored_characters(text),
            meanings
        )?;
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();
}
