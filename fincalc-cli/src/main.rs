use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fincalc_cli::cli::Cli;
use fincalc_cli::commands;
use fincalc_cli::config::{AppConfig, Settings};
use fincalc_core::RateBook;

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to the configured level.
/// * Logs to stderr so stdout carries only the report.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── rate book ───────────────────────────────────────────────────────────────

enum Book {
    Embedded(&'static RateBook),
    Loaded(RateBook),
}

impl Book {
    fn get(&self) -> &RateBook {
        match self {
            Self::Embedded(book) => book,
            Self::Loaded(book) => book,
        }
    }
}

fn load_book(settings: &Settings) -> anyhow::Result<Book> {
    match &settings.data_dir {
        Some(dir) => {
            let book = fincalc_data::load_dir(dir)
                .with_context(|| format!("failed to load rate data from {}", dir.display()))?;
            Ok(Book::Loaded(book))
        }
        None => {
            debug!("using embedded rate data");
            let book = fincalc_data::builtin().context("embedded rate data is invalid")?;
            Ok(Book::Embedded(book))
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = AppConfig::locate(cli.config.as_deref());
    let config = AppConfig::load(config_path.as_deref())?;
    init_tracing(config.log_level());
    if let Some(path) = &config_path {
        debug!(path = %path.display(), "loaded config");
    }

    let settings = Settings::resolve(&config, cli.year, cli.data_dir.clone(), cli.json);
    let book = load_book(&settings)?;
    let year = commands::resolve_year(book.get(), settings.year)?;
    debug!(year, "tax year");

    let report = commands::run(&cli.command, book.get(), year)?;
    println!("{}", report.render(settings.json)?);

    Ok(())
}
