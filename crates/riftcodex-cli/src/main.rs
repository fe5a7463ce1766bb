//! riftcodex - a terminal browser for League of Legends reference data.
//!
//! Champions and summoner spells come from Data Dragon, items from the
//! Meraki mirror. Everything is fetched on demand and kept in memory for
//! the rest of the session.

mod app;
mod utils;

use std::io;
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use riftcodex_core::Config;

// ============================================================================
// Constants
// ============================================================================

/// Log file written in the cache directory
const LOG_FILE: &str = "riftcodex.log";

const USAGE: &str = "\
Usage: riftcodex <command>

Commands:
  champions            List every champion
  champion <name>      Show a champion's lore, abilities and tips
  items [--tag TAG]    List items, optionally only those with TAG
  item <name|id>       Show an item's shop data and build path
  random               Pick a random champion
  spells [mode]        List summoner spells, optionally for one game mode
  modes                List game modes
  browse               Interactive item browser with back/forward history";

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Champions,
    Champion(String),
    Items { tag: Option<String> },
    Item(String),
    Random,
    Spells { mode: Option<String> },
    Modes,
    Browse,
}

impl Command {
    /// Parse arguments after the program name. Multi-word names are joined.
    fn parse(args: &[String]) -> Result<Self, String> {
        let (first, rest) = args
            .split_first()
            .ok_or_else(|| "No command given".to_string())?;
        let joined = || rest.join(" ");

        match first.as_str() {
            "champions" => Ok(Command::Champions),
            "champion" if !rest.is_empty() => Ok(Command::Champion(joined())),
            "champion" => Err("champion needs a name".to_string()),
            "items" => match rest {
                [] => Ok(Command::Items { tag: None }),
                [flag, tag] if flag == "--tag" => Ok(Command::Items {
                    tag: Some(tag.to_uppercase()),
                }),
                _ => Err("items takes only --tag TAG".to_string()),
            },
            "item" if !rest.is_empty() => Ok(Command::Item(joined())),
            "item" => Err("item needs a name or id".to_string()),
            "random" => Ok(Command::Random),
            "spells" => Ok(Command::Spells {
                mode: (!rest.is_empty()).then(joined),
            }),
            "modes" => Ok(Command::Modes),
            "browse" => Ok(Command::Browse),
            other => Err(format!("Unknown command '{}'", other)),
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g. RUST_LOG=riftcodex_core=debug).
/// The returned guard flushes the file writer when dropped.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_writer = log_dir.and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(LOG_FILE)
            .build(dir)
            .ok()
    });
    let (file_layer, guard) = match file_writer {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let log_dir = config.cache_dir().ok();
    let _guard = init_tracing(log_dir.as_deref());
    info!(version = %config.data_version, locale = %config.locale, "riftcodex starting");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
    };

    let mut app = App::new(config)?;
    let result = match command {
        Command::Champions => app.list_champions().await,
        Command::Champion(name) => app.show_champion(&name).await,
        Command::Items { tag } => app.list_items(tag.as_deref()).await,
        Command::Item(name) => app.show_item(&name).await,
        Command::Random => app.random_champion().await,
        Command::Spells { mode } => app.list_spells(mode.as_deref()).await,
        Command::Modes => app.list_modes().await,
        Command::Browse => app.browse().await,
    };

    if let Err(ref e) = result {
        warn!(error = %e, "Command failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(&args("champions")), Ok(Command::Champions));
        assert_eq!(
            Command::parse(&args("champion Miss Fortune")),
            Ok(Command::Champion("Miss Fortune".to_string()))
        );
        assert_eq!(
            Command::parse(&args("items --tag tank")),
            Ok(Command::Items { tag: Some("TANK".to_string()) })
        );
        assert_eq!(Command::parse(&args("items")), Ok(Command::Items { tag: None }));
        assert_eq!(Command::parse(&args("spells")), Ok(Command::Spells { mode: None }));
        assert_eq!(
            Command::parse(&args("spells ARAM")),
            Ok(Command::Spells { mode: Some("ARAM".to_string()) })
        );
        assert_eq!(Command::parse(&args("item 3047")), Ok(Command::Item("3047".to_string())));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse(&[]).is_err());
        assert!(Command::parse(&args("champion")).is_err());
        assert!(Command::parse(&args("items --sort cost")).is_err());
        assert!(Command::parse(&args("dance")).is_err());
    }
}
