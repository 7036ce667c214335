pub mod commands;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::i18n::Locale;
use crate::poller::parse_interval;

#[derive(Parser)]
#[command(name = "tributary")]
#[command(about = "A live RSS aggregator for the terminal", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/tributary/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Interface language (en, ru); overrides the config file
    #[arg(short, long, global = true)]
    pub locale: Option<Locale>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to run; the TUI when none is given.
    pub fn command_or_default(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Tui { urls: Vec::new() })
    }
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum Commands {
    /// Launch the TUI
    Tui {
        /// Feeds to add at startup
        urls: Vec<String>,
    },
    /// Load a feed once and print its posts
    Add {
        /// URL of the feed to add
        url: String,
    },
    /// Follow feeds and print new posts as they appear
    Watch {
        /// URLs of the feeds to follow
        #[arg(required = true)]
        urls: Vec<String>,

        /// Pause between refreshes (e.g., "5s", "2m"); overrides the config file
        #[arg(short, long, value_parser = parse_interval)]
        interval: Option<Duration>,
    },
}
