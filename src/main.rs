use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tributary::app::AppContext;
use tributary::cli::{commands, Cli, Commands};
use tributary::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command_or_default();

    init_tracing(matches!(command, Commands::Tui { .. }))?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    if let Commands::Watch {
        interval: Some(interval),
        ..
    } = &command
    {
        config.poller.interval = *interval;
    }

    let ctx = Arc::new(AppContext::new(&config)?);

    match command {
        Commands::Add { url } => {
            commands::add_feed(&ctx, &url).await?;
        }
        Commands::Watch { urls, .. } => {
            commands::watch_feeds(&ctx, &urls).await?;
        }
        Commands::Tui { urls } => {
            tributary::tui::run(ctx, Arc::new(config), urls).await?;
        }
    }

    Ok(())
}

/// Log to stderr, or to a file in the cache directory while the TUI owns the
/// terminal. `RUST_LOG` sets the level; the default is `info`.
fn init_tracing(to_file: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if to_file {
        let dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?
            .join("tributary");
        fs::create_dir_all(&dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("tributary.log"))?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    Ok(())
}
