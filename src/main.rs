//! # Crossing Checker Entry Point
//!
//! This binary fetches the latest tide readings, classifies them, and prints the
//! crossing report. By default it runs once; `--watch` keeps refreshing on an interval
//! until Ctrl-C.


use anyhow::bail;
use clap::Parser;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
    tty::IsTty,
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crossing_lib::{
    config::{Config, DEFAULT_CONFIG_PATH},
    logger,
    monitor::{DisplayState, HttpSource, Monitor},
    renderer::{draw_ascii, Renderer},
};

#[derive(Parser, Debug)]
#[command(
    name = "crossing-checker",
    version,
    about = "Tells you whether the Crammond Island causeway is safe to cross"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Keep refreshing until interrupted
    #[arg(short, long)]
    watch: bool,

    /// Refresh interval in seconds for --watch (overrides the config file)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Disable ANSI colours
    #[arg(long)]
    no_color: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write the default configuration to --config and exit
    #[arg(long)]
    init_config: bool,

    /// Let --init-config replace an existing file
    #[arg(long, requires = "init_config")]
    force: bool,
}

/// Write the default configuration, refusing to replace an existing file unless forced.
fn write_default_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    Config::default().save_to_path(path)?;
    Ok(())
}

/// Wipe the terminal before the next report in watch mode.
fn clear_screen() {
    if let Err(e) = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0)) {
        warn!(error = %e, "could not clear the terminal");
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    if cli.init_config {
        write_default_config(&cli.config, cli.force)?;
        println!("Wrote default configuration to {}", cli.config.display());
        return Ok(());
    }

    let config = Config::load_from_path(&cli.config);
    config.validate()?;

    let renderer = Renderer::new(&config)?.with_color(!cli.no_color);
    let source = HttpSource::new(config.station.clone())?;
    let mut monitor = Monitor::new(source);

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    if cli.watch {
        let every = Duration::from_secs(cli.interval.unwrap_or(config.display.refresh_secs));
        // Only redraw in place on a real terminal; piped output keeps every report
        let clear = io::stdout().is_tty();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        rt.block_on(async {
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("interrupt received, shutting down");
                    let _ = shutdown_tx.send(true);
                }
            });

            monitor
                .run(every, shutdown_rx, |state| {
                    if clear {
                        clear_screen();
                    }
                    draw_ascii(&renderer, state);
                })
                .await;
        });
        return Ok(());
    }

    let state = rt.block_on(monitor.refresh());
    draw_ascii(&renderer, state);

    if let DisplayState::Unavailable { reason } = state {
        error!(%reason, "no report could be produced");
        std::process::exit(1);
    }

    Ok(())
}
