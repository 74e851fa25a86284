// src/main.rs
mod app;
mod config;
mod console;
mod errors;
mod events;
mod host;
mod lang;
mod logging;
mod models;
mod session;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::time::Duration;
use tracing::info;

use crate::app::{App, Overrides};
use crate::config::{load_settings, settings_path, SettingsWatcher};
use crate::events::handler::Flow;
use crate::events::spawner::EventSpawner;
use crate::lang::StatSession;
use crate::session::SessionManager;
use crate::ui::terminal;

/// Interactive console for the Stat language
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Use this config file instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,
    /// Bind `session.user` to this name
    #[arg(long)]
    user: Option<String>,
    /// Bind `session.home` to this directory
    #[arg(long)]
    home: Option<PathBuf>,
    /// Do not echo typed characters into the console
    #[arg(long)]
    no_echo: bool,
    /// Log file, or a directory to put stat-console.log in
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log = logging::init(args.log_file.clone()).context("initialising logging")?;

    let path = match args.config {
        Some(path) => path,
        None => settings_path()?,
    };
    let settings = load_settings(&path).with_context(|| format!("loading {}", path.display()))?;
    let tick = Duration::from_millis(settings.console.tick_millis.max(10));
    info!(config = %path.display(), "starting console");

    let overrides = Overrides { user: args.user, home: args.home, no_echo: args.no_echo };
    let session = SessionManager::new(StatSession::new());
    let mut app = App::new(settings, SettingsWatcher::new(path), overrides, session.handle())?;

    terminal::install_panic_hook();
    let mut terminal = terminal::setup_terminal()?;
    let mut events = EventSpawner::new(tick);

    let result = run(&mut terminal, &mut app, &mut events).await;

    terminal::restore_terminal()?;
    info!("console closed");
    result
}

async fn run(terminal: &mut terminal::Tui, app: &mut App, events: &mut EventSpawner) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| app.draw(f))?;
        let event = events.next().await;
        if app.handle(&event) == Flow::Quit {
            return Ok(());
        }
    }
}
