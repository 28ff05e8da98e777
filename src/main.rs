//! headlines — top news headlines in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ WorkerMsg  ┌──────────┐  draw()  ┌──────────┐
//! │ worker.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │  (tokio)  │  (channel) │ (state)  │          │ (render) │
//! └───────────┘            └──────────┘          └──────────┘
//!       ▲                       ▲
//!       │ Command               │ handle_key_event()
//!       └──────────────── ┌──────────┐
//!                         │ input.rs │
//!                         └──────────┘
//! ```
//!
//! * **`source/`** — the `HeadlineSource` trait, the NewsAPI client, the
//!   `Article` record and the thumbnail loader.
//! * **`worker`** — spawns fetch and thumbnail tasks on a tokio runtime.
//! * **`app`** — the presenter: article list, load phase, selection.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations and commands.
//! * **`viewer`** — the browser and clipboard collaborators.
//! * **`config`**, **`logging`**, **`error`** — ambient plumbing.
//! * **`main`** — wires everything together: parse args, set up the terminal,
//!   and run the event loop.

mod app;
mod config;
mod error;
mod input;
mod logging;
mod source;
mod ui;
mod viewer;
mod worker;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::{App, FetchApplied};
use config::{Cli, Config};
use input::Command;
use source::{NewsApiClient, ThumbnailLoader};
use viewer::{BrowserViewer, ClipboardShare};
use worker::{Worker, WorkerMsg};

// ---------------------------------------------------------------------------
// RAII terminal guard — cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default hook prints the panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    match logging::init(config.log_file.as_deref()) {
        Ok(path) => info!(log_file = %path.display(), country = %config.country, "starting"),
        Err(e) => eprintln!("warning: logging disabled: {e:#}"),
    }

    // -- background runtime and data sources ---------------------------------
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let source = Arc::new(NewsApiClient::new(&config)?);
    let thumbnails = ThumbnailLoader::new(config.thumbnail_timeout)?;
    let (worker, mut rx) = Worker::new(runtime.handle().clone(), source, thumbnails, config.timeout);

    let viewer = BrowserViewer;
    let share = ClipboardShare;

    install_panic_hook();
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();
    worker.spawn_fetch(app.begin_fetch());

    // -- main event loop -----------------------------------------------------
    // ~10 fps.  Each iteration:
    //   1. Apply finished background work.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Apply worker messages
        while let Ok(msg) = rx.try_recv() {
            match msg {
                WorkerMsg::Fetched { seq, outcome } => {
                    if let FetchApplied::Replaced(requests) = app.apply_fetch(seq, outcome) {
                        for request in requests {
                            worker.spawn_thumbnail(request);
                        }
                    }
                }
                WorkerMsg::Thumbnail {
                    row,
                    generation,
                    thumbnail,
                } => {
                    app.apply_thumbnail(row, generation, thumbnail);
                }
            }
        }

        // 2. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 3. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                match input::handle_key_event(&mut app, key) {
                    Some(Command::Refresh) => worker.spawn_fetch(app.begin_fetch()),
                    Some(Command::Open) => app.open_selected(&viewer),
                    Some(Command::Share) => app.share_selected(&share),
                    None => {}
                }
            }
        }

        if app.quit {
            break;
        }
    }

    info!("exiting");
    // Restore the terminal before tearing down background tasks.
    drop(guard);
    runtime.shutdown_background();
    Ok(())
}
