//! dotedit — terminal editor for your dotfiles.
//!
//! Entry point for the `dotedit` binary. Wires together the terminal lifecycle
//! (`tui`), the unified event bus (`event`), the repository dispatcher
//! (`dispatch`), the UI (`ui`), and the edit session in `dotedit-core`.
//!
//! # Startup sequence
//!
//! 1. Tracing to a log file; the terminal owns stdout.
//! 2. Config and theme, read before the terminal is touched.
//! 3. `install_panic_hook()` so a panic restores the terminal first.
//! 4. `register_sigterm()`, polled on the 50ms heartbeat.
//! 5. `init_tui()`, then the event task and the first list refresh.
//!
//! The loop exits only through `break`, so `restore_tui()` always runs. Draw
//! errors break out of the loop and are returned after restoring.
//!
//! `dotedit export DIR` and `dotedit import DIR` run a bundle transfer against
//! the same repository and exit without touching the terminal.

mod app;
mod cli;
mod config;
mod cursor;
mod dispatch;
mod event;
mod highlight;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clap::Parser;
use dotedit_core::{export_bundle, import_bundle, DocumentRepository, FsRepository};
use tracing::{error, info};

use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

/// Routes tracing output to `dotedit.log`.
///
/// The directory comes from `DOTEDIT_LOG_DIR`, else the user cache dir. The
/// filter comes from `DOTEDIT_LOG`. If the file cannot be opened, logging stays
/// off rather than writing over the TUI.
fn setup_tracing() {
    use std::fs::OpenOptions;

    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let Some(log_dir) = std::env::var_os("DOTEDIT_LOG_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::cache_dir().map(|d| d.join("dotedit")))
    else {
        return;
    };
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let log_path = log_dir.join("dotedit.log");
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("DOTEDIT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("dotedit=info,dotedit_core=info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry().with(filter).with(file_layer).init();
    info!(path = ?log_path, "tracing initialized");
}

/// Runs a bundle subcommand and prints a summary to stdout.
async fn run_command(command: cli::Command, repo: &dyn DocumentRepository) -> std::io::Result<()> {
    match command {
        cli::Command::Export { dir } => {
            let report = export_bundle(repo, &dir).await.map_err(std::io::Error::other)?;
            println!("exported {} document(s) to {}", report.exported.len(), dir.display());
            for (id, reason) in &report.failed {
                println!("  skipped {id}: {reason}");
            }
        }
        cli::Command::Import { dir } => {
            let report = import_bundle(repo, &dir).await.map_err(std::io::Error::other)?;
            println!(
                "imported {} document(s), skipped {}",
                report.imported.len(),
                report.skipped.len()
            );
            for err in &report.errors {
                println!("  error: {err}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = cli::Cli::parse();
    setup_tracing();

    let config = config::Config::load();
    let theme = theme::Theme::from_name(&config.theme);

    let home = config
        .home
        .clone()
        .or_else(dirs::home_dir)
        .ok_or_else(|| std::io::Error::other("cannot determine home directory"))?;
    let mut repo = FsRepository::new(home);
    repo.extend_catalog(config.documents.iter().cloned());
    let repo: Arc<dyn DocumentRepository> = Arc::new(repo);

    if let Some(command) = cli.command {
        return run_command(command, repo.as_ref()).await;
    }

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let dispatcher = dispatch::Dispatcher::new(repo, handler.tx.clone());
    let mut state = app::AppState::new(Duration::from_secs(config.error_timeout_secs))
        .with_dispatcher(dispatcher);
    state.refresh();
    state.load_metadata();

    let mut outcome = Ok(());
    'event_loop: loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event::AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            error!(error = %e, "draw failed");
                            outcome = Err(e);
                            break 'event_loop;
                        }
                    }
                    Some(event::AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(event::AppEvent::Mouse(mouse)) => {
                        handle_mouse(mouse, &mut state);
                    }
                    Some(event::AppEvent::Tick) => state.on_tick(Instant::now()),
                    Some(event::AppEvent::Repo(result)) => state.apply_repo_event(*result),
                    // ratatui picks up the new size from frame.area() on the next Render.
                    Some(event::AppEvent::Resize(_, _)) => {}
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    if state.session.has_unsaved_changes() {
        info!(documents = ?state.session.modified_ids(), "exited with unsaved changes");
    }
    outcome
}
