use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::*};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::io;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use yarnlink::api::{BackendClient, Transport};
use yarnlink::app::App;
use yarnlink::config;
use yarnlink::controller::PendingRequest;
use yarnlink::events::AppEvent;
use yarnlink::ui;

fn init_logging(level: &str) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);

    if let Ok(log_file) = File::create(config::get_log_path()) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let app_config = config::load_config()?;
    init_logging(&app_config.log_level);
    let backend_client = BackendClient::new(&app_config.backend_url, app_config.request_timeout)?;
    log::info!("Yarn Link starting, backend: {}", backend_client.base_url());
    let client: Arc<dyn Transport> = Arc::new(backend_client);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let res = run_app(&mut terminal, &mut app, &client, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("Exiting with error: {err:?}");
        eprintln!("Error: {err:?}");
    }

    log::info!("Yarn Link shutting down");
    Ok(())
}

/// Sends the request on the runtime and reports the outcome back to the loop.
fn spawn_query(
    pending: PendingRequest,
    client: &Arc<dyn Transport>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let query = client.query(&pending.prompt);
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let result = query.await;
        let _ = tx.send(AppEvent::QueryFinished {
            id: pending.id,
            result,
        });
    });
}

/// Overlays swallow their own close keys. Returns true when the key was used.
fn handle_overlay_keys(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> bool {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key, KeyCode::Char('c' | 'q')) {
        return false;
    }

    if app.show_help {
        if key == KeyCode::Esc || (ctrl && key == KeyCode::Char('h')) {
            app.show_help = false;
        }
        return true;
    }

    if app.show_about {
        if key == KeyCode::Esc || (ctrl && key == KeyCode::Char('a')) {
            app.show_about = false;
        }
        return true;
    }

    false
}

fn handle_keyboard_input(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    client: &Arc<dyn Transport>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key == KeyCode::Char('c') {
        if app.exit_pending {
            app.quit();
        } else {
            app.exit_pending = true;
        }
        return;
    }

    if app.exit_pending {
        // Any other key cancels a pending exit; Esc does nothing else
        app.exit_pending = false;
        if key == KeyCode::Esc {
            return;
        }
    }

    match key {
        KeyCode::Char('q') if ctrl => app.quit(),
        KeyCode::Char('h') if ctrl => app.toggle_help(),
        KeyCode::Char('a') if ctrl => app.toggle_about(),
        KeyCode::Char('l') if ctrl => {
            if app.has_started() {
                app.clear_conversation();
            }
        }

        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_bottom(),

        KeyCode::Backspace => app.pop_char(),
        KeyCode::Enter => {
            if let Some(pending) = app.submit_input() {
                spawn_query(pending, client, event_tx);
            }
        }
        KeyCode::Char(c) if !ctrl => app.push_char(c),

        _ => {}
    }
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &Arc<dyn Transport>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal
            .draw(|f| ui::render(f, app))
            .context("Failed to draw frame")?;

        while let Ok(app_event) = event_rx.try_recv() {
            app.handle_event(app_event);
        }

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && !handle_overlay_keys(app, key.code, key.modifiers)
                {
                    handle_keyboard_input(app, key.code, key.modifiers, client, event_tx);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
