//! TUI front-end entry (Ratatui + Crossterm)
//! - Opens the configured store (local SQLite or the remote API)
//! - Sets up terminal and runs the event loop

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use crate::config::Config;
use crate::service::ExpenseService;
use crate::store::Store;

pub mod editor;
pub mod state;
pub mod input;
pub mod util;
pub mod ui;

type Term = Terminal<CrosstermBackend<std::io::Stdout>>;

pub async fn run(config: &Config) -> Result<()> {
    let mut app = init_app(config).await?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(terminal: &mut Term, app: &mut state::App) -> Result<()> {
    if let Err(e) = app.refresh_expenses().await {
        app.status = format!("Load failed: {e}");
    }

    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key).await?;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.quit {
            break;
        }
    }
    Ok(())
}

pub async fn init_app(config: &Config) -> Result<state::App> {
    let store = Store::from_config(config).await?;
    info!(store = store.kind(), "starting tui");
    let service = ExpenseService::new(store, config.limit_policy);
    Ok(state::App::new(service))
}
