use anyhow::Result;

mod app;
mod client;
mod config;
mod handler;
mod tui;
mod ui;

use app::App;
use client::AgentClient;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::new());
    let client = AgentClient::new(config.endpoint(), config.timeout())?;

    let mut app = App::new(client);
    app.check_status();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event)?;
        }

        // Ticks arrive every 300ms, so finished tasks are collected promptly
        app.poll_request().await;
        app.poll_status().await;
    }

    Ok(())
}
