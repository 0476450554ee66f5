mod app;
mod args;
mod camera;
mod handler;
mod logger;
mod tui;
mod ui;

use anyhow::Result;
use clap::Parser;

use app::App;
use args::Args;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = args.log_file.clone().or_else(logger::default_log_path);
    logger::init_logging(args.verbose, log_file.as_deref());
    tracing::info!("Posture monitor starting against {}", args.server);

    // Fetch defaults and load stored config before taking over the terminal
    let mut app = App::new(&args).await?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app, &args).await;
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!("Posture monitor stopped: {:#}", e);
    }
    tracing::info!("Posture monitor exiting");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, args: &Args) -> Result<()> {
    let mut events = EventHandler::new(args.capture_interval());
    let tx = events.sender();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event, &tx).await?,
            None => break,
        }
    }

    Ok(())
}
