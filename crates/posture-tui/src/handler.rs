use std::time::Instant;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use crate::app::{App, InputMode};
use crate::tui::{self, AppEvent};

pub async fn handle_event(app: &mut App, event: AppEvent, tx: &mpsc::UnboundedSender<AppEvent>) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Resize(_, _) | AppEvent::Tick => {}
        AppEvent::Capture => app.capture_and_submit(tx),
        AppEvent::Frame(result) => {
            let effect = app.on_frame(result, Instant::now());
            if effect.play_alert {
                if let Err(e) = tui::ring_bell() {
                    tracing::warn!("Error playing alert: {}", e);
                }
            }
        }
        AppEvent::Reset(result) => app.on_reset(result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &mpsc::UnboundedSender<AppEvent>) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key, tx),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent, tx: &mpsc::UnboundedSender<AppEvent>) {
    app.notice = None;

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('s') => app.start(),
        KeyCode::Char('a') => app.toggle_alerts(),
        KeyCode::Char('e') => app.open_editor(),
        KeyCode::Char('r') => app.request_reset(tx),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    let field = app.form_field;

    match key.code {
        KeyCode::Esc => app.cancel_editor(),
        KeyCode::Enter => app.save_config(),
        KeyCode::Tab | KeyCode::Down => app.form_field = field.next(),
        KeyCode::BackTab | KeyCode::Up => app.form_field = field.prev(),
        KeyCode::Backspace => {
            app.field_mut(field).pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
            app.field_mut(field).push(c);
        }
        _ => {}
    }
}
