use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine},
        Block, Borders, Paragraph, Wrap,
    },
};
use posture_core::{CameraStatus, Overlay, PostureTone};
use crate::app::{App, FormField, InputMode};

const MARKER_COLOR: Color = Color::Green;

fn tone_color(tone: PostureTone) -> Color {
    match tone {
        PostureTone::Neutral => Color::Gray,
        PostureTone::Good => Color::Green,
        PostureTone::Bad => Color::Red,
    }
}

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [camera_area, side_area] = Layout::horizontal([
        Constraint::Percentage(60),
        Constraint::Percentage(40),
    ])
    .areas(body_area);

    render_camera(app, frame, camera_area);

    let [status_area, config_area] = Layout::vertical([
        Constraint::Length(6),
        Constraint::Min(0),
    ])
    .areas(side_area);

    render_status(app, frame, status_area);
    render_config(app, frame, config_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let detection = if app.running {
        Span::styled(" Detection Running ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" Idle ", Style::default().fg(Color::DarkGray))
    };

    let alerts = if app.session.alerts_enabled() {
        Span::styled(format!(" 🔔 {} ", app.alert_label()), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(format!(" 🔕 {} ", app.alert_label()), Style::default().fg(Color::DarkGray))
    };

    let title = Line::from(vec![
        Span::styled(" Posture Monitor ", Style::default().fg(Color::Cyan).bold()),
        detection,
        alerts,
        Span::styled(
            format!("{} ", app.client.base_url()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_camera(app: &App, frame: &mut Frame, area: Rect) {
    let tone = app.session.tone();
    let (title, title_style) = match &app.session.camera {
        CameraStatus::Idle => (" Camera ".to_string(), Style::default().fg(Color::DarkGray)),
        CameraStatus::Streaming(source) => (format!(" {} ", source), Style::default().fg(Color::White)),
        CameraStatus::Failed(_) => (" Camera ".to_string(), Style::default().fg(Color::Red)),
    };

    // The frame border plays the role of the posture shadow
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tone_color(tone)))
        .title(Span::styled(title, title_style));

    match (&app.session.camera, app.session.overlay()) {
        (CameraStatus::Failed(reason), _) => {
            let text = vec![
                Line::from(Span::styled("Error accessing camera", Style::default().fg(Color::Red).bold())),
                Line::from(""),
                Line::from(Span::styled(reason.clone(), Style::default().fg(Color::DarkGray))),
            ];
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(block), area);
        }
        (_, Some(overlay)) => render_overlay(overlay, block, frame, area),
        (CameraStatus::Idle, None) => {
            let hint = Paragraph::new("Press 's' to start detection")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(hint, area);
        }
        (CameraStatus::Streaming(_), None) => {
            let waiting = Paragraph::new("Waiting for landmarks...")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(waiting, area);
        }
    }
}

/// Draw markers and connections. Canvas `y` grows upward, image `y` downward.
fn render_overlay(overlay: &Overlay, block: Block, frame: &mut Frame, area: Rect) {
    let width = overlay.width;
    let height = overlay.height;

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for segment in &overlay.segments {
                ctx.draw(&CanvasLine::new(
                    segment.from.x,
                    height - segment.from.y,
                    segment.to.x,
                    height - segment.to.y,
                    MARKER_COLOR,
                ));
            }
            for point in &overlay.markers {
                ctx.draw(&Circle {
                    x: point.x,
                    y: height - point.y,
                    radius: width * 0.01,
                    color: MARKER_COLOR,
                });
            }
        });

    frame.render_widget(canvas, area);
}

fn hint_span(in_range: Option<bool>) -> Span<'static> {
    match in_range {
        Some(true) => Span::styled(" ✓", Style::default().fg(Color::Green)),
        Some(false) => Span::styled(" ✗", Style::default().fg(Color::Red)),
        None => Span::raw(""),
    }
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let session = &app.session;
    let status_style = Style::default().fg(tone_color(session.tone())).add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::from(Span::styled(session.status().to_string(), status_style))];

    if let Some(angles) = session.angles() {
        let (right_hint, left_hint) = session.range_hints();
        lines.push(Line::from(vec![
            Span::raw(angles.describe()),
            hint_span(right_hint),
            hint_span(left_hint),
        ]));
    }

    if let Some(timer) = session.timer_text() {
        lines.push(Line::from(Span::styled(timer, Style::default().fg(Color::Red))));
    }

    lines.push(Line::from(Span::styled(
        format!(
            "{} frames evaluated, {} rejected",
            session.frames_evaluated, session.frames_rejected
        ),
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default().borders(Borders::ALL).title(" Status ");
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}

fn render_config(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(if editing { " Edit Configuration " } else { " Configuration " });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|&field| {
            let selected = editing && field == app.form_field;
            let value = if editing {
                app.field(field).to_string()
            } else {
                active_value(app, field)
            };
            let value_style = if selected {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default().fg(Color::Cyan)
            };
            Line::from(vec![
                Span::styled(format!("{:<20}", field.label()), Style::default().fg(Color::White)),
                Span::styled(format!(" {} ", value), value_style),
            ])
        })
        .collect();

    if let Some(error) = &app.form_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }

    frame.render_widget(Paragraph::new(lines), inner);

    if editing {
        if let Some(row) = FormField::ALL.iter().position(|f| *f == app.form_field) {
            let x = inner.x + 21 + app.field(app.form_field).chars().count() as u16;
            let y = inner.y + row as u16;
            if x < inner.right() && y < inner.bottom() {
                frame.set_cursor_position((x, y));
            }
        }
    }
}

fn active_value(app: &App, field: FormField) -> String {
    let config = app.session.config();
    match field {
        FormField::RightMin => config.right_min_angle.to_string(),
        FormField::RightMax => config.right_max_angle.to_string(),
        FormField::LeftMin => config.left_min_angle.to_string(),
        FormField::LeftMax => config.left_max_angle.to_string(),
        FormField::AlertInterval => (config.alert_interval / 1000).to_string(),
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" MONITOR ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::White);

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Normal => &[
            ("s", "start"),
            ("e", "edit config"),
            ("r", "reset"),
            ("a", "toggle alerts"),
            ("q", "quit"),
        ],
        InputMode::Editing => &[
            ("Tab", "next field"),
            ("Enter", "save"),
            ("Esc", "cancel"),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    if let Some(notice) = &app.notice {
        spans.push(Span::styled(format!("  {}", notice), Style::default().fg(Color::Yellow)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
