mod complete;
mod graph;
mod menu;
mod question;
mod welcome;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::UiState;
use crate::models::Phase;
use crate::quiz::Session;

const MENU_WIDTH: u16 = 38;

pub fn render(frame: &mut Frame, session: &Session, ui: &UiState) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    let chunks = Layout::horizontal([Constraint::Length(MENU_WIDTH), Constraint::Fill(1)]).split(area);

    menu::render(frame, chunks[0], session, ui);

    let main = chunks[1];
    match session.phase() {
        Phase::Welcome => welcome::render(frame, main),
        Phase::Loading => render_loading(frame, main, session.active_topic().unwrap_or_default()),
        Phase::InProgress => question::render(frame, main, session, ui),
        Phase::Complete => complete::render(frame, main, session),
    }

    if let Some(message) = session.notification() {
        render_notification(frame, area, message);
    }
}

fn render_loading(frame: &mut Frame, area: Rect, topic: &str) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .split(area);

    let widget = Paragraph::new(format!("Loading {}...", topic))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::SLOW_BLINK),
        );
    frame.render_widget(widget, chunks[1]);
}

fn render_notification(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered(area, 60, 9);
    frame.render_widget(Clear, popup);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from("enter/esc dismiss".fg(Color::DarkGray)),
    ];
    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::Red)
                .title(" Error ")
                .title_style(Style::default().fg(Color::Red).bold()),
        );
    frame.render_widget(widget, popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
