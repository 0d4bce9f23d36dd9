use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::{Focus, UiState};
use crate::data::catalog::COURSES;
use crate::quiz::Session;

pub fn render(frame: &mut Frame, area: Rect, session: &Session, ui: &UiState) {
    let focused = ui.focus == Focus::Menu;
    let mut lines: Vec<Line> = Vec::new();
    let mut index = 0;

    for course in COURSES {
        lines.push(Line::from(Span::styled(
            course.name.to_uppercase(),
            Style::default().fg(Color::DarkGray).bold(),
        )));
        for topic in course.topics {
            let is_active = session.active_topic() == Some(*topic);
            let is_cursor = focused && index == ui.menu_cursor;

            let style = if is_cursor {
                Style::default().fg(Color::Cyan).bold()
            } else if is_active {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if is_cursor { ">" } else { " " };
            let dot = if is_active { "●" } else { "·" };

            lines.push(Line::from(vec![
                Span::styled(format!(" {} {} ", marker, dot), style),
                Span::styled(*topic, style),
            ]));
            index += 1;
        }
        lines.push(Line::from(""));
    }

    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" MathQuest ")
            .title_style(Style::default().fg(Color::Cyan).bold())
            .title_bottom(Line::from(" tab switch pane · q quit ").fg(Color::DarkGray))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}
