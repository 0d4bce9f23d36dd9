use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render(frame: &mut Frame, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(11),
        Constraint::Fill(1),
    ])
    .margin(2)
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to MathQuest!",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(
            "Select a topic from the sidebar to begin. Each challenge brings a math concept to life through its graph."
                .fg(Color::Gray),
        ),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "j/k · ENTER",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from("to pick a topic".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray),
        );

    frame.render_widget(widget, chunks[1]);
}
