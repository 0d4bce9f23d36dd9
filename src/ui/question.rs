use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::UiState;
use crate::models::{AnswerType, Question};
use crate::quiz::Session;

use super::graph::{self, GraphView};

const OPTION_LABELS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

pub fn render(frame: &mut Frame, area: Rect, session: &Session, ui: &UiState) {
    let Some(question) = session.current_question() else {
        return;
    };
    let answer = session.current_answer();
    let correct = session.is_correct_answer(question);

    let panel_height = 7 + question.options.len().max(1) as u16;
    let feedback_height = if answer.is_some() { 6 } else { 0 };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(10),
        Constraint::Length(panel_height),
        Constraint::Length(feedback_height),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], session);
    graph::render(
        frame,
        chunks[1],
        &GraphView {
            question,
            answer,
            correct,
            cursor: ui.graph_cursor,
        },
    );
    render_panel(frame, chunks[2], session, question, ui);
    if let Some(correct) = correct {
        render_feedback(frame, chunks[3], question, correct);
    }
    render_controls(frame, chunks[4], session.is_last_question());
}

fn render_progress(frame: &mut Frame, area: Rect, session: &Session) {
    let progress = format!(
        "{}  ·  Question {} of {}",
        session.active_topic().unwrap_or_default(),
        session.current_index() + 1,
        session.questions().len()
    );
    let widget = Paragraph::new(progress)
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

fn render_panel(frame: &mut Frame, area: Rect, session: &Session, question: &Question, ui: &UiState) {
    let answer = session.current_answer();
    let mut lines = vec![
        Line::from(Span::styled(
            question.text.as_str(),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(""),
        hint_line(session),
        Line::from(""),
    ];
    lines.extend(answer_lines(question, answer, ui));

    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn hint_line(session: &Session) -> Line<'_> {
    if let Some(hint) = session.hint() {
        Line::from(vec![
            Span::styled("Hint: ", Style::default().fg(Color::LightBlue).bold()),
            Span::styled(hint, Style::default().fg(Color::LightBlue)),
        ])
    } else if session.is_loading_hint() {
        Line::from("Thinking...".fg(Color::LightBlue).italic())
    } else {
        Line::from("h  get a hint".fg(Color::DarkGray))
    }
}

fn answer_lines<'a>(question: &'a Question, answer: Option<&'a str>, ui: &'a UiState) -> Vec<Line<'a>> {
    match question.answer_type {
        AnswerType::Numeric => match answer {
            Some(answer) => vec![Line::from(vec![
                Span::styled("Your answer: ", Style::default().fg(Color::DarkGray)),
                Span::styled(answer, Style::default().fg(Color::White).bold()),
            ])],
            None => vec![Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan).bold()),
                Span::styled(ui.input.as_str(), Style::default().fg(Color::White)),
                Span::styled("_", Style::default().fg(Color::Cyan)),
                Span::styled("   enter a number", Style::default().fg(Color::DarkGray)),
            ])],
        },
        AnswerType::MultipleChoice => question
            .options
            .iter()
            .enumerate()
            .map(|(index, option)| {
                let chosen = answer == Some(option.as_str());
                let is_cursor = answer.is_none() && index == ui.option_cursor;
                option_line(index, option, is_cursor, chosen, None)
            })
            .collect(),
        AnswerType::MultipleSelect => {
            let submitted: Vec<String> = answer
                .and_then(|a| serde_json::from_str(a).ok())
                .unwrap_or_default();
            question
                .options
                .iter()
                .enumerate()
                .map(|(index, option)| {
                    let checked = if answer.is_some() {
                        submitted.contains(option)
                    } else {
                        ui.selected.contains(&index)
                    };
                    let is_cursor = answer.is_none() && index == ui.option_cursor;
                    option_line(index, option, is_cursor, false, Some(checked))
                })
                .collect()
        }
        AnswerType::ClickOnGraph => {
            if let Some(answer) = answer {
                return vec![Line::from(vec![
                    Span::styled("You picked ", Style::default().fg(Color::DarkGray)),
                    Span::styled(answer, Style::default().fg(Color::White).bold()),
                ])];
            }
            let point = ui
                .graph_cursor
                .and_then(|index| question.samples().get(index))
                .and_then(|s| s.y.map(|y| format!("({}, {})", s.x, y)))
                .unwrap_or_else(|| "-".to_string());
            vec![Line::from(vec![
                Span::styled("Point ", Style::default().fg(Color::DarkGray)),
                Span::styled(point, Style::default().fg(Color::Yellow).bold()),
                Span::styled(
                    "   ←/→ move along the graph · enter submit",
                    Style::default().fg(Color::DarkGray),
                ),
            ])]
        }
    }
}

fn option_line<'a>(
    index: usize,
    option: &'a str,
    is_cursor: bool,
    chosen: bool,
    checked: Option<bool>,
) -> Line<'a> {
    let style = if is_cursor {
        Style::default().fg(Color::Cyan).bold()
    } else if chosen {
        Style::default().fg(Color::White).bold()
    } else {
        Style::default().fg(Color::Gray)
    };
    let marker = if is_cursor || chosen { ">" } else { " " };
    let label = OPTION_LABELS.get(index).copied().unwrap_or('?');

    let mut spans = vec![Span::styled(format!(" {} ", marker), style)];
    if let Some(checked) = checked {
        spans.push(Span::styled(if checked { "[x] " } else { "[ ] " }, style));
    }
    spans.push(Span::styled(format!("{}. ", label), style));
    spans.push(Span::styled(option, style));
    Line::from(spans)
}

fn render_feedback(frame: &mut Frame, area: Rect, question: &Question, correct: bool) {
    let (title, color) = if correct {
        ("Correct!", Color::Green)
    } else {
        ("Not Quite!", Color::Red)
    };

    let widget = Paragraph::new(question.explanation.as_str())
        .wrap(Wrap { trim: true })
        .fg(Color::Gray)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(color)
                .title(format!(" {} ", title))
                .title_style(Style::default().fg(color).bold())
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, is_last: bool) {
    let next = if is_last { "n finish topic" } else { "n next" };
    let widget = Paragraph::new(format!(
        "p previous  ·  {}  ·  h hint  ·  tab menu  ·  q quit",
        next
    ))
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
