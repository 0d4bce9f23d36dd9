//! Plot of the current question's function.

use ratatui::{
    prelude::*,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
};
use serde::Deserialize;

use crate::models::Question;
use crate::plot::Sample;

const Y_PADDING: f64 = 0.05;

#[derive(Deserialize)]
struct ClickedPoint {
    x: f64,
    y: f64,
}

/// Parse a click-on-graph answer back into its coordinates.
fn clicked_point(answer: &str) -> Option<(f64, f64)> {
    serde_json::from_str::<ClickedPoint>(answer)
        .ok()
        .map(|p| (p.x, p.y))
}

/// Split samples into runs of defined points; gaps end a run.
fn segments(samples: &[Sample]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for sample in samples {
        match sample.y {
            Some(y) => current.push((sample.x, y)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn y_bounds<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> [f64; 2] {
    let (min, max) = points.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
        (lo.min(*y), hi.max(*y))
    });
    if !min.is_finite() || !max.is_finite() {
        return [-1.0, 1.0];
    }
    if min == max {
        return [min - 1.0, max + 1.0];
    }
    let pad = (max - min) * Y_PADDING;
    [min - pad, max + pad]
}

fn axis_labels([min, max]: [f64; 2]) -> Vec<String> {
    [min, (min + max) / 2.0, max]
        .iter()
        .map(|value| trim_number(*value))
        .collect()
}

fn trim_number(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

pub struct GraphView<'a> {
    pub question: &'a Question,
    pub answer: Option<&'a str>,
    pub correct: Option<bool>,
    pub cursor: Option<usize>,
}

pub fn render(frame: &mut Frame, area: Rect, view: &GraphView) {
    let question = view.question;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Color::DarkGray)
        .title(format!(" {} ", question.function_string))
        .title_style(Style::default().fg(Color::Cyan).bold())
        .title_alignment(Alignment::Center);

    if question.samples().is_empty() {
        let widget = Paragraph::new("This is a conceptual question. No graph is needed for this step.")
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .fg(Color::DarkGray)
            .block(block);
        frame.render_widget(widget, area);
        return;
    }

    let runs = segments(question.samples());
    let answered = view.answer.is_some();

    let highlights: Vec<(f64, f64)> = if answered {
        question.highlight_points.iter().map(|p| (p.x, p.y)).collect()
    } else {
        Vec::new()
    };
    let clicked: Vec<(f64, f64)> = view.answer.and_then(clicked_point).into_iter().collect();
    let cursor: Vec<(f64, f64)> = if answered {
        Vec::new()
    } else {
        view.cursor
            .and_then(|index| question.samples().get(index))
            .and_then(|s| s.y.map(|y| (s.x, y)))
            .into_iter()
            .collect()
    };

    let mut datasets: Vec<Dataset> = runs
        .iter()
        .map(|run| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Blue))
                .data(run)
        })
        .collect();

    if !highlights.is_empty() {
        let labels: Vec<&str> = question.highlight_points.iter().map(|p| p.label.as_str()).collect();
        datasets.push(
            Dataset::default()
                .name(labels.join(", "))
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Green).bold())
                .data(&highlights),
        );
    }
    if !clicked.is_empty() {
        let color = if view.correct == Some(true) { Color::Green } else { Color::Red };
        datasets.push(
            Dataset::default()
                .name("your answer")
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(color))
                .data(&clicked),
        );
    }
    if !cursor.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Yellow))
                .data(&cursor),
        );
    }

    let x_bounds = question.domain;
    let y_bounds = y_bounds(runs.iter().flatten().chain(highlights.iter()));

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("x".fg(Color::DarkGray))
                .style(Style::default().fg(Color::DarkGray))
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title("y".fg(Color::DarkGray))
                .style(Style::default().fg(Color::DarkGray))
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::sample_body;

    #[test]
    fn test_gaps_split_segments() {
        let samples = sample_body("1/x", [-1.0, 1.0], 0.5);
        let runs = segments(&samples);

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], vec![(-1.0, -1.0), (-0.5, -2.0)]);
        assert_eq!(runs[1], vec![(0.5, 2.0), (1.0, 1.0)]);
    }

    #[test]
    fn test_y_bounds() {
        let flat = [(0.0, 3.0), (1.0, 3.0)];
        assert_eq!(y_bounds(flat.iter()), [2.0, 4.0]);

        let empty: [(f64, f64); 0] = [];
        assert_eq!(y_bounds(empty.iter()), [-1.0, 1.0]);

        let ramp = [(0.0, 0.0), (1.0, 10.0)];
        let [lo, hi] = y_bounds(ramp.iter());
        assert!((lo + 0.5).abs() < 1e-9);
        assert!((hi - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_axis_labels() {
        assert_eq!(axis_labels([-2.0, 2.0]), vec!["-2", "0", "2"]);
        assert_eq!(axis_labels([0.0, 1.5]), vec!["0", "0.75", "1.5"]);
    }

    #[test]
    fn test_clicked_point_parses_answer() {
        assert_eq!(clicked_point(r#"{"x":1,"y":-0.5}"#), Some((1.0, -0.5)));
        assert_eq!(clicked_point("4"), None);
    }
}
