use std::collections::BTreeSet;
use std::sync::Arc;

use crossterm::event::KeyCode;
use tokio::sync::mpsc;

use crate::data::{LoadError, QuestionSource, build_questions, catalog};
use crate::hints::HintProvider;
use crate::models::{AnswerType, Phase, Question};
use crate::plot::sampler;
use crate::quiz::{HintRequest, HintTicket, LoadTicket, Session, encode_selection};

const MAX_INPUT_LENGTH: usize = 32;

/// Completion of work started on a background task.
#[derive(Debug)]
pub enum AppEvent {
    QuestionsLoaded {
        ticket: LoadTicket,
        result: Result<Vec<Question>, LoadError>,
    },
    HintReady {
        ticket: HintTicket,
        text: String,
    },
}

/// Which pane receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Menu,
    Quiz,
}

/// Input state of the screen, reset whenever the shown question changes.
#[derive(Debug)]
pub struct UiState {
    pub focus: Focus,
    pub menu_cursor: usize,
    pub input: String,
    pub option_cursor: usize,
    pub selected: BTreeSet<usize>,
    pub graph_cursor: Option<usize>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Menu,
            menu_cursor: 0,
            input: String::new(),
            option_cursor: 0,
            selected: BTreeSet::new(),
            graph_cursor: None,
        }
    }
}

pub struct App<Q, H> {
    session: Session,
    ui: UiState,
    source: Arc<Q>,
    hints: Arc<H>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl<Q: QuestionSource, H: HintProvider> App<Q, H> {
    pub fn new(source: Q, hints: H) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            ui: UiState::default(),
            source: Arc::new(source),
            hints: Arc::new(hints),
            events_tx,
            events_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Select `topic` and load its questions on a background task.
    pub fn select_topic(&mut self, topic: &str) {
        let ticket = self.session.select_topic(topic);
        self.ui.focus = Focus::Quiz;
        self.reset_input();

        let source = Arc::clone(&self.source);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = source
                .load_questions(ticket.topic())
                .await
                .map(build_questions);
            let _ = tx.send(AppEvent::QuestionsLoaded { ticket, result });
        });
    }

    /// Ask for a hint for the current question on a background task.
    pub fn request_hint(&mut self) {
        let Some(HintRequest { ticket, question }) = self.session.request_hint() else {
            return;
        };

        let hints = Arc::clone(&self.hints);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let text = hints.fetch_hint(&question).await;
            let _ = tx.send(AppEvent::HintReady { ticket, text });
        });
    }

    /// Wait for the next background completion.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::QuestionsLoaded { ticket, result } => {
                if self.session.finish_loading(&ticket, result) {
                    self.reset_input();
                    if self.session.phase() == Phase::Welcome {
                        self.ui.focus = Focus::Menu;
                    }
                }
            }
            AppEvent::HintReady { ticket, text } => {
                self.session.finish_hint(ticket, text);
            }
        }
    }

    pub fn submit_answer(&mut self, answer: &str) -> Option<bool> {
        self.session.submit_answer(answer)
    }

    pub fn advance(&mut self) {
        if self.session.advance() {
            self.reset_input();
        }
    }

    pub fn retreat(&mut self) {
        if self.session.retreat() {
            self.reset_input();
        }
    }

    pub fn reset_to_welcome(&mut self) {
        if self.session.reset_to_welcome() {
            self.reset_input();
            self.ui.focus = Focus::Menu;
        }
    }

    /// Handle a key press. Returns true if the app should exit.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        if self.session.notification().is_some() {
            if matches!(key, KeyCode::Enter | KeyCode::Esc) {
                self.session.dismiss_notification();
            }
            return false;
        }

        if key == KeyCode::Tab {
            self.ui.focus = match self.ui.focus {
                Focus::Menu => Focus::Quiz,
                Focus::Quiz => Focus::Menu,
            };
            return false;
        }

        match self.ui.focus {
            Focus::Menu => self.handle_menu_input(key),
            Focus::Quiz => match self.session.phase() {
                Phase::Welcome | Phase::Loading => is_quit(key),
                Phase::InProgress => self.handle_question_input(key),
                Phase::Complete => self.handle_complete_input(key),
            },
        }
    }

    fn handle_menu_input(&mut self, key: KeyCode) -> bool {
        let count = catalog::topic_count();
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.ui.menu_cursor = (self.ui.menu_cursor + count - 1) % count;
                false
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.ui.menu_cursor = (self.ui.menu_cursor + 1) % count;
                false
            }
            KeyCode::Enter => {
                if let Some(topic) = catalog::topic_at(self.ui.menu_cursor) {
                    self.select_topic(topic);
                }
                false
            }
            _ => is_quit(key),
        }
    }

    fn handle_complete_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
                self.reset_to_welcome();
                false
            }
            _ => is_quit(key),
        }
    }

    fn handle_question_input(&mut self, key: KeyCode) -> bool {
        let Some(question) = self.session.current_question() else {
            return false;
        };
        let answer_type = question.answer_type;
        let option_count = question.options.len();
        let answered = self.session.current_answer().is_some();

        // While a numeric answer is being typed, letters belong to the input.
        if answer_type == AnswerType::Numeric && !answered {
            match key {
                KeyCode::Char(c) if !self.ui.input.is_empty() || !is_command(c) => {
                    if self.ui.input.chars().count() < MAX_INPUT_LENGTH {
                        self.ui.input.push(c);
                    }
                    return false;
                }
                KeyCode::Backspace => {
                    self.ui.input.pop();
                    return false;
                }
                _ => {}
            }
        }

        match key {
            KeyCode::Enter => {
                if !answered {
                    if let Some(answer) = self.pending_answer() {
                        self.submit_answer(&answer);
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::PageDown => self.advance(),
            KeyCode::Char('p') | KeyCode::PageUp => self.retreat(),
            KeyCode::Char('h') => self.request_hint(),
            KeyCode::Up | KeyCode::Char('k') if option_count > 0 && !answered => {
                self.ui.option_cursor = (self.ui.option_cursor + option_count - 1) % option_count;
            }
            KeyCode::Down | KeyCode::Char('j') if option_count > 0 && !answered => {
                self.ui.option_cursor = (self.ui.option_cursor + 1) % option_count;
            }
            KeyCode::Char(' ') if answer_type == AnswerType::MultipleSelect && !answered => {
                let cursor = self.ui.option_cursor;
                if !self.ui.selected.remove(&cursor) {
                    self.ui.selected.insert(cursor);
                }
            }
            KeyCode::Left if answer_type == AnswerType::ClickOnGraph && !answered => {
                self.move_graph_cursor(false);
            }
            KeyCode::Right if answer_type == AnswerType::ClickOnGraph && !answered => {
                self.move_graph_cursor(true);
            }
            _ => return is_quit(key),
        }
        false
    }

    /// The answer encoding the current input would submit.
    fn pending_answer(&self) -> Option<String> {
        let question = self.session.current_question()?;
        match question.answer_type {
            AnswerType::Numeric => {
                let trimmed = self.ui.input.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            AnswerType::MultipleChoice => question.options.get(self.ui.option_cursor).cloned(),
            AnswerType::MultipleSelect => {
                if self.ui.selected.is_empty() {
                    return None;
                }
                let options = self
                    .ui
                    .selected
                    .iter()
                    .filter_map(|&index| question.options.get(index).cloned());
                Some(encode_selection(options))
            }
            AnswerType::ClickOnGraph => {
                let cursor = self.ui.graph_cursor?;
                question.samples().get(cursor)?.encode()
            }
        }
    }

    fn move_graph_cursor(&mut self, forward: bool) {
        let Some(question) = self.session.current_question() else {
            return;
        };
        let samples = question.samples();
        let next = match self.ui.graph_cursor {
            Some(cursor) => sampler::step_defined(samples, cursor, forward),
            None => sampler::nearest_defined(samples, midpoint(question.domain)),
        };
        if next.is_some() {
            self.ui.graph_cursor = next;
        }
    }

    fn reset_input(&mut self) {
        self.ui.input.clear();
        self.ui.option_cursor = 0;
        self.ui.selected.clear();
        self.ui.graph_cursor = self
            .session
            .current_question()
            .filter(|q| q.answer_type == AnswerType::ClickOnGraph)
            .and_then(|q| sampler::nearest_defined(q.samples(), midpoint(q.domain)));
    }
}

fn midpoint([min, max]: [f64; 2]) -> f64 {
    min + (max - min) / 2.0
}

fn is_command(c: char) -> bool {
    matches!(c, 'n' | 'p' | 'h' | 'q' | 'Q')
}

fn is_quit(key: KeyCode) -> bool {
    matches!(key, KeyCode::Char('q') | KeyCode::Char('Q'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{QuestionRecord, fixtures};

    struct StaticSource(Vec<QuestionRecord>);

    impl QuestionSource for StaticSource {
        async fn load_questions(&self, _topic: &str) -> Result<Vec<QuestionRecord>, LoadError> {
            Ok(self.0.clone())
        }
    }

    struct EchoHints;

    impl HintProvider for EchoHints {
        async fn fetch_hint(&self, question: &Question) -> String {
            format!("hint for {}", question.id)
        }
    }

    async fn loaded_app(records: Vec<QuestionRecord>) -> App<StaticSource, EchoHints> {
        let mut app = App::new(StaticSource(records), EchoHints);
        app.handle_key(KeyCode::Enter);
        let event = app.next_event().await.unwrap();
        app.apply(event);
        app
    }

    fn type_keys<Q: QuestionSource, H: HintProvider>(app: &mut App<Q, H>, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_menu_enter_selects_topic() {
        let app = loaded_app(vec![fixtures::record(1, AnswerType::Numeric, "4")]).await;

        assert_eq!(app.session().active_topic(), catalog::topic_at(0));
        assert_eq!(app.session().phase(), Phase::InProgress);
        assert_eq!(app.ui().focus, Focus::Quiz);
    }

    #[tokio::test]
    async fn test_numeric_input_and_commands() {
        let mut app = loaded_app(vec![
            fixtures::record(1, AnswerType::Numeric, "-4.5"),
            fixtures::record(2, AnswerType::Numeric, "1"),
        ])
        .await;

        type_keys(&mut app, "-4.5");
        assert_eq!(app.ui().input, "-4.5");
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.session().score(), 1);
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.session().current_index(), 1);
        assert!(app.ui().input.is_empty());
    }

    #[tokio::test]
    async fn test_command_letters_type_once_input_started() {
        let mut app = loaded_app(vec![fixtures::record(1, AnswerType::Numeric, "DNE")]).await;

        type_keys(&mut app, "1n");
        assert_eq!(app.ui().input, "1n");
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.session().phase(), Phase::Complete);
    }

    #[tokio::test]
    async fn test_multiple_select_submits_sorted_selection() {
        let mut app = loaded_app(vec![fixtures::record(
            1,
            AnswerType::MultipleSelect,
            r#"["a","c"]"#,
        )])
        .await;

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char(' '));
        app.handle_key(KeyCode::Up);
        app.handle_key(KeyCode::Up);
        app.handle_key(KeyCode::Char(' '));
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.session().current_answer(), Some(r#"["a","c"]"#));
        assert_eq!(app.session().score(), 1);
    }

    #[tokio::test]
    async fn test_click_on_graph_snaps_to_samples() {
        let mut app = loaded_app(vec![fixtures::record(
            1,
            AnswerType::ClickOnGraph,
            r#"{"x":1,"y":1}"#,
        )])
        .await;

        // Domain [-2, 2] at step 1 starts on the middle sample.
        assert_eq!(app.ui().graph_cursor, Some(2));
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.session().current_answer(), Some(r#"{"x":1,"y":1}"#));
        assert_eq!(app.session().score(), 1);
    }

    #[tokio::test]
    async fn test_hint_request_round_trip() {
        let mut app = loaded_app(vec![fixtures::record(5, AnswerType::Numeric, "4")]).await;

        app.handle_key(KeyCode::Char('h'));
        assert!(app.session().is_loading_hint());
        let event = app.next_event().await.unwrap();
        app.apply(event);

        assert_eq!(app.session().hint(), Some("hint for 5"));
    }

    #[tokio::test]
    async fn test_complete_returns_to_menu() {
        let mut app = loaded_app(Vec::new()).await;
        assert_eq!(app.session().phase(), Phase::Complete);

        assert!(!app.handle_key(KeyCode::Enter));
        assert_eq!(app.session().phase(), Phase::Welcome);
        assert_eq!(app.ui().focus, Focus::Menu);
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
