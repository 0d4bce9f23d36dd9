//! # graph-quiz
//!
//! A terminal calculus quiz where every question comes with the graph of
//! its function.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use graph_quiz::{Config, Quiz, QuizError};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let config = Config::parse();
//!     Quiz::from_config(&config).run().await
//! }
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod hints;
pub mod models;
pub mod plot;
pub mod quiz;
pub mod terminal;
mod ui;

use std::io;
use std::path::Path;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;

pub use app::{App, AppEvent};
pub use config::Config;
pub use data::{BankIssue, JsonQuestionBank, LoadError, QuestionSource};
pub use hints::{HintBackend, HintProvider};
pub use models::{AnswerType, Phase, Question};
pub use quiz::Session;

/// Failure of the quiz front end.
#[derive(Debug)]
pub enum QuizError {
    /// The question bank could not be read for an audit.
    Bank(LoadError),
    /// The terminal could not be driven.
    Terminal(io::Error),
}

impl std::fmt::Display for QuizError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizError::Bank(e) => write!(f, "cannot audit question bank: {}", e),
            QuizError::Terminal(e) => write!(f, "terminal error: {}", e),
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizError::Bank(e) => Some(e),
            QuizError::Terminal(e) => Some(e),
        }
    }
}

impl From<LoadError> for QuizError {
    fn from(err: LoadError) -> Self {
        QuizError::Bank(err)
    }
}

impl From<io::Error> for QuizError {
    fn from(err: io::Error) -> Self {
        QuizError::Terminal(err)
    }
}

/// A quiz instance that can be run in the terminal.
pub struct Quiz<Q, H> {
    app: App<Q, H>,
}

impl Quiz<JsonQuestionBank, HintBackend> {
    /// Build a quiz reading its questions from the configured JSON bank.
    pub fn from_config(config: &Config) -> Self {
        tracing::info!("using question bank {}", config.questions.display());
        Self::new(
            JsonQuestionBank::new(&config.questions),
            HintBackend::from_api_key(config.api_key.clone(), &config.model),
        )
    }
}

impl<Q: QuestionSource, H: HintProvider> Quiz<Q, H> {
    pub fn new(source: Q, hints: H) -> Self {
        Self {
            app: App::new(source, hints),
        }
    }

    /// Run the quiz in the terminal.
    ///
    /// This will take over the terminal, display the quiz UI, and return
    /// when the user quits. Must be called from within a Tokio runtime.
    pub async fn run(mut self) -> Result<(), QuizError> {
        let mut term = terminal::init()?;
        let result = run_event_loop(&mut term, &mut self.app).await;
        terminal::restore()?;
        result
    }

    /// Get a reference to the underlying app for custom handling.
    pub fn app(&self) -> &App<Q, H> {
        &self.app
    }

    /// Get a mutable reference to the underlying app for custom handling.
    pub fn app_mut(&mut self) -> &mut App<Q, H> {
        &mut self.app
    }
}

async fn run_event_loop<Q: QuestionSource, H: HintProvider>(
    terminal: &mut terminal::AppTerminal,
    app: &mut App<Q, H>,
) -> Result<(), QuizError> {
    let mut events = EventStream::new();

    loop {
        terminal.draw(|frame| ui::render(frame, app.session(), app.ui()))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key.code) {
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(event) = app.next_event() => app.apply(event),
        }
    }

    tracing::info!("quiz closed");
    Ok(())
}

/// Read the bank at `path` and report every problem found in it.
pub fn check_bank<P: AsRef<Path>>(path: P) -> Result<Vec<BankIssue>, QuizError> {
    let bank = data::load_questions_from_json(path)?;
    let total: usize = bank.values().map(Vec::len).sum();
    let issues = data::audit_bank(&bank);
    tracing::info!(
        "checked {} questions in {} topics, {} issues",
        total,
        bank.len(),
        issues.len()
    );
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_bank_names_the_audit() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_bank(dir.path().join("absent.json")).unwrap_err();

        assert!(matches!(err, QuizError::Bank(LoadError::Io { .. })));
        assert!(err.to_string().starts_with("cannot audit question bank: failed to read"));
    }
}
