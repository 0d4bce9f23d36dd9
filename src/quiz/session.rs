//! The quiz session: topic, questions, answers, score and hint.
//!
//! All state changes go through [`Session`]. Asynchronous work (loading a
//! topic, fetching a hint) is split into a start call that hands out a
//! ticket and a finish call that applies the result only if the ticket still
//! matches, so a slow response can never land in a newer session.

use std::collections::HashMap;

use crate::data::LoadError;
use crate::models::{Phase, Question};

use super::check;
use super::hint::{HintCoordinator, HintTicket};

/// Identifies one topic load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    topic: String,
}

impl LoadTicket {
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// A hint request to hand to a hint provider.
#[derive(Debug, Clone)]
pub struct HintRequest {
    pub ticket: HintTicket,
    pub question: Question,
}

#[derive(Debug, Default)]
pub struct Session {
    active_topic: Option<String>,
    questions: Vec<Question>,
    current_index: usize,
    answers: HashMap<u32, String>,
    score: usize,
    hints: HintCoordinator,
    loading: bool,
    load_generation: u64,
    notification: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.active_topic.is_none() {
            Phase::Welcome
        } else if self.loading {
            Phase::Loading
        } else if self.current_index < self.questions.len() {
            Phase::InProgress
        } else {
            Phase::Complete
        }
    }

    pub fn active_topic(&self) -> Option<&str> {
        self.active_topic.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.loading {
            return None;
        }
        self.questions.get(self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn answer_for(&self, question_id: u32) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    pub fn current_answer(&self) -> Option<&str> {
        self.current_question().and_then(|q| self.answer_for(q.id))
    }

    /// Correctness of the recorded answer, `None` when unanswered.
    pub fn is_correct_answer(&self, question: &Question) -> Option<bool> {
        self.answer_for(question.id)
            .map(|answer| check::is_correct(question, answer))
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn hint(&self) -> Option<&str> {
        self.hints.hint()
    }

    pub fn is_loading_questions(&self) -> bool {
        self.loading
    }

    pub fn is_loading_hint(&self) -> bool {
        self.hints.is_loading()
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_deref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Switch to `topic` and start loading its questions. Any load still in
    /// flight is superseded.
    pub fn select_topic(&mut self, topic: &str) -> LoadTicket {
        self.load_generation += 1;
        self.active_topic = Some(topic.to_string());
        self.questions.clear();
        self.current_index = 0;
        self.answers.clear();
        self.score = 0;
        self.hints.reset();
        self.loading = true;

        tracing::info!("selected topic {}", topic);
        LoadTicket {
            generation: self.load_generation,
            topic: topic.to_string(),
        }
    }

    /// Apply the outcome of a load. Returns `false` when the ticket is stale.
    ///
    /// A failed load leaves a notification and returns to the welcome state.
    pub fn finish_loading(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<Question>, LoadError>,
    ) -> bool {
        let current = self.loading
            && ticket.generation == self.load_generation
            && self.active_topic.as_deref() == Some(ticket.topic.as_str());
        if !current {
            tracing::debug!("dropping stale questions for {}", ticket.topic);
            return false;
        }

        self.loading = false;
        match result {
            Ok(questions) => {
                self.questions = questions;
            }
            Err(e) => {
                tracing::error!("could not load questions for {}: {}", ticket.topic, e);
                self.notification = Some(format!(
                    "Failed to load questions for {}: {}",
                    ticket.topic, e
                ));
                self.active_topic = None;
                self.questions.clear();
            }
        }
        true
    }

    /// Record an answer for the current question. Returns its correctness,
    /// or `None` if nothing was recorded (no question, already answered).
    pub fn submit_answer(&mut self, answer: &str) -> Option<bool> {
        let question = self.current_question()?;
        if self.answers.contains_key(&question.id) {
            return None;
        }

        let id = question.id;
        let correct = check::is_correct(question, answer);
        self.answers.insert(id, answer.to_string());
        if correct {
            self.score += 1;
        }

        tracing::debug!("answered question {} (correct: {})", id, correct);
        Some(correct)
    }

    /// Move to the next question, or to completion from the last one.
    pub fn advance(&mut self) -> bool {
        if self.phase() != Phase::InProgress {
            return false;
        }
        self.current_index += 1;
        self.hints.reset();
        true
    }

    /// Move to the previous question. No-op on the first question.
    pub fn retreat(&mut self) -> bool {
        if self.phase() != Phase::InProgress || self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        self.hints.reset();
        true
    }

    /// Leave a completed topic and return to the welcome state.
    pub fn reset_to_welcome(&mut self) -> bool {
        if self.phase() != Phase::Complete {
            return false;
        }
        self.active_topic = None;
        self.questions.clear();
        self.current_index = 0;
        self.answers.clear();
        self.score = 0;
        self.hints.reset();
        true
    }

    /// Start a hint request for the current question, if one is needed.
    pub fn request_hint(&mut self) -> Option<HintRequest> {
        if self.phase() != Phase::InProgress {
            return None;
        }
        let question = self.questions.get(self.current_index)?.clone();
        let ticket = self.hints.request(question.id)?;
        Some(HintRequest { ticket, question })
    }

    /// Apply a settled hint. Returns `false` when the question has changed.
    pub fn finish_hint(&mut self, ticket: HintTicket, text: String) -> bool {
        self.hints.complete(ticket, text)
    }
}
