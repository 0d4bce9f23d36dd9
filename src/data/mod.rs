//! Where questions come from.

pub mod catalog;
mod loader;

use std::future::Future;

use crate::models::QuestionRecord;

pub use loader::{
    BankIssue, DEFAULT_QUESTIONS_PATH, JsonQuestionBank, LoadError, QuestionBank, audit_bank,
    build_questions, load_questions_from_json,
};

/// Supplies the questions of a topic.
pub trait QuestionSource: Send + Sync + 'static {
    fn load_questions(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<Vec<QuestionRecord>, LoadError>> + Send;
}
