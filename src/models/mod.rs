mod question;
mod state;

#[cfg(test)]
pub(crate) use question::fixtures;
pub use question::{AnswerType, HighlightPoint, InvalidQuestion, Question, QuestionRecord};
pub use state::Phase;
