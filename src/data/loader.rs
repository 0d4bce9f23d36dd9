use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{AnswerType, Question, QuestionRecord};
use crate::plot::{Function, is_conceptual};

use super::{QuestionSource, catalog};

pub const DEFAULT_QUESTIONS_PATH: &str = "questions.json";

/// The question bank document: topic name to its questions.
pub type QuestionBank = HashMap<String, Vec<QuestionRecord>>;

/// Error reading or parsing a question bank.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            LoadError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
        }
    }
}

/// Read a whole question bank synchronously.
pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<QuestionBank, LoadError> {
    let path = path.as_ref();
    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bank(path, &json_content)
}

fn parse_bank(path: &Path, json_content: &str) -> Result<QuestionBank, LoadError> {
    serde_json::from_str(json_content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate records, skipping the ones that cannot be shown.
///
/// Ids must be unique within a topic; later records reusing an id are
/// dropped.
pub fn build_questions(records: Vec<QuestionRecord>) -> Vec<Question> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id;
            if !seen.insert(id) {
                tracing::warn!("skipping question {}: duplicate id", id);
                return None;
            }
            match Question::from_record(record) {
                Ok(question) => Some(question),
                Err(err) => {
                    tracing::warn!("skipping question {}: {}", id, err);
                    None
                }
            }
        })
        .collect()
}

/// A problem found in a question bank by [`audit_bank`].
#[derive(Debug, Clone, PartialEq)]
pub struct BankIssue {
    pub topic: String,
    pub id: Option<u32>,
    pub message: String,
}

impl fmt::Display for BankIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "[{}] question {}: {}", self.topic, id, self.message),
            None => write!(f, "[{}] {}", self.topic, self.message),
        }
    }
}

/// Check every record of a bank, reporting issues sorted by topic and id.
pub fn audit_bank(bank: &QuestionBank) -> Vec<BankIssue> {
    let mut issues = Vec::new();

    for (topic, records) in bank {
        if !catalog::topics().any(|(_, known)| known == topic) {
            issues.push(BankIssue {
                topic: topic.clone(),
                id: None,
                message: "topic is not in the course outline".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for record in records {
            if !seen.insert(record.id) {
                issues.push(BankIssue {
                    topic: topic.clone(),
                    id: Some(record.id),
                    message: "duplicate id within the topic".to_string(),
                });
            }
            audit_record(topic, record, &mut issues);
        }
    }

    issues.sort_by(|a, b| a.topic.cmp(&b.topic).then(a.id.cmp(&b.id)));
    issues
}

fn audit_record(topic: &str, record: &QuestionRecord, issues: &mut Vec<BankIssue>) {
    let mut report = |message: String| {
        issues.push(BankIssue {
            topic: topic.to_string(),
            id: Some(record.id),
            message,
        })
    };

    if record.topic != topic {
        report(format!("listed under a different topic ({})", record.topic));
    }
    if !is_conceptual(&record.function_body) {
        if let Err(err) = Function::parse(&record.function_body) {
            report(format!("function body does not parse: {}", err));
        }
    }

    let question = match Question::from_record(record.clone()) {
        Ok(question) => question,
        Err(err) => {
            report(err.to_string());
            return;
        }
    };

    match question.answer_type {
        AnswerType::MultipleChoice => {
            if !question.options.contains(&question.correct_answer) {
                report("correct answer is not one of the options".to_string());
            }
        }
        AnswerType::MultipleSelect => {
            match serde_json::from_str::<Vec<String>>(&question.correct_answer) {
                Ok(expected) if expected.iter().all(|e| question.options.contains(e)) => {}
                Ok(_) => report("correct answer names an unknown option".to_string()),
                Err(_) => report("correct answer is not a JSON array of options".to_string()),
            }
        }
        AnswerType::ClickOnGraph => {
            let matches_sample = question
                .samples()
                .iter()
                .filter_map(|sample| sample.encode())
                .any(|encoded| encoded == question.correct_answer);
            if !matches_sample {
                report("correct answer matches no sampled point".to_string());
            }
        }
        AnswerType::Numeric => {}
    }
}

/// A question bank stored as a JSON file, re-read on every request.
#[derive(Debug, Clone)]
pub struct JsonQuestionBank {
    path: PathBuf,
}

impl JsonQuestionBank {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonQuestionBank {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTIONS_PATH)
    }
}

impl QuestionSource for JsonQuestionBank {
    async fn load_questions(&self, topic: &str) -> Result<Vec<QuestionRecord>, LoadError> {
        let json_content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        let mut bank = parse_bank(&self.path, &json_content)?;

        let records = bank.remove(topic).unwrap_or_default();
        if records.is_empty() {
            tracing::warn!("no questions found for topic: {}", topic);
        } else {
            tracing::info!("loaded {} questions for {}", records.len(), topic);
        }
        Ok(records)
    }
}
