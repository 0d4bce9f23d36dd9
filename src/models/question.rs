use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plot::{self, Function, Sample, sampler};

/// How a question's answer is entered, encoded and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerType {
    Numeric,
    MultipleChoice,
    MultipleSelect,
    ClickOnGraph,
}

impl AnswerType {
    pub fn has_options(self) -> bool {
        matches!(self, AnswerType::MultipleChoice | AnswerType::MultipleSelect)
    }
}

/// A labelled point revealed on the graph once the question is answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

/// A question as stored in the question bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: u32,
    pub topic: String,
    pub text: String,
    pub function_string: String,
    pub function_body: String,
    pub answer_type: AnswerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub explanation: String,
    pub domain: [f64; 2],
    pub step: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_points: Option<Vec<HighlightPoint>>,
}

/// Why a record was rejected while building a [`Question`].
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidQuestion {
    Step(f64),
    Domain([f64; 2]),
    TooManySamples,
    MissingOptions,
}

impl fmt::Display for InvalidQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidQuestion::Step(step) => write!(f, "step must be positive, got {}", step),
            InvalidQuestion::Domain([min, max]) => {
                write!(f, "domain [{}, {}] is not a closed interval", min, max)
            }
            InvalidQuestion::TooManySamples => write!(
                f,
                "domain and step produce more than {} samples",
                sampler::MAX_SAMPLES
            ),
            InvalidQuestion::MissingOptions => write!(f, "choice question without options"),
        }
    }
}

impl std::error::Error for InvalidQuestion {}

/// A loaded question with its function compiled and graph pre-sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: u32,
    pub topic: String,
    pub text: String,
    pub function_string: String,
    pub function_body: String,
    pub answer_type: AnswerType,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub domain: [f64; 2],
    pub step: f64,
    pub highlight_points: Vec<HighlightPoint>,
    function: Function,
    samples: Vec<Sample>,
}

impl Question {
    pub fn from_record(record: QuestionRecord) -> Result<Self, InvalidQuestion> {
        let [min, max] = record.domain;
        if !record.step.is_finite() || record.step <= 0.0 {
            return Err(InvalidQuestion::Step(record.step));
        }
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(InvalidQuestion::Domain(record.domain));
        }

        let options = record.options.unwrap_or_default();
        if record.answer_type.has_options() && options.is_empty() {
            return Err(InvalidQuestion::MissingOptions);
        }

        let conceptual = plot::is_conceptual(&record.function_body);
        let (function, samples) = if conceptual {
            (Function::undefined(), Vec::new())
        } else {
            if sampler::sample_count(min, max, record.step).is_none() {
                return Err(InvalidQuestion::TooManySamples);
            }
            let function = Function::compile(&record.function_body);
            let samples = plot::sample(record.domain, record.step, |x| function.eval(x));
            (function, samples)
        };

        Ok(Self {
            id: record.id,
            topic: record.topic,
            text: record.text,
            function_string: record.function_string,
            function_body: record.function_body,
            answer_type: record.answer_type,
            options,
            correct_answer: record.correct_answer,
            explanation: record.explanation,
            domain: record.domain,
            step: record.step,
            highlight_points: record.highlight_points.unwrap_or_default(),
            function,
            samples,
        })
    }

    /// Conceptual questions carry no graph.
    pub fn is_conceptual(&self) -> bool {
        plot::is_conceptual(&self.function_body)
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Graph samples, empty for conceptual questions.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(id: u32, answer_type: AnswerType, correct: &str) -> QuestionRecord {
        QuestionRecord {
            id,
            topic: "Functions and Graphs".to_string(),
            text: format!("Question {}", id),
            function_string: "f(x) = x²".to_string(),
            function_body: "x * x".to_string(),
            answer_type,
            options: answer_type
                .has_options()
                .then(|| vec!["a".to_string(), "b".to_string(), "c".to_string()]),
            correct_answer: correct.to_string(),
            explanation: "Because.".to_string(),
            domain: [-2.0, 2.0],
            step: 1.0,
            highlight_points: None,
        }
    }

    pub fn question(id: u32, answer_type: AnswerType, correct: &str) -> Question {
        Question::from_record(record(id, answer_type, correct)).unwrap()
    }
}
