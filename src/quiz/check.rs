//! Answer checking per answer type.

use crate::models::{AnswerType, Question};

/// Whether `answer` is the correct answer encoding for `question`.
///
/// Multiple-select answers are JSON arrays of option strings compared as
/// sets; every other type compares the encodings exactly. Malformed input is
/// simply incorrect.
pub fn is_correct(question: &Question, answer: &str) -> bool {
    if answer.is_empty() {
        return false;
    }

    match question.answer_type {
        AnswerType::MultipleSelect => {
            match (parse_selection(answer), parse_selection(&question.correct_answer)) {
                (Some(submitted), Some(correct)) => submitted == correct,
                _ => false,
            }
        }
        AnswerType::Numeric | AnswerType::MultipleChoice | AnswerType::ClickOnGraph => {
            answer == question.correct_answer
        }
    }
}

/// Encode a multiple-select answer as a sorted JSON array.
pub fn encode_selection<I, S>(options: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut selected: Vec<String> = options.into_iter().map(Into::into).collect();
    selected.sort();
    serde_json::to_string(&selected).unwrap_or_else(|_| "[]".to_string())
}

fn parse_selection(encoded: &str) -> Option<Vec<String>> {
    let mut options: Vec<String> = serde_json::from_str(encoded).ok()?;
    options.sort();
    Some(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::question;

    #[test]
    fn test_empty_answer_is_never_correct() {
        for answer_type in [
            AnswerType::Numeric,
            AnswerType::MultipleChoice,
            AnswerType::MultipleSelect,
            AnswerType::ClickOnGraph,
        ] {
            let q = question(1, answer_type, "");
            assert!(!is_correct(&q, ""), "{:?}", answer_type);
        }
    }

    #[test]
    fn test_exact_match_types() {
        let numeric = question(1, AnswerType::Numeric, "4");
        assert!(is_correct(&numeric, "4"));
        assert!(!is_correct(&numeric, "4.0"));
        assert!(!is_correct(&numeric, " 4"));

        let choice = question(2, AnswerType::MultipleChoice, "b");
        assert!(is_correct(&choice, "b"));
        assert!(!is_correct(&choice, "B"));

        let click = question(3, AnswerType::ClickOnGraph, r#"{"x":0,"y":0}"#);
        assert!(is_correct(&click, r#"{"x":0,"y":0}"#));
        assert!(!is_correct(&click, r#"{"x":0.0,"y":0}"#));
    }

    #[test]
    fn test_multiple_select_ignores_order() {
        let q = question(1, AnswerType::MultipleSelect, r#"["a","c"]"#);

        assert!(is_correct(&q, r#"["a","c"]"#));
        assert!(is_correct(&q, r#"["c","a"]"#));
        assert!(is_correct(&q, &encode_selection(["c", "a"])));
        assert!(!is_correct(&q, r#"["a"]"#));
        assert!(!is_correct(&q, r#"["a","b","c"]"#));
    }

    #[test]
    fn test_multiple_select_malformed_is_incorrect() {
        let q = question(1, AnswerType::MultipleSelect, r#"["a","c"]"#);
        assert!(!is_correct(&q, "a,c"));
        assert!(!is_correct(&q, r#"[1, 2]"#));

        let broken_key = question(2, AnswerType::MultipleSelect, "not json");
        assert!(!is_correct(&broken_key, r#"["a"]"#));
    }

    #[test]
    fn test_encode_selection_sorts() {
        assert_eq!(encode_selection(["b", "a"]), r#"["a","b"]"#);
        assert_eq!(encode_selection(Vec::<String>::new()), "[]");
    }
}
