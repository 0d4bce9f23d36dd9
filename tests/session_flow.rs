use std::time::Duration;

use crossterm::event::KeyCode;
use graph_quiz::app::App;
use graph_quiz::models::QuestionRecord;
use graph_quiz::{HintProvider, LoadError, Phase, Question, QuestionSource};

const SLOW_TOPIC: &str = "Functions and Graphs";
const FAST_TOPIC: &str = "Rate of Change";

fn record(id: u32, topic: &str, body: &str, answer: &str) -> QuestionRecord {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "topic": topic,
        "text": format!("What is f(1) for question {}?", id),
        "functionString": format!("f(x) = {}", body),
        "functionBody": body,
        "answerType": "numeric",
        "correctAnswer": answer,
        "explanation": "Substitute x = 1.",
        "domain": [-3, 3],
        "step": 0.5
    }))
    .unwrap()
}

/// Serves each topic its own questions; the slow topic takes a while.
struct TopicSource;

impl QuestionSource for TopicSource {
    async fn load_questions(&self, topic: &str) -> Result<Vec<QuestionRecord>, LoadError> {
        if topic == SLOW_TOPIC {
            tokio::time::sleep(Duration::from_millis(50)).await;
            return Ok(vec![record(10, topic, "x * x", "1")]);
        }
        Ok(vec![
            record(1, topic, "2 * x + 1", "3"),
            record(2, topic, "x ^ 3", "1"),
        ])
    }
}

struct SlowHints;

impl HintProvider for SlowHints {
    async fn fetch_hint(&self, question: &Question) -> String {
        tokio::time::sleep(Duration::from_millis(20)).await;
        format!("Look at {}", question.function_string)
    }
}

async fn settle(app: &mut App<TopicSource, SlowHints>) {
    let event = app.next_event().await.unwrap();
    app.apply(event);
}

#[tokio::test]
async fn test_superseded_topic_load_is_ignored() {
    let mut app = App::new(TopicSource, SlowHints);

    app.select_topic(SLOW_TOPIC);
    app.select_topic(FAST_TOPIC);
    assert_eq!(app.session().phase(), Phase::Loading);

    settle(&mut app).await;
    assert_eq!(app.session().active_topic(), Some(FAST_TOPIC));
    assert_eq!(app.session().questions().len(), 2);

    // The slow topic's questions arrive late and must not replace the fast ones.
    settle(&mut app).await;
    assert_eq!(app.session().active_topic(), Some(FAST_TOPIC));
    let ids: Vec<u32> = app.session().questions().iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(app.session().phase(), Phase::InProgress);
}

#[tokio::test]
async fn test_full_topic_then_back_to_welcome() {
    let mut app = App::new(TopicSource, SlowHints);
    app.select_topic(FAST_TOPIC);
    settle(&mut app).await;

    assert_eq!(app.submit_answer("3"), Some(true));
    assert_eq!(app.submit_answer("0"), None);
    app.advance();
    for c in "1".chars() {
        app.handle_key(KeyCode::Char(c));
    }
    app.handle_key(KeyCode::Enter);
    app.advance();

    let session = app.session();
    assert_eq!(session.phase(), Phase::Complete);
    assert_eq!(session.score(), 2);
    assert_eq!(session.answered_count(), 2);

    app.reset_to_welcome();
    assert_eq!(app.session().phase(), Phase::Welcome);
    assert_eq!(app.session().score(), 0);
    assert!(app.session().questions().is_empty());
}

#[tokio::test]
async fn test_hint_for_previous_question_is_dropped() {
    let mut app = App::new(TopicSource, SlowHints);
    app.select_topic(FAST_TOPIC);
    settle(&mut app).await;

    app.request_hint();
    assert!(app.session().is_loading_hint());
    app.advance();
    assert!(!app.session().is_loading_hint());

    settle(&mut app).await;
    assert_eq!(app.session().hint(), None);

    app.request_hint();
    settle(&mut app).await;
    assert_eq!(app.session().hint(), Some("Look at f(x) = x ^ 3"));
}

#[tokio::test]
async fn test_missing_bank_returns_to_welcome_with_notice() {
    let dir = tempfile::tempdir().unwrap();
    let bank = graph_quiz::JsonQuestionBank::new(dir.path().join("missing.json"));
    let mut app = App::new(bank, SlowHints);

    app.select_topic(FAST_TOPIC);
    let event = app.next_event().await.unwrap();
    app.apply(event);

    assert_eq!(app.session().phase(), Phase::Welcome);
    let notice = app.session().notification().unwrap();
    assert!(notice.starts_with("Failed to load questions for Rate of Change"));
}
