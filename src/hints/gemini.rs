//! Hints generated by Google's Gemini API.

use serde::{Deserialize, Serialize};

use crate::models::Question;

use super::{FALLBACK_HINT, HintProvider};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const TEMPERATURE: f32 = 0.5;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Tutor prompt asking for a conceptual, non-revealing hint.
pub fn build_prompt(question: &Question) -> String {
    format!(
        r#"You are a friendly and encouraging math tutor for high school students.
A student is working on a problem about the function {function}.
The question is: "{text}".

Provide a short, single-sentence hint to guide the student towards the correct concept or approach.
Do NOT give away the answer or perform the calculation. The hint should be conceptual.

Example:
If the question is "What is the limit of f(x) as x approaches 2?", a good hint would be "Think about what value the function gets closer and closer to as x gets infinitely near 2 from both sides."
A bad hint would be: "The answer is 4.""#,
        function = question.function_string,
        text = question.text,
    )
}

/// Client for the `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiHints {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiHints {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn generate(&self, prompt: String) -> Result<String, reqwest::Error> {
        let url = format!("{}/{}:generateContent", API_BASE, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let response: GenerateResponse = resp.json().await?;
        Ok(response.text().unwrap_or_else(|| {
            tracing::warn!("hint response from {} had no text", self.model);
            FALLBACK_HINT.to_string()
        }))
    }
}

impl HintProvider for GeminiHints {
    async fn fetch_hint(&self, question: &Question) -> String {
        match self.generate(build_prompt(question)).await {
            Ok(hint) => {
                tracing::info!("received hint for question {}", question.id);
                hint
            }
            Err(e) => {
                tracing::error!("error generating hint from Gemini: {e}");
                FALLBACK_HINT.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerType, fixtures};

    #[test]
    fn test_prompt_mentions_function_and_question() {
        let question = fixtures::question(4, AnswerType::Numeric, "4");
        let prompt = build_prompt(&question);

        assert!(prompt.contains("about the function f(x) = x²."));
        assert!(prompt.contains("The question is: \"Question 4\"."));
        assert!(prompt.contains("Do NOT give away the answer"));
    }

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":" Look at "},{"text":"the slope. "}],"role":"model"}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("Look at the slope."));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.text(), None);

        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(blocked.text(), None);
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hi".to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.5 },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"contents":[{"parts":[{"text":"hi"}]}],"generationConfig":{"temperature":0.5}}"#
        );
    }
}
