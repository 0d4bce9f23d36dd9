//! Where hints come from.

mod gemini;

use std::future::Future;

use crate::models::Question;

pub use gemini::{DEFAULT_MODEL, GeminiHints, build_prompt};

/// Returned whenever a provider cannot produce a hint.
pub const FALLBACK_HINT: &str =
    "I'm having trouble thinking of a hint right now. Try to think about the core definition of the topic!";

/// Returned when no provider credentials are configured.
pub const DISABLED_HINT: &str =
    "Hints are unavailable: no API key is configured (set GEMINI_API_KEY).";

/// Produces a short hint for a question.
///
/// Providers absorb their own failures and always settle with a usable
/// string, falling back to [`FALLBACK_HINT`].
pub trait HintProvider: Send + Sync + 'static {
    fn fetch_hint(&self, question: &Question) -> impl Future<Output = String> + Send;
}

/// The hint provider chosen from configuration.
#[derive(Debug, Clone)]
pub enum HintBackend {
    Gemini(GeminiHints),
    Disabled,
}

impl HintBackend {
    pub fn from_api_key(api_key: Option<String>, model: &str) -> Self {
        match api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => HintBackend::Gemini(GeminiHints::new(key, model)),
            None => {
                tracing::warn!("no API key configured, hints are disabled");
                HintBackend::Disabled
            }
        }
    }
}

impl HintProvider for HintBackend {
    async fn fetch_hint(&self, question: &Question) -> String {
        match self {
            HintBackend::Gemini(gemini) => gemini.fetch_hint(question).await,
            HintBackend::Disabled => DISABLED_HINT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnswerType, fixtures};

    #[test]
    fn test_blank_key_disables_hints() {
        assert!(matches!(
            HintBackend::from_api_key(Some("  ".to_string()), DEFAULT_MODEL),
            HintBackend::Disabled
        ));
        assert!(matches!(
            HintBackend::from_api_key(None, DEFAULT_MODEL),
            HintBackend::Disabled
        ));
        assert!(matches!(
            HintBackend::from_api_key(Some("key".to_string()), DEFAULT_MODEL),
            HintBackend::Gemini(_)
        ));
    }

    #[tokio::test]
    async fn test_disabled_backend_still_answers() {
        let question = fixtures::question(1, AnswerType::Numeric, "4");
        let hint = HintBackend::Disabled.fetch_hint(&question).await;
        assert_eq!(hint, DISABLED_HINT);
    }
}
