use std::path::PathBuf;

use clap::Parser;

use crate::data::DEFAULT_QUESTIONS_PATH;
use crate::hints::DEFAULT_MODEL;

pub const DEFAULT_LOG_FILE: &str = "graph-quiz.log";

/// Graph-based calculus practice in the terminal.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// JSON file to load the question bank from
    #[arg(short, long, env = "QUIZ_QUESTIONS", default_value = DEFAULT_QUESTIONS_PATH)]
    pub questions: PathBuf,

    /// File the log is written to while the terminal UI is running
    #[arg(long, env = "QUIZ_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Gemini API key; hints are disabled without one
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model used for hints
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Check the question bank for problems and exit
    #[arg(long)]
    pub check: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["graph-quiz"]).unwrap();

        assert_eq!(config.questions, PathBuf::from("questions.json"));
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        assert!(!config.check);
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "graph-quiz",
            "-q",
            "bank.json",
            "--model",
            "gemini-pro",
            "--api-key",
            "secret",
            "--check",
        ])
        .unwrap();

        assert_eq!(config.questions, PathBuf::from("bank.json"));
        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert!(config.check);
    }

    #[test]
    fn test_config_is_well_formed() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
