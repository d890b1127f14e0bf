use std::str::FromStr;

use thiserror::Error;

use crate::quiz::{Difficulty, QuestionKind};

pub const DEFAULT_API_URL: &str = "https://opentdb.com/api.php";
pub const DEFAULT_AMOUNT: u8 = 10;
// Open Trivia DB refuses more than this per request
pub const MAX_AMOUNT: u8 = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be between 1 and 50, got {value:?}")]
    InvalidAmount { key: &'static str, value: String },
    #[error("{key} must be a number, got {value:?}")]
    NotANumber { key: &'static str, value: String },
    #[error("{key} must be one of {expected}, got {value:?}")]
    UnknownValue {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub amount: u8,
    pub category: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub kind: Option<QuestionKind>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            amount: DEFAULT_AMOUNT,
            category: None,
            difficulty: None,
            kind: None,
        }
    }
}

impl Config {
    /// Reads the `TRIVIA_*` variables. `.env` should already be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(url) = var("TRIVIA_API_URL") {
            config.api_url = url;
        }
        if let Some(amount) = var("TRIVIA_AMOUNT") {
            config.amount = match amount.trim().parse::<u8>() {
                Ok(n) if (1..=MAX_AMOUNT).contains(&n) => n,
                _ => {
                    return Err(ConfigError::InvalidAmount {
                        key: "TRIVIA_AMOUNT",
                        value: amount,
                    })
                }
            };
        }
        if let Some(category) = var("TRIVIA_CATEGORY") {
            config.category = Some(parse_number("TRIVIA_CATEGORY", &category)?);
        }
        if let Some(difficulty) = var("TRIVIA_DIFFICULTY") {
            config.difficulty = Some(match difficulty.trim().to_lowercase().as_str() {
                "easy" => Difficulty::Easy,
                "medium" => Difficulty::Medium,
                "hard" => Difficulty::Hard,
                _ => {
                    return Err(ConfigError::UnknownValue {
                        key: "TRIVIA_DIFFICULTY",
                        expected: "easy, medium, hard",
                        value: difficulty,
                    })
                }
            });
        }
        if let Some(kind) = var("TRIVIA_TYPE") {
            config.kind = Some(match kind.trim().to_lowercase().as_str() {
                "multiple" => QuestionKind::Multiple,
                "boolean" => QuestionKind::Boolean,
                _ => {
                    return Err(ConfigError::UnknownValue {
                        key: "TRIVIA_TYPE",
                        expected: "multiple, boolean",
                        value: kind,
                    })
                }
            });
        }

        Ok(config)
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::NotANumber {
        key,
        value: value.to_string(),
    })
}
