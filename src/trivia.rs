use std::fmt;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::config::Config;
use crate::quiz::{Difficulty, Question, QuestionKind, QuizError};

/// Where quiz questions come from. One call per quiz run, no retries.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch(&self, amount: u8) -> Result<Vec<Question>, QuizError>;
}

/// The `response_code` of an Open Trivia DB answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    NoResults,
    InvalidParameter,
    TokenNotFound,
    TokenEmpty,
    RateLimited,
    Unknown(u8),
}

impl From<u8> for ResponseCode {
    fn from(code: u8) -> Self {
        match code {
            0 => ResponseCode::Success,
            1 => ResponseCode::NoResults,
            2 => ResponseCode::InvalidParameter,
            3 => ResponseCode::TokenNotFound,
            4 => ResponseCode::TokenEmpty,
            5 => ResponseCode::RateLimited,
            other => ResponseCode::Unknown(other),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Success => f.write_str("success"),
            ResponseCode::NoResults => f.write_str("not enough questions for the query"),
            ResponseCode::InvalidParameter => f.write_str("invalid parameter"),
            ResponseCode::TokenNotFound => f.write_str("session token not found"),
            ResponseCode::TokenEmpty => f.write_str("session token exhausted"),
            ResponseCode::RateLimited => f.write_str("too many requests"),
            ResponseCode::Unknown(code) => write!(f, "unknown response code {}", code),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct TriviaResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<Question>,
}

pub struct OpenTriviaClient {
    client: Client,
    api_url: String,
    category: Option<u32>,
    difficulty: Option<Difficulty>,
    kind: Option<QuestionKind>,
}

impl OpenTriviaClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            category: None,
            difficulty: None,
            kind: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            category: config.category,
            difficulty: config.difficulty,
            kind: config.kind,
            ..Self::new(config.api_url.clone())
        }
    }

    fn query(&self, amount: u8) -> Vec<(&'static str, String)> {
        let mut query = vec![("amount", amount.to_string())];
        if let Some(category) = self.category {
            query.push(("category", category.to_string()));
        }
        if let Some(difficulty) = self.difficulty {
            query.push(("difficulty", difficulty.as_str().to_string()));
        }
        if let Some(kind) = self.kind {
            query.push(("type", kind.as_str().to_string()));
        }
        query
    }
}

#[async_trait]
impl QuestionSource for OpenTriviaClient {
    async fn fetch(&self, amount: u8) -> Result<Vec<Question>, QuizError> {
        debug!("requesting {} questions from {}", amount, self.api_url);
        let response = self
            .client
            .get(&self.api_url)
            .query(&self.query(amount))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuizError::FetchStatus(status.as_u16()));
        }

        let body: TriviaResponse = response.json().await?;
        match ResponseCode::from(body.response_code) {
            ResponseCode::Success => Ok(body.results),
            code => Err(QuizError::ApiRejected(code)),
        }
    }
}
