use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TutorError;

const SYSTEM_PROMPT: &str = "You are Dr. Rabbit, a cheerful and patient dental health tutor for \
children. Answer in short, simple sentences a young learner can follow. Focus on brushing, \
flossing, healthy food and visiting the dentist. If a question is not about teeth or oral \
health, gently steer the conversation back to dental care.";

/// Confidence reported for every successful model answer.
pub const ANSWER_CONFIDENCE: f32 = 0.9;

/// Follow-up prompts offered with every answer.
pub const SUGGESTIONS: [&str; 2] = [
    "Ask about tooth brushing techniques",
    "Learn about healthy foods for teeth",
];

#[derive(Clone, Debug, PartialEq)]
pub struct TutorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl TutorConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.groq.com/openai/v1";
    pub const DEFAULT_MODEL: &'static str = "openai/gpt-oss-20b";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Config with the given credential and default model settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.into(),
            temperature: 0.7,
            max_tokens: 300,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `GROQ_API_KEY`, `QUEST_AI_BASE_URL`, `QUEST_AI_MODEL` and
    /// `QUEST_AI_TIMEOUT_SECS` through `var`, which must already treat blank
    /// values as unset. Returns `None` when no key is set.
    ///
    /// A timeout that is zero or not a number keeps the default.
    #[must_use]
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = var("GROQ_API_KEY")?;
        let base_url = var("QUEST_AI_BASE_URL").unwrap_or_else(|| Self::DEFAULT_BASE_URL.into());
        let mut config = Self::new(base_url, api_key);
        if let Some(model) = var("QUEST_AI_MODEL") {
            config.model = model;
        }
        if let Some(secs) = var("QUEST_AI_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            config.timeout = Duration::from_secs(secs);
        }
        Some(config)
    }
}

/// A learner's question for the tutor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TutorQuery {
    pub question: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// The tutor's answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TutorReply {
    pub response: String,
    pub confidence: f32,
    pub suggestions: Vec<String>,
}

#[derive(Clone)]
struct Upstream {
    client: Client,
    config: TutorConfig,
}

/// Stateless proxy to an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct TutorService {
    upstream: Option<Upstream>,
}

impl TutorService {
    /// A tutor with no credential; every question fails with `Disabled`.
    #[must_use]
    pub fn disabled() -> Self {
        Self { upstream: None }
    }

    /// # Errors
    ///
    /// Returns `TutorError::Http` if the HTTP client cannot be built.
    pub fn new(config: TutorConfig) -> Result<Self, TutorError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            upstream: Some(Upstream { client, config }),
        })
    }

    /// Builds a tutor from optional config, disabled when there is none.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: Option<TutorConfig>) -> Result<Self, TutorError> {
        config.map_or_else(|| Ok(Self::disabled()), Self::new)
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.upstream.is_some()
    }

    /// Forward a question to the model.
    ///
    /// # Errors
    ///
    /// Returns `TutorError` when the tutor is not configured, the request
    /// fails or times out, or the model returns no content.
    pub async fn ask(&self, query: &TutorQuery) -> Result<TutorReply, TutorError> {
        let Upstream { client, config } = self.upstream.as_ref().ok_or(TutorError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: compose_user_message(&query.question, query.context.as_deref()),
                },
            ],
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        debug!(model = %config.model, user_id = ?query.user_id, "asking AI tutor");

        let response = client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TutorError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(TutorError::EmptyResponse)?;

        Ok(TutorReply {
            response: content,
            confidence: ANSWER_CONFIDENCE,
            suggestions: SUGGESTIONS.iter().map(ToString::to_string).collect(),
        })
    }
}

/// Builds the user turn, prefixing the optional lesson context.
#[must_use]
pub fn compose_user_message(question: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("Context: {context}\n\nQuestion: {question}"),
        None => question.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
