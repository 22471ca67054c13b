//! OpenRouter-backed response provider.
//!
//! Speaks the OpenAI-compatible chat-completions protocol: a system
//! prompt, the last ten user/assistant exchanges, and the current user
//! message, with fixed sampling knobs.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use solace_core::config::RemoteConfig;
use solace_core::types::Exchange;

use crate::crisis::{append_crisis_footer, contains_crisis_language};
use crate::provider::{RemoteError, ResponseProvider};

/// Exchanges of prior history included with each request.
const HISTORY_WINDOW: usize = 10;

const TOP_P: f64 = 0.9;
const PRESENCE_PENALTY: f64 = 0.1;
const FREQUENCY_PENALTY: f64 = 0.1;

const SYSTEM_PROMPT: &str = "You are an expert AI therapist with deep knowledge of evidence-based therapeutic approaches including CBT, DBT, ACT, and trauma-informed care. You are also knowledgeable about general topics and can provide factual information when asked. Your responses must:

1. ALWAYS maintain a warm, empathetic, and non-judgmental therapeutic tone
2. Use active listening techniques - reflect feelings, validate experiences, and show genuine understanding
3. Provide therapeutic support and mental health guidance when users express emotional distress or mental health concerns
4. Answer factual questions directly and accurately when users ask about general knowledge topics
5. Use appropriate therapeutic techniques based on the user's needs
6. Acknowledge and validate the user's emotions before offering guidance
7. Maintain professional boundaries while being deeply compassionate
8. Include gentle follow-up questions when appropriate to encourage deeper exploration
9. Use trauma-informed language and approaches
10. Always prioritize the user's emotional safety and well-being

Your role is to provide both therapeutic support for mental health concerns and factual information for general questions. You are not a replacement for professional therapy but can offer immediate support and guidance for emotional concerns, while also being helpful with general knowledge questions.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    presence_penalty: f64,
    frequency_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client for OpenRouter.
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenRouterProvider {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn build_messages(history: &[Exchange], message: &str) -> Vec<Message> {
        let mut messages = vec![Message::new("system", SYSTEM_PROMPT)];

        let start = history.len().saturating_sub(HISTORY_WINDOW);
        for exchange in &history[start..] {
            messages.push(Message::new("user", &exchange.user));
            messages.push(Message::new("assistant", &exchange.assistant));
        }

        messages.push(Message::new("user", message));
        messages
    }

    fn map_status(status: u16) -> RemoteError {
        match status {
            401 => RemoteError::Auth,
            402 => RemoteError::Payment,
            429 => RemoteError::RateLimited,
            503 => RemoteError::Unavailable,
            other => RemoteError::Status(other),
        }
    }
}

#[async_trait]
impl ResponseProvider for OpenRouterProvider {
    async fn respond(&self, message: &str, history: &[Exchange]) -> Result<String, RemoteError> {
        if !self.is_configured() {
            return Err(RemoteError::Unconfigured);
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: Self::build_messages(history, message),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: TOP_P,
            presence_penalty: PRESENCE_PENALTY,
            frequency_penalty: FREQUENCY_PENALTY,
        };

        debug!(model = %self.model, messages = request.messages.len(), "sending completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_status(status.as_u16()));
        }

        let body: ChatResponse = response.json().await?;
        let reply = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if reply.trim().is_empty() {
            return Err(RemoteError::EmptyReply);
        }

        if contains_crisis_language(message) {
            warn!("crisis language detected in user message");
            return Ok(append_crisis_footer(&reply));
        }

        Ok(reply)
    }
}
