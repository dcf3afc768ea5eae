use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

pub const GREETINGS: [&str; 2] = [
    "Hi there! 👋",
    "My name is Goaliath. I will help you set your activities reminders😊",
];

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("Empty response from server")]
    Empty,
    #[error("Invalid response format")]
    InvalidFormat,
    #[error("{0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    pub is_user: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub messages: Vec<ChatMessage>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            messages: GREETINGS.iter().map(|text| ChatMessage::assistant(*text)).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookRequest<'a> {
    message: &'a str,
    user_id: &'a str,
    conversation_history: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct WebhookReply {
    response: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatRelay {
    client: Client,
    webhook_url: String,
}

impl ChatRelay {
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            webhook_url: webhook_url.into(),
        })
    }

    /// Sends `message` with the prior history and returns the reply text.
    pub async fn ask(
        &self,
        message: &str,
        user_id: &str,
        history: &[ChatMessage],
    ) -> Result<String, ChatError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookRequest {
                message,
                user_id,
                conversation_history: history,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }
        parse_reply(&response.text().await?)
    }

    /// Appends the user's message and the assistant's answer (or the failure
    /// text) to `transcript`. Blank messages are ignored.
    pub async fn converse(&self, transcript: &mut Transcript, message: &str, user_id: &str) {
        if message.trim().is_empty() {
            return;
        }

        let history = transcript.messages.clone();
        transcript.messages.push(ChatMessage::user(message));
        let reply = match self.ask(message, user_id, &history).await {
            Ok(reply) => reply,
            Err(err) => {
                error!("chat webhook failed: {err}");
                format!("Error: {err}")
            }
        };
        transcript.messages.push(ChatMessage::assistant(reply));
    }
}

fn parse_reply(text: &str) -> Result<String, ChatError> {
    if text.trim().is_empty() {
        return Err(ChatError::Empty);
    }
    let reply: WebhookReply = serde_json::from_str(text).map_err(|err| {
        warn!("chat webhook returned non-JSON body: {err}");
        ChatError::InvalidFormat
    })?;
    reply
        .response
        .filter(|response| !response.is_empty())
        .ok_or(ChatError::InvalidFormat)
}
