//! Chat assistant.
//!
//! Keeps the conversation transcript and asks the remote assistant for
//! replies. Whenever the remote cannot answer (disabled, unreachable, error
//! status, bad body) the reply comes from [`fallback_reply`] instead, so a
//! message always gets an answer.

mod fallback;

pub use fallback::{DEFAULT_REPLY, fallback_reply};

use chrono::{DateTime, Utc};
use tracing::instrument;

use medicart_core::ChatSender;

use crate::api::{ApiClient, ChatContext};

/// First message of every conversation.
pub const GREETING: &str = "Hello! I'm your MediCart assistant. How can I help you today?";

const WEBSITE: &str = "MediCart Pharmacy";
const DEFAULT_PAGE: &str = "index.html";
const SERVICES: [&str; 7] = [
    "Medicine Request",
    "Prescription Upload",
    "Pharmacist Consultation",
    "Medical Equipment Rental",
    "Supplement Recommendations",
    "Health Tips and Resources",
    "Emergency Services",
];

/// One entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: ChatSender,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(text: impl Into<String>, sender: ChatSender) -> Self {
        Self {
            text: text.into(),
            sender,
            sent_at: Utc::now(),
        }
    }
}

impl ChatContext {
    /// Context describing the MediCart site, with `current_page` as the page
    /// the user is on.
    #[must_use]
    pub fn medicart(current_page: impl Into<String>) -> Self {
        Self {
            website: WEBSITE.to_string(),
            services: SERVICES.iter().map(ToString::to_string).collect(),
            current_page: current_page.into(),
        }
    }
}

impl Default for ChatContext {
    fn default() -> Self {
        Self::medicart(DEFAULT_PAGE)
    }
}

/// A chat conversation.
#[derive(Debug)]
pub struct ChatAssistant {
    api: ApiClient,
    remote_enabled: bool,
    context: ChatContext,
    transcript: Vec<ChatMessage>,
}

impl ChatAssistant {
    /// Start a conversation. The transcript opens with [`GREETING`].
    ///
    /// With `remote_enabled` false every reply is a canned one.
    #[must_use]
    pub fn new(api: ApiClient, remote_enabled: bool) -> Self {
        Self {
            api,
            remote_enabled,
            context: ChatContext::default(),
            transcript: vec![ChatMessage::new(GREETING, ChatSender::Bot)],
        }
    }

    /// Record which page the user is looking at.
    pub fn set_current_page(&mut self, page: impl Into<String>) {
        self.context.current_page = page.into();
    }

    /// Send a message and wait for the reply.
    ///
    /// Surrounding whitespace is trimmed; an empty message is ignored and
    /// returns `None`. Otherwise both the message and the reply are
    /// appended to the transcript and the reply is returned.
    #[instrument(skip(self, text))]
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.transcript.push(ChatMessage::new(text, ChatSender::User));
        let reply = self.reply_to(text).await;
        self.transcript.push(ChatMessage::new(reply, ChatSender::Bot));
        self.transcript.last()
    }

    async fn reply_to(&self, text: &str) -> String {
        if !self.remote_enabled {
            return fallback_reply(text).to_string();
        }

        match self.api.chat(text, &self.context).await {
            Ok(reply) => reply.response,
            Err(e) => {
                tracing::warn!(error = %e, "Assistant unavailable, using canned reply");
                fallback_reply(text).to_string()
            }
        }
    }

    /// The conversation so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.transcript
    }

    #[must_use]
    pub const fn context(&self) -> &ChatContext {
        &self.context
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    use super::*;
    use crate::config::ClientConfig;
    use crate::testing::{serve, unreachable_config};

    #[test]
    fn test_starts_with_greeting() {
        let assistant = ChatAssistant::new(ApiClient::new(&ClientConfig::default()), false);
        let messages = assistant.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, GREETING);
        assert_eq!(messages[0].sender, ChatSender::Bot);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut assistant = ChatAssistant::new(ApiClient::new(&ClientConfig::default()), false);
        assert!(assistant.send("   \n").await.is_none());
        assert_eq!(assistant.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_remote_uses_fallback() {
        let mut assistant = ChatAssistant::new(ApiClient::new(&ClientConfig::default()), false);
        let reply = assistant.send("  Do you offer delivery?  ").await.unwrap();
        assert_eq!(reply.sender, ChatSender::Bot);
        assert!(reply.text.starts_with("We offer delivery services"));

        let messages = assistant.messages();
        assert_eq!(messages[1].text, "Do you offer delivery?");
        assert_eq!(messages[1].sender, ChatSender::User);
    }

    #[tokio::test]
    async fn test_remote_reply_and_context() {
        let router = Router::new().route(
            "/api/ai/chat",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["context"]["website"], "MediCart Pharmacy");
                assert_eq!(body["context"]["currentPage"], "cart.html");
                assert_eq!(body["context"]["services"].as_array().unwrap().len(), 7);
                Json(json!({"response": format!("You said: {}", body["message"].as_str().unwrap())}))
            }),
        );
        let mut assistant = ChatAssistant::new(ApiClient::new(&serve(router).await), true);
        assistant.set_current_page("cart.html");

        let reply = assistant.send("hi").await.unwrap();
        assert_eq!(reply.text, "You said: hi");
    }

    #[tokio::test]
    async fn test_remote_failures_degrade() {
        let router = Router::new().route(
            "/api/ai/chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "AI service unavailable") }),
        );
        let mut assistant = ChatAssistant::new(ApiClient::new(&serve(router).await), true);
        let reply = assistant.send("What are your hours?").await.unwrap();
        assert!(reply.text.starts_with("Our opening hours"));

        let mut offline = ChatAssistant::new(ApiClient::new(&unreachable_config().await), true);
        let reply = offline.send("hello").await.unwrap();
        assert_eq!(reply.text, DEFAULT_REPLY);
    }
}
