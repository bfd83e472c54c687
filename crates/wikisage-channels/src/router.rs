//! Session router.
//!
//! Decides whether an inbound event deserves an answer at all, and which
//! session's history contextualizes it. Routing never errors — events the
//! bot should not answer simply evaluate to `None`.

use wikisage_core::config::SessionScope;
use wikisage_core::types::IncomingMessage;

/// Session id every user shares when per-user history is disabled.
pub const SHARED_SESSION_ID: &str = "default";

/// A routed event: which session it belongs to and the cleaned question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedQuery {
    pub session_id: String,
    pub text: String,
}

pub struct SessionRouter {
    scope: SessionScope,
    mention_token: String,
}

impl SessionRouter {
    /// `mention_token` is the platform token users write to address the bot
    /// (e.g. `@wikibot`); empty when the channel has no mention syntax.
    pub fn new(scope: SessionScope, mention_token: impl Into<String>) -> Self {
        Self { scope, mention_token: mention_token.into() }
    }

    /// Map an inbound event to a session and cleaned query, or decide the
    /// bot stays silent.
    pub fn route(&self, message: &IncomingMessage) -> Option<RoutedQuery> {
        if message.sender_is_bot {
            return None;
        }
        if !message.mentions_bot {
            return None;
        }

        let text = if self.mention_token.is_empty() {
            message.content.trim().to_string()
        } else {
            message
                .content
                .replace(&self.mention_token, "")
                .trim()
                .to_string()
        };
        if text.is_empty() {
            return None;
        }

        let session_id = match self.scope {
            SessionScope::PerUser => message.sender_id.clone(),
            SessionScope::Shared => SHARED_SESSION_ID.to_string(),
        };

        Some(RoutedQuery { session_id, text })
    }
}
