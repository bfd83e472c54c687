//! Domain and channel-boundary types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A header-delimited chunk of wiki content — the atomic unit that gets
/// embedded, retrieved, and stuffed into the synthesis prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section body, prefixed with a provenance line naming `source_url`
    /// and the originating header text.
    pub content: String,
    /// Page URL plus the header's anchor fragment.
    pub source_url: String,
}

/// Speaker role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Ai,
}

/// One turn of a persisted conversation. Sessions are ordered, append-only
/// sequences of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, text: text.into() }
    }

    pub fn human(text: impl Into<String>) -> Self {
        Self { role: Role::Human, text: text.into() }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self { role: Role::Ai, text: text.into() }
    }
}

/// One question on its way through the retrieval pipeline. Ephemeral.
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    /// The user's raw text, mention token already stripped.
    pub text: String,
    /// Display name of the asking user.
    pub user_name: String,
    /// Session whose history contextualizes this query.
    pub session_id: String,
    /// Wall-clock ISO-8601 timestamp of the turn.
    pub timestamp: String,
}

/// An inbound chat event as delivered by a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Channel the event arrived on ("telegram", "repl").
    pub channel: String,
    /// Conversation thread to reply into.
    pub thread_id: String,
    pub sender_id: String,
    pub sender_name: Option<String>,
    pub sender_is_bot: bool,
    pub content: String,
    /// Whether the event addresses the bot (direct chat or explicit mention).
    pub mentions_bot: bool,
    pub timestamp: DateTime<Utc>,
}

/// A reply on its way back out through a channel.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub thread_id: String,
    pub content: String,
}
