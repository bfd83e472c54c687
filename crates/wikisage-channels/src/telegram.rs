//! Telegram Bot channel — long polling + message sending via Bot API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::UnboundedReceiverStream;

use wikisage_core::error::{Result, WikisageError};
use wikisage_core::traits::{Channel, MessageStream};
use wikisage_core::types::{IncomingMessage, OutgoingMessage};

/// Telegram Bot channel with a polling loop.
pub struct TelegramChannel {
    bot_token: String,
    poll_interval: u64,
    client: reqwest::Client,
    bot_username: Option<String>,
}

impl TelegramChannel {
    pub fn new(bot_token: impl Into<String>, poll_interval: u64) -> Self {
        Self {
            bot_token: bot_token.into(),
            poll_interval,
            client: reqwest::Client::new(),
            bot_username: None,
        }
    }

    /// The token users write to address the bot (`@username`). Empty until
    /// `connect` has run.
    pub fn mention_token(&self) -> String {
        self.bot_username
            .as_deref()
            .map(|u| format!("@{u}"))
            .unwrap_or_default()
    }

    /// Get bot info.
    async fn get_me(&self) -> Result<TelegramUser> {
        let response = self
            .client
            .get(api_url(&self.bot_token, "getMe"))
            .send()
            .await
            .map_err(|e| WikisageError::Channel(format!("getMe failed: {e}")))?;
        let body: TelegramApiResponse<TelegramUser> = response
            .json()
            .await
            .map_err(|e| WikisageError::Channel(format!("invalid getMe response: {e}")))?;
        body.result
            .ok_or_else(|| WikisageError::Channel("no bot info returned".into()))
    }

    /// Send a text message to a chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(api_url(&self.bot_token, "sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| WikisageError::Channel(format!("sendMessage failed: {e}")))?;

        let result: TelegramApiResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| WikisageError::Channel(format!("invalid send response: {e}")))?;

        if !result.ok {
            return Err(WikisageError::Channel(format!(
                "send failed: {}",
                result.description.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

fn api_url(token: &str, method: &str) -> String {
    format!("https://api.telegram.org/bot{token}/{method}")
}

/// Get updates using long polling.
async fn get_updates(
    client: &reqwest::Client,
    token: &str,
    offset: i64,
) -> Result<Vec<TelegramUpdate>> {
    let response = client
        .get(api_url(token, "getUpdates"))
        .query(&[
            ("offset", offset.to_string()),
            ("timeout", "30".into()),
            ("allowed_updates", "[\"message\"]".into()),
        ])
        .send()
        .await
        .map_err(|e| WikisageError::Channel(format!("getUpdates failed: {e}")))?;

    let body: TelegramApiResponse<Vec<TelegramUpdate>> = response
        .json()
        .await
        .map_err(|e| WikisageError::Channel(format!("invalid getUpdates response: {e}")))?;

    if !body.ok {
        return Err(WikisageError::Channel(format!(
            "Telegram API error: {}",
            body.description.unwrap_or_default()
        )));
    }
    Ok(body.result.unwrap_or_default())
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn connect(&mut self) -> Result<()> {
        let me = self.get_me().await?;
        tracing::info!(
            "Telegram bot: @{} ({})",
            me.username.as_deref().unwrap_or("unknown"),
            me.first_name
        );
        self.bot_username = me.username;
        Ok(())
    }

    fn listen(&self) -> MessageStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let client = self.client.clone();
        let token = self.bot_token.clone();
        let username = self.bot_username.clone().unwrap_or_default();
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            tracing::info!("Telegram polling loop started");
            let mut last_update_id = 0i64;

            loop {
                match get_updates(&client, &token, last_update_id + 1).await {
                    Ok(updates) => {
                        for update in updates {
                            last_update_id = last_update_id.max(update.update_id);
                            if let Some(msg) = update.to_incoming(&username)
                                && tx.send(msg).is_err()
                            {
                                tracing::info!("Telegram polling stopped (receiver dropped)");
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Telegram polling error: {e}");
                        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                    }
                }

                tokio::time::sleep(tokio::time::Duration::from_secs(poll_interval)).await;
            }
        });

        Box::new(UnboundedReceiverStream::new(rx))
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        let chat_id: i64 = message
            .thread_id
            .parse()
            .map_err(|_| WikisageError::Channel(format!("invalid chat id {}", message.thread_id)))?;
        self.send_message(chat_id, &message.content).await
    }
}

// --- Telegram API types ---

#[derive(Debug, Deserialize)]
pub struct TelegramApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    pub text: Option<String>,
    pub date: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
}

impl TelegramUpdate {
    /// Convert to an `IncomingMessage`.
    ///
    /// Bot-authored messages are passed through with `sender_is_bot` set;
    /// the session router owns the ignore decision. A private chat counts
    /// as addressing the bot; in groups the text must contain
    /// `@<bot_username>`.
    pub fn to_incoming(&self, bot_username: &str) -> Option<IncomingMessage> {
        let msg = self.message.as_ref()?;
        let text = msg.text.as_ref()?;
        let from = msg.from.as_ref()?;

        let private = msg.chat.chat_type == "private";
        let mentions_bot =
            private || (!bot_username.is_empty() && text.contains(&format!("@{bot_username}")));

        Some(IncomingMessage {
            channel: "telegram".into(),
            thread_id: msg.chat.id.to_string(),
            sender_id: from.id.to_string(),
            sender_name: Some(format!(
                "{}{}",
                from.first_name,
                from.last_name
                    .as_deref()
                    .map(|l| format!(" {l}"))
                    .unwrap_or_default()
            )),
            sender_is_bot: from.is_bot,
            content: text.clone(),
            mentions_bot,
            timestamp: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(chat_type: &str, text: &str, is_bot: bool) -> TelegramUpdate {
        TelegramUpdate {
            update_id: 1,
            message: Some(TelegramMessage {
                message_id: 10,
                from: Some(TelegramUser {
                    id: 42,
                    is_bot,
                    first_name: "Sam".into(),
                    last_name: Some("Miller".into()),
                    username: Some("sam".into()),
                }),
                chat: TelegramChat { id: 7, chat_type: chat_type.into() },
                text: Some(text.into()),
                date: 0,
            }),
        }
    }

    #[test]
    fn test_private_chat_addresses_bot() {
        let msg = update("private", "hello there", false)
            .to_incoming("wikibot")
            .unwrap();
        assert!(msg.mentions_bot);
        assert_eq!(msg.sender_id, "42");
        assert_eq!(msg.thread_id, "7");
        assert_eq!(msg.sender_name.as_deref(), Some("Sam Miller"));
    }

    #[test]
    fn test_group_requires_mention() {
        let unaddressed = update("group", "hello there", false)
            .to_incoming("wikibot")
            .unwrap();
        assert!(!unaddressed.mentions_bot);

        let addressed = update("group", "@wikibot hello there", false)
            .to_incoming("wikibot")
            .unwrap();
        assert!(addressed.mentions_bot);
    }

    #[test]
    fn test_bot_author_flagged_not_dropped() {
        let msg = update("private", "bot to bot", true)
            .to_incoming("wikibot")
            .unwrap();
        assert!(msg.sender_is_bot);
    }

    #[test]
    fn test_non_text_update_skipped() {
        let update = TelegramUpdate { update_id: 1, message: None };
        assert!(update.to_incoming("wikibot").is_none());
    }

    #[test]
    fn test_mention_token_requires_connect() {
        let mut channel = TelegramChannel::new("token", 1);
        assert_eq!(channel.mention_token(), "");
        channel.bot_username = Some("wikibot".into());
        assert_eq!(channel.mention_token(), "@wikibot");
    }
}
