//! OpenAI-compatible chat-completion client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use wikisage_core::error::{Result, WikisageError};
use wikisage_core::traits::Completer;
use wikisage_core::types::{ChatTurn, Role};

const MAX_ATTEMPTS: usize = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completion client for any OpenAI-compatible endpoint.
#[derive(Debug)]
pub struct OpenAiCompleter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    top_p: f32,
}

impl OpenAiCompleter {
    pub fn new(
        api_base: &str,
        api_key: &str,
        model: &str,
        temperature: f32,
        top_p: f32,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(WikisageError::Config("missing LLM API key".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WikisageError::Completion(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            temperature,
            top_p,
        })
    }
}

/// Wire role name for a conversation role.
fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::Human => "user",
        Role::Ai => "assistant",
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    async fn complete(&self, messages: &[ChatTurn]) -> Result<String> {
        let wire_messages: Vec<_> = messages
            .iter()
            .map(|m| json!({ "role": wire_role(m.role), "content": m.text }))
            .collect();
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "top_p": self.top_p,
            "messages": wire_messages,
        });

        let mut attempt = 0;
        loop {
            let response = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let parsed: ChatResponse = resp.json().await.map_err(|e| {
                            WikisageError::Completion(format!("invalid completion response: {e}"))
                        })?;
                        return parsed
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|c| c.message.content)
                            .ok_or_else(|| {
                                WikisageError::Completion("completion returned no content".into())
                            });
                    }

                    let retryable =
                        status.as_u16() == 429 || status.is_server_error();
                    let text = resp.text().await.unwrap_or_default();
                    if retryable && attempt + 1 < MAX_ATTEMPTS {
                        attempt += 1;
                        warn!(%status, attempt, "completion request failed, retrying");
                        tokio::time::sleep(backoff(attempt)).await;
                        continue;
                    }
                    return Err(WikisageError::Completion(format!(
                        "completion request failed ({status}): {text}"
                    )));
                }
                Err(e) => {
                    if (e.is_timeout() || e.is_connect()) && attempt + 1 < MAX_ATTEMPTS {
                        attempt += 1;
                        warn!(error = %e, attempt, "completion request errored, retrying");
                        tokio::time::sleep(backoff(attempt)).await;
                        continue;
                    }
                    return Err(WikisageError::Completion(e.to_string()));
                }
            }
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    Duration::from_millis(500 * (1 << attempt.min(5) as u32))
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
