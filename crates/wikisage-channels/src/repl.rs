//! Local REPL channel — stdin in, stdout out.
//!
//! Every line typed is treated as addressed to the bot.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::UnboundedReceiverStream;

use wikisage_core::error::Result;
use wikisage_core::traits::{Channel, MessageStream};
use wikisage_core::types::{IncomingMessage, OutgoingMessage};

pub struct ReplChannel;

impl ReplChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReplChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap one typed line as an inbound event.
fn line_to_incoming(line: &str) -> IncomingMessage {
    IncomingMessage {
        channel: "repl".into(),
        thread_id: "repl".into(),
        sender_id: "local".into(),
        sender_name: Some("local".into()),
        sender_is_bot: false,
        content: line.to_string(),
        mentions_bot: true,
        timestamp: chrono::Utc::now(),
    }
}

#[async_trait]
impl Channel for ReplChannel {
    fn name(&self) -> &str {
        "repl"
    }

    async fn connect(&mut self) -> Result<()> {
        println!("Ask a question (ctrl-d to quit):");
        Ok(())
    }

    fn listen(&self) -> MessageStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(line_to_incoming(&line)).is_err() {
                    return;
                }
            }
        });

        Box::new(UnboundedReceiverStream::new(rx))
    }

    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        println!("{}\n", message.content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_addressed_to_bot() {
        let msg = line_to_incoming("what is mining?");
        assert!(msg.mentions_bot);
        assert!(!msg.sender_is_bot);
        assert_eq!(msg.sender_id, "local");
        assert_eq!(msg.content, "what is mining?");
    }
}
