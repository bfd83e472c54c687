//! Capability traits at the seams of the system.
//!
//! The retrieval pipeline only ever talks to these; the vector index, the
//! model provider, the history backend, and the chat platform each plug in
//! behind one of them.

use async_trait::async_trait;
use futures::stream::Stream;

use crate::error::Result;
use crate::types::{ChatTurn, IncomingMessage, OutgoingMessage, Section};

/// LLM chat-completion boundary: role-tagged messages in, generated text out.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, messages: &[ChatTurn]) -> Result<String>;
}

/// Text-embedding boundary. One vector per input, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Similarity-search boundary: up to k sections by descending similarity.
/// `k` is fixed at construction.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Section>>;
}

/// Persistent per-session message history. Append/read only — turns are
/// never rewritten or deleted.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Vec<ChatTurn>>;
    async fn append(&self, session_id: &str, turn: ChatTurn) -> Result<()>;
}

/// Stream of inbound chat events produced by a listening channel.
pub type MessageStream = Box<dyn Stream<Item = IncomingMessage> + Send + Unpin>;

/// A chat front-end: delivers inbound events, accepts outbound replies.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Authenticate/handshake with the platform. Must be called before
    /// `listen`.
    async fn connect(&mut self) -> Result<()>;

    /// Start delivering inbound events. The returned stream ends only when
    /// the channel shuts down.
    fn listen(&self) -> MessageStream;

    async fn send(&self, message: OutgoingMessage) -> Result<()>;
}
