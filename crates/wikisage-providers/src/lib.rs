//! # Wikisage Providers
//!
//! LLM provider implementations: an OpenAI-compatible chat-completion client
//! and an OpenAI-compatible embeddings client. Any endpoint speaking the
//! `/chat/completions` and `/embeddings` wire format works — providers are
//! distinguished only by base URL, key, and model name.

pub mod embeddings;
pub mod openai;

use std::sync::Arc;

use wikisage_core::config::ModelConfig;
use wikisage_core::error::Result;
use wikisage_core::traits::{Completer, Embedder};

/// Create the chat-completion client from configuration.
pub fn create_completer(config: &ModelConfig, api_key: &str) -> Result<Arc<dyn Completer>> {
    Ok(Arc::new(openai::OpenAiCompleter::new(
        &config.api_base,
        api_key,
        &config.name,
        config.temperature,
        config.top_p,
    )?))
}

/// Create the embeddings client from configuration.
pub fn create_embedder(config: &ModelConfig, api_key: &str) -> Result<Arc<dyn Embedder>> {
    Ok(Arc::new(embeddings::OpenAiEmbedder::new(
        &config.api_base,
        api_key,
        &config.embedding_model,
    )?))
}
