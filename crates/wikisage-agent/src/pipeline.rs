//! Conversational retrieval pipeline.
//!
//! Every turn is one complete transaction: load history, rewrite the query
//! against it, retrieve sections, synthesize an answer, then append the
//! human and ai turns. If any stage fails, nothing is appended; history
//! only records turns that produced an answer.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use wikisage_core::error::Result;
use wikisage_core::traits::{Completer, HistoryStore, Retriever};
use wikisage_core::types::{ChatTurn, RetrievalQuery};

use crate::prompts::{ChatPrompt, contextualize_prompt, synthesis_prompt};

/// The two-stage question-answering pipeline.
pub struct KnowledgePipeline {
    completer: Arc<dyn Completer>,
    retriever: Arc<dyn Retriever>,
    history: Arc<dyn HistoryStore>,
    contextualize: ChatPrompt,
    synthesis: ChatPrompt,
}

impl KnowledgePipeline {
    pub fn new(
        completer: Arc<dyn Completer>,
        retriever: Arc<dyn Retriever>,
        history: Arc<dyn HistoryStore>,
        instruction_prompt: &str,
        context_prompt: &str,
    ) -> Self {
        Self {
            completer,
            retriever,
            history,
            contextualize: contextualize_prompt(instruction_prompt),
            synthesis: synthesis_prompt(instruction_prompt, context_prompt),
        }
    }

    /// Answer one user query within its session.
    pub async fn answer(&self, query: &RetrievalQuery) -> Result<String> {
        let history = self.history.load(&query.session_id).await?;

        let mut vars: HashMap<&str, String> = HashMap::new();
        vars.insert("input", query.text.clone());
        vars.insert("time", query.timestamp.clone());
        vars.insert("user", query.user_name.clone());

        // Stage A: resolve the question against prior turns. With no prior
        // turns the raw text goes straight to retrieval.
        let rewritten = if history.is_empty() {
            query.text.clone()
        } else {
            let messages = self.contextualize.render(&vars, &history);
            self.completer.complete(&messages).await?
        };
        debug!(session_id = %query.session_id, %rewritten, "query contextualized");

        let sections = self.retriever.retrieve(&rewritten).await?;
        debug!(retrieved = sections.len(), "sections retrieved");

        // Stage B: stuff the retrieved sections into the context slot and
        // synthesize the answer.
        let stuffed = sections
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        vars.insert("context", stuffed);

        let messages = self.synthesis.render(&vars, &history);
        let answer = self.completer.complete(&messages).await?;

        // Only the raw question and the answer are persisted; the rewritten
        // query never is.
        self.history
            .append(&query.session_id, ChatTurn::human(&query.text))
            .await?;
        self.history
            .append(&query.session_id, ChatTurn::ai(&answer))
            .await?;

        Ok(answer)
    }
}
