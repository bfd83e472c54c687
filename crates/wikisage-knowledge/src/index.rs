//! Embedding-backed section index.
//!
//! A read-only snapshot built once from extracted sections. Vectors are
//! L2-normalized at build time so retrieval is a dot product. The only way
//! to change the index is to rebuild it from a fresh extraction.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use wikisage_core::error::{Result, WikisageError};
use wikisage_core::traits::{Embedder, Retriever};
use wikisage_core::types::Section;

/// Sections per embedding request.
const EMBED_BATCH: usize = 64;

struct IndexEntry {
    section: Section,
    vector: Vec<f32>,
}

/// Top-k cosine-similarity index over extracted sections.
pub struct SectionIndex {
    entries: Vec<IndexEntry>,
    embedder: Arc<dyn Embedder>,
    k: usize,
}

impl SectionIndex {
    /// Embed `sections` and build the index. `k` is the number of sections
    /// every query returns, fixed for the life of the index.
    pub async fn build(
        sections: Vec<Section>,
        embedder: Arc<dyn Embedder>,
        k: usize,
    ) -> Result<Self> {
        let mut vectors = Vec::with_capacity(sections.len());
        for batch in sections.chunks(EMBED_BATCH) {
            let inputs: Vec<String> = batch.iter().map(|s| s.content.clone()).collect();
            let mut embedded = embedder.embed(&inputs).await?;
            if embedded.len() != inputs.len() {
                return Err(WikisageError::Embedding(format!(
                    "embedder returned {} vectors for {} sections",
                    embedded.len(),
                    inputs.len()
                )));
            }
            vectors.append(&mut embedded);
        }

        let entries = sections
            .into_iter()
            .zip(vectors)
            .map(|(section, vector)| IndexEntry {
                section,
                vector: l2_normalize(vector),
            })
            .collect::<Vec<_>>();

        debug!(sections = entries.len(), k, "section index built");
        Ok(Self { entries, embedder, k })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Retriever for SectionIndex {
    async fn retrieve(&self, query: &str) -> Result<Vec<Section>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut vectors = self.embedder.embed(&[query.to_string()]).await?;
        let query_vector = vectors
            .pop()
            .ok_or_else(|| WikisageError::Embedding("no vector returned for query".into()))?;
        let query_vector = l2_normalize(query_vector);

        let mut scored: Vec<(f32, &Section)> = self
            .entries
            .iter()
            .map(|e| (dot(&e.vector, &query_vector), &e.section))
            .collect();
        // Stable sort keeps build order on score ties.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(self.k)
            .map(|(_, section)| section.clone())
            .collect())
    }
}

fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic embedder: maps each input to a fixed 3-dimensional
    /// vector based on keyword hits.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(inputs
                .iter()
                .map(|text| {
                    vec![
                        if text.contains("mining") { 1.0 } else { 0.0 },
                        if text.contains("farming") { 1.0 } else { 0.0 },
                        if text.contains("trading") { 1.0 } else { 0.0 },
                    ]
                })
                .collect())
        }
    }

    fn section(content: &str) -> Section {
        Section {
            content: content.to_string(),
            source_url: format!("https://wiki.example.com/#{}", content.len()),
        }
    }

    #[tokio::test]
    async fn test_retrieve_ranks_by_similarity() {
        let sections = vec![
            section("all about farming"),
            section("all about mining"),
            section("all about trading"),
        ];
        let index = SectionIndex::build(sections, Arc::new(KeywordEmbedder), 2)
            .await
            .unwrap();

        let results = index.retrieve("mining tips").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "all about mining");
    }

    #[tokio::test]
    async fn test_k_bounds_result_count() {
        let sections = vec![
            section("mining one"),
            section("mining two"),
            section("mining three"),
        ];
        let index = SectionIndex::build(sections, Arc::new(KeywordEmbedder), 2)
            .await
            .unwrap();

        let results = index.retrieve("mining").await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let index = SectionIndex::build(Vec::new(), Arc::new(KeywordEmbedder), 7)
            .await
            .unwrap();
        assert!(index.is_empty());
        assert!(index.retrieve("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tie_order_is_build_order() {
        let sections = vec![section("mining alpha"), section("mining beta")];
        let index = SectionIndex::build(sections, Arc::new(KeywordEmbedder), 7)
            .await
            .unwrap();

        let results = index.retrieve("mining").await.unwrap();
        assert_eq!(results[0].content, "mining alpha");
        assert_eq!(results[1].content, "mining beta");
    }

    #[test]
    fn test_l2_normalize() {
        let v = l2_normalize(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        // Zero vectors stay zero instead of dividing by zero
        assert_eq!(l2_normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }
}
