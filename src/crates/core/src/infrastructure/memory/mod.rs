//! Memory search service
//!
//! Detectors use this for topic extraction fallbacks, and the proactive
//! suggestion path uses it as a context sufficiency check. The trait keeps
//! the real store (vector DB, SQL, whatever the deployment uses) out of the
//! core; the in-memory index covers tests and single-node deployments.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::util::errors::AriaResult;

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { limit: 5, offset: 0 }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryHit {
    pub content: String,
    pub memory_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySearchResponse {
    pub results: Vec<MemoryHit>,
}

#[async_trait]
pub trait MemorySearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        user_id: &str,
        options: SearchOptions,
    ) -> AriaResult<MemorySearchResponse>;
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    content: String,
    memory_type: Option<String>,
}

/// Keyword index over per-user entries, ranked by query-token overlap.
#[derive(Default)]
pub struct InMemoryMemoryIndex {
    entries: DashMap<String, Vec<MemoryEntry>>,
}

impl InMemoryMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        user_id: impl Into<String>,
        content: impl Into<String>,
        memory_type: Option<String>,
    ) {
        self.entries.entry(user_id.into()).or_default().push(MemoryEntry {
            content: content.into(),
            memory_type,
        });
    }

    fn score(query_tokens: &[String], content: &str) -> usize {
        let content_lower = content.to_lowercase();
        query_tokens
            .iter()
            .filter(|token| content_lower.contains(token.as_str()))
            .count()
    }
}

#[async_trait]
impl MemorySearch for InMemoryMemoryIndex {
    async fn search(
        &self,
        query: &str,
        user_id: &str,
        options: SearchOptions,
    ) -> AriaResult<MemorySearchResponse> {
        let tokens: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(|t| t.to_string())
            .collect();

        let Some(entries) = self.entries.get(user_id) else {
            return Ok(MemorySearchResponse::default());
        };

        let mut scored: Vec<(usize, MemoryEntry)> = entries
            .iter()
            .map(|e| (Self::score(&tokens, &e.content), e.clone()))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let results = scored
            .into_iter()
            .skip(options.offset)
            .take(options.limit)
            .map(|(_, e)| MemoryHit {
                content: e.content,
                memory_type: e.memory_type,
            })
            .collect();

        Ok(MemorySearchResponse { results })
    }
}
