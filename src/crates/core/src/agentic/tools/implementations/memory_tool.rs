use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::infrastructure::memory::{MemorySearch, SearchOptions};
use aria_agent_tools::{Tool, ToolError, ToolOutput, ToolUseContext};

/// Keyword search over the user's stored memories.
pub struct RecallMemoryTool {
    memory: Arc<dyn MemorySearch>,
}

impl RecallMemoryTool {
    pub fn new(memory: Arc<dyn MemorySearch>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for RecallMemoryTool {
    fn name(&self) -> &str {
        "recall_memory"
    }

    fn description(&self) -> String {
        "Search the user's stored memories and preferences".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Keywords to search for"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 20,
                    "description": "Maximum results to return (default 5)"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    fn aliases(&self) -> Vec<String> {
        vec!["memory_search".to_string()]
    }

    async fn execute(
        &self,
        input: &Value,
        context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::new("query is required"))?;
        let limit = input
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|l| l as usize)
            .unwrap_or(SearchOptions::default().limit);

        let response = self
            .memory
            .search(query, &context.user_id, SearchOptions { limit, offset: 0 })
            .await
            .map_err(|e| ToolError::new(format!("memory search failed: {}", e)))?;

        let results: Vec<Value> = response
            .results
            .iter()
            .map(|hit| {
                json!({
                    "content": hit.content,
                    "memoryType": hit.memory_type,
                })
            })
            .collect();

        let message = if results.is_empty() {
            format!("Nothing stored matches '{}'.", query)
        } else {
            format!("Found {} matching memorie(s).", results.len())
        };

        Ok(ToolOutput::structured(message, json!({ "results": results })))
    }
}
