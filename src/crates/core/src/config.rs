/// Tunables for the orchestration pipeline. Constructed once at startup and
/// shared read-only across turns.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Queries shorter than this skip disambiguation entirely.
    pub min_disambiguation_len: usize,
    /// History window handed to the completion client (10 = 5 turn-pairs).
    pub max_history_turns: usize,
    /// Per-turn truncation when formatting history lines.
    pub max_turn_chars: usize,
    /// Hard cap on the assembled context block.
    pub max_context_chars: usize,
    /// Multi-intent detection declines below this length.
    pub min_multi_intent_len: usize,
    /// Chance the proactive-suggestion detector fires on an unclaimed turn.
    pub proactive_probability: f64,
    /// Wall-clock budget for tools that do not specify their own.
    pub default_tool_timeout_ms: u64,
    /// Model override forwarded to the completion client.
    pub completion_model: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_disambiguation_len: 5,
            max_history_turns: 10,
            max_turn_chars: 300,
            max_context_chars: 4000,
            min_multi_intent_len: 12,
            proactive_probability: 0.2,
            default_tool_timeout_ms: 30_000,
            completion_model: None,
        }
    }
}
