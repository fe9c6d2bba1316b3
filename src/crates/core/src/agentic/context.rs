use std::sync::Arc;

use crate::agentic::planning::PlannerSet;
use crate::agentic::tools::ToolRegistry;
use crate::config::OrchestratorConfig;
use crate::infrastructure::completion::CompletionClient;
use crate::infrastructure::memory::MemorySearch;
use crate::util::text::{cap_block, truncate};
use aria_core_types::{ConversationTurn, UserProfile};

/// Everything the detectors and planners need for one turn. Assembled once
/// per turn and reused across all detector invocations so formatting work is
/// not repeated.
#[derive(Clone)]
pub struct TurnContext {
    pub user_id: String,
    pub session_id: String,
    /// Flat text block describing every registered tool.
    pub catalog_text: String,
    /// Bounded, role-tagged summary of recent history.
    pub history_summary: String,
    /// Name/locale/timezone one-liner.
    pub user_state: String,
    /// Persona traits, comma separated ("" when none).
    pub persona: String,
    pub completion: Arc<dyn CompletionClient>,
    pub memory: Arc<dyn MemorySearch>,
    pub planner: Arc<PlannerSet>,
    pub registry: Arc<ToolRegistry>,
    pub config: Arc<OrchestratorConfig>,
}

impl TurnContext {
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        history: &[ConversationTurn],
        profile: Option<&UserProfile>,
        registry: Arc<ToolRegistry>,
        completion: Arc<dyn CompletionClient>,
        memory: Arc<dyn MemorySearch>,
        planner: Arc<PlannerSet>,
        config: Arc<OrchestratorConfig>,
    ) -> Self {
        let history_summary = cap_block(
            &format_history(history, config.max_history_turns, config.max_turn_chars),
            config.max_context_chars,
        );
        let user_state = user_state_summary(profile);
        let persona = profile
            .map(|p| p.persona_traits.join(", "))
            .unwrap_or_default();

        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            catalog_text: registry.catalog_text().to_string(),
            history_summary,
            user_state,
            persona,
            completion,
            memory,
            planner,
            registry,
            config,
        }
    }
}

/// Last `max_turns` turns as role-tagged lines, each truncated.
pub(crate) fn format_history(
    history: &[ConversationTurn],
    max_turns: usize,
    max_turn_chars: usize,
) -> String {
    let start = history.len().saturating_sub(max_turns);
    history[start..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), truncate(&turn.text(), max_turn_chars)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn user_state_summary(profile: Option<&UserProfile>) -> String {
    let Some(profile) = profile else {
        return "Name: unknown | Locale: unknown | Timezone: unknown".to_string();
    };
    format!(
        "Name: {} | Locale: {} | Timezone: {}",
        profile.display_name.as_deref().unwrap_or("unknown"),
        profile.locale.as_deref().unwrap_or("unknown"),
        profile.timezone.as_deref().unwrap_or("unknown"),
    )
}
